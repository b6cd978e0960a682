//! # Client Fields
//!
//! [`ClientPatch`] is what a caller submits: every field optional, untrimmed.
//! [`ClientFields`] is what gets validated and stored: trimmed, with empty
//! optional fields collapsed to `None`.
//!
//! ## Partial Updates
//!
//! A patch field that is `None` (absent or JSON `null`) keeps the stored
//! value. A patch field that is `Some` replaces it after trimming, so an
//! empty string clears an optional field. An empty `name` is not cleared
//! silently; it is kept empty and rejected by [`ClientFields::check`].

use serde::{Deserialize, Serialize};

use crate::email::is_valid_email;
use crate::error::ValidationError;

/// Caller-supplied client fields. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientPatch {
    /// Display name.
    pub name: Option<String>,
    /// National ID or tax document.
    pub document: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Normalized client attributes, ready for validation and storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFields {
    /// Display name, trimmed. Required non-empty by rule 1.
    pub name: String,
    /// Document, trimmed; `None` when empty.
    pub document: Option<String>,
    /// Phone, trimmed; `None` when empty.
    pub phone: Option<String>,
    /// Email, trimmed; `None` when empty.
    pub email: Option<String>,
    /// Address, trimmed; `None` when empty.
    pub address: Option<String>,
}

/// Trim a submitted value, collapsing blank input to `None`.
fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn merge(current: &Option<String>, submitted: Option<String>) -> Option<String> {
    match submitted {
        Some(value) => normalize(&value),
        None => current.clone(),
    }
}

impl ClientFields {
    /// Build the fields of a new client. Missing fields are treated as empty.
    pub fn from_patch(patch: ClientPatch) -> Self {
        Self {
            name: patch.name.as_deref().map(str::trim).unwrap_or_default().to_string(),
            document: patch.document.as_deref().and_then(normalize),
            phone: patch.phone.as_deref().and_then(normalize),
            email: patch.email.as_deref().and_then(normalize),
            address: patch.address.as_deref().and_then(normalize),
        }
    }

    /// Overlay a patch on these fields, returning the merged result.
    pub fn apply(&self, patch: ClientPatch) -> Self {
        Self {
            name: match patch.name {
                Some(name) => name.trim().to_string(),
                None => self.name.clone(),
            },
            document: merge(&self.document, patch.document),
            phone: merge(&self.phone, patch.phone),
            email: merge(&self.email, patch.email),
            address: merge(&self.address, patch.address),
        }
    }

    /// Apply the store-independent rules (name, identifier, email shape)
    /// in order, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingName`],
    /// [`ValidationError::MissingIdentifier`], or
    /// [`ValidationError::InvalidEmail`].
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.document.is_none() && self.phone.is_none() {
            return Err(ValidationError::MissingIdentifier);
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                return Err(ValidationError::InvalidEmail(email.clone()));
            }
        }
        Ok(())
    }
}
