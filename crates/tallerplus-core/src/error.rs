//! # Validation Errors
//!
//! Rule violations for client records, built with `thiserror`. The display
//! strings are the human-readable messages returned to API callers and are
//! part of the wire contract.

use thiserror::Error;

/// A client record failed one of the ordered validation rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trimming whitespace.
    #[error("El nombre es obligatorio")]
    MissingName,

    /// Neither a document nor a phone number was supplied.
    #[error("Debe ingresar al menos un documento o teléfono")]
    MissingIdentifier,

    /// Email is present but does not look like `local@domain.tld`.
    #[error("Correo electrónico inválido")]
    InvalidEmail(String),

    /// Another client already holds this document.
    #[error("Documento ya registrado")]
    DuplicateDocument(String),

    /// Another client already holds this phone number.
    #[error("Teléfono ya registrado")]
    DuplicatePhone(String),
}

impl ValidationError {
    /// Machine-readable error code (e.g., `"MISSING_NAME"`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingName => "MISSING_NAME",
            Self::MissingIdentifier => "MISSING_IDENTIFIER",
            Self::InvalidEmail(_) => "INVALID_EMAIL",
            Self::DuplicateDocument(_) => "DUPLICATE_DOCUMENT",
            Self::DuplicatePhone(_) => "DUPLICATE_PHONE",
        }
    }
}
