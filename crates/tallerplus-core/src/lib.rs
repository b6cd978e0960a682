#![deny(missing_docs)]

//! # tallerplus-core: Foundational Types for TallerPlus
//!
//! Everything about a client record that can be decided without touching the
//! database lives here: trimming and normalization of submitted fields,
//! partial-update merging, email shape checking, and the first three of the
//! five ordered validation rules. The remaining two rules (document and phone
//! uniqueness) need a store lookup and are driven by `tallerplus-api`, which
//! reports them through the same [`ValidationError`] type so that every rule
//! violation has one shape on the wire.
//!
//! ## Rule Order
//!
//! The first failing rule wins, in this order:
//!
//! 1. [`ValidationError::MissingName`]
//! 2. [`ValidationError::MissingIdentifier`]
//! 3. [`ValidationError::InvalidEmail`]
//! 4. [`ValidationError::DuplicateDocument`]
//! 5. [`ValidationError::DuplicatePhone`]
//!
//! Create and update both go through [`ClientFields::check`] before any
//! uniqueness lookup, so the two operations report identical errors for
//! identical payloads.

pub mod client;
pub mod email;
pub mod error;

pub use client::{ClientFields, ClientPatch};
pub use email::is_valid_email;
pub use error::ValidationError;
