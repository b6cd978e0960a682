//! # Services
//!
//! Request-independent operations behind the HTTP routes:
//!
//! - `auth`: password hashing, login, and out-of-band user creation.
//! - `clients`: client list/get/create/update/delete.
//! - `validation`: the ordered client rules, including the two uniqueness
//!   lookups that need the store.
//!
//! Every operation takes the pool explicitly and owns its transaction:
//! begin, do the work, commit. Writes begin with `BEGIN IMMEDIATE` so
//! concurrent writers queue on the busy timeout. Returning early with an
//! error drops the transaction, which rolls it back.

pub mod auth;
pub mod clients;
pub mod validation;

use tallerplus_core::ValidationError;
use thiserror::Error;

/// Failure of a client operation.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The submitted client broke a validation rule.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// No client has this id.
    #[error("client {0} not found")]
    NotFound(i64),

    /// The store failed; the transaction was rolled back.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failure of an authentication or user-management operation.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A user with this email already exists.
    #[error("user {0} already exists")]
    EmailTaken(String),

    /// Password hashing or hash parsing failed.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Token signing failed.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// The store failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
