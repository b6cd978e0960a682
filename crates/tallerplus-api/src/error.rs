//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps client-rule violations, credential failures, and store errors to
//! HTTP status codes with a flat JSON body:
//!
//! ```json
//! { "code": "DUPLICATE_DOCUMENT", "message": "Documento ya registrado" }
//! ```
//!
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tallerplus_core::ValidationError;
use thiserror::Error;
use utoipa::ToSchema;

use crate::services::{AuthError, ClientError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "NOT_FOUND", "MISSING_NAME").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body or query could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A client record broke one of the validation rules (400).
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Login with an unknown email or a wrong password (401).
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    /// Missing, malformed, or expired bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Invalid(rule) => (StatusCode::BAD_REQUEST, rule.code()),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Invalid(rule) => Self::Invalid(rule),
            ClientError::NotFound(id) => Self::NotFound(format!("client {id}")),
            ClientError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::EmailTaken(email) => {
                Self::BadRequest(format!("user {email} already exists"))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}
