//! # Extraction Helpers
//!
//! Map Axum extractor rejections to [`AppError`] so malformed bodies, query
//! strings, and path segments all produce the standard JSON error body
//! instead of Axum's plain-text defaults. Bodies and queries are 400; a path
//! segment that does not parse names no resource and is 404.
//!
//! Handlers take `Result<Extractor<T>, Rejection>` and unwrap it here:
//! ```ignore
//! async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
//!     let req = extract_json(body)?;
//! }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use crate::error::AppError;

/// Unwrap a JSON body.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Unwrap a query string.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Unwrap a path parameter. `/clients/abc` is a 404, like an unknown id.
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result.map(|Path(v)| v).map_err(|err| {
        tracing::debug!(error = %err.body_text(), "unparseable path parameter");
        AppError::NotFound("no resource at this path".to_string())
    })
}
