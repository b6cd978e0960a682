//! # Login
//!
//! Exchanges an email and password for a bearer token valid for eight hours.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::services;
use crate::state::AppState;

/// Login credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account email, matched exactly.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Public view of the authenticated user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    /// User identifier.
    pub id: i64,
    /// Account email.
    pub email: String,
}

/// Successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub access_token: String,
    /// The user the token was issued to.
    pub user: UserSummary,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// POST /auth/login: Authenticate and obtain a token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Malformed body", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    security(()),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_json(body)?;
    let outcome =
        services::auth::login(&state.pool, &state.tokens, &req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        access_token: outcome.token,
        user: UserSummary {
            id: outcome.user.id,
            email: outcome.user.email,
        },
    }))
}
