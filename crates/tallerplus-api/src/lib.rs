//! # tallerplus-api: Axum API Service for TallerPlus
//!
//! Bearer-token login and the workshop's client registry: search,
//! pagination, create, update, and delete, with ordered validation and
//! document/phone uniqueness.
//!
//! ## API Surface
//!
//! | Route                  | Module               | Auth   |
//! |------------------------|----------------------|--------|
//! | `POST /auth/login`     | [`routes::auth`]     | public |
//! | `/clients`, `/clients/{id}` | [`routes::clients`] | bearer |
//! | `/health/*`            | here                 | public |
//! | `/openapi.json`        | [`openapi`]          | public |
//! | `/metrics`             | here                 | public |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! Cors → Trace → Metrics → BodyLimit → [AuthMiddleware on /clients] → Handler
//! ```
//!
//! ## Layering
//!
//! Routes parse requests and shape responses. [`services`] own the
//! transactions and the rules. [`db`] holds the SQL.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;

pub use error::AppError;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Only the `/clients` routes sit behind the auth middleware; login, health
/// checks, the OpenAPI document, and metrics stay reachable without a token.
pub fn app(state: AppState) -> Router {
    let clients = routes::clients::router()
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(state.tokens.clone()));

    let public = Router::new()
        .merge(routes::auth::router())
        .merge(openapi::router())
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(render_metrics));

    Router::new()
        .merge(public)
        .merge(clients)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 when the database answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ready".into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response()
        }
    }
}

/// Prometheus text exposition, or 404 when no recorder is installed.
async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
