//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI 3.1 document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /auth/login, valid for 8 hours."))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI document for the TallerPlus API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TallerPlus API",
        description = "Client registry for TallerPlus workshops.\n\nAuthentication: `POST /auth/login` returns a bearer token; send it as `Authorization: Bearer <token>` on every `/clients` request.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://127.0.0.1:5000", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::auth::login,
        crate::routes::clients::list_clients,
        crate::routes::clients::create_client,
        crate::routes::clients::get_client,
        crate::routes::clients::update_client,
        crate::routes::clients::delete_client,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::state::ClientRecord,
            crate::services::clients::ClientPage,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::LoginResponse,
            crate::routes::auth::UserSummary,
            crate::routes::clients::ClientRequest,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login and token issuance"),
        (name = "clients", description = "Client registry: search, create, update, delete"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
