//! # Client API
//!
//! CRUD over the workshop's client registry. All routes require a bearer
//! token; the auth middleware is applied by the top-level router.
//!
//! Request and response bodies use the Spanish wire keys (`nombre`,
//! `documento`, `telefono`, `email`, `direccion`).

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tallerplus_core::ClientPatch;
use utoipa::{IntoParams, ToSchema};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, extract_query};
use crate::services::clients::{self, ClientPage, ListParams, DEFAULT_PAGE_SIZE};
use crate::state::{AppState, ClientRecord};

/// Client fields as submitted. On update, omitted or `null` fields keep
/// their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ClientRequest {
    /// Full name. Required on create.
    pub nombre: Option<String>,
    /// Identity document number. An empty string clears it.
    pub documento: Option<String>,
    /// Phone number. An empty string clears it.
    pub telefono: Option<String>,
    /// Contact email, checked for a basic `local@domain.tld` shape.
    pub email: Option<String>,
    /// Postal address.
    pub direccion: Option<String>,
}

impl From<ClientRequest> for ClientPatch {
    fn from(req: ClientRequest) -> Self {
        ClientPatch {
            name: req.nombre,
            document: req.documento,
            phone: req.telefono,
            email: req.email,
            address: req.direccion,
        }
    }
}

/// Query string for `GET /clients`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListClientsQuery {
    /// Substring matched against name, document, and phone.
    pub search: Option<String>,
    /// 1-based page number. Defaults to 1.
    pub page: Option<i64>,
    /// Items per page. Defaults to 20, capped at 100.
    pub page_size: Option<i64>,
}

impl ListClientsQuery {
    fn list_params(self) -> Result<ListParams, AppError> {
        let page = positive("page", self.page.unwrap_or(1))?;
        let page_size = positive(
            "page_size",
            self.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
        )?;
        Ok(ListParams {
            search: self.search,
            page,
            page_size,
        })
    }
}

fn positive(name: &str, value: i64) -> Result<u32, AppError> {
    if value < 1 {
        return Err(AppError::BadRequest(format!("{name} must be at least 1")));
    }
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}

/// Build the clients router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}

/// GET /clients: List clients, newest first.
#[utoipa::path(
    get,
    path = "/clients",
    params(ListClientsQuery),
    responses(
        (status = 200, description = "One page of clients", body = ClientPage),
        (status = 400, description = "Invalid query", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    ),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    query: Result<Query<ListClientsQuery>, QueryRejection>,
) -> Result<Json<ClientPage>, AppError> {
    let params = extract_query(query)?.list_params()?;
    let page = clients::list(&state.pool, params).await?;
    Ok(Json(page))
}

/// POST /clients: Register a client.
#[utoipa::path(
    post,
    path = "/clients",
    request_body = ClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientRecord),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    ),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    body: Result<Json<ClientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClientRecord>), AppError> {
    let req = extract_json(body)?;
    let record = clients::create(&state.pool, req.into()).await?;
    tracing::debug!(user_id = caller.user_id, client_id = record.id, "create_client");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /clients/{id}: Fetch one client.
#[utoipa::path(
    get,
    path = "/clients/{id}",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client found", body = ClientRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ClientRecord>, AppError> {
    let id = extract_path(id)?;
    Ok(Json(clients::get(&state.pool, id).await?))
}

/// PUT /clients/{id}: Partially update a client.
#[utoipa::path(
    put,
    path = "/clients/{id}",
    params(("id" = i64, Path, description = "Client ID")),
    request_body = ClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientRecord),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ClientRequest>, JsonRejection>,
) -> Result<Json<ClientRecord>, AppError> {
    let id = extract_path(id)?;
    let req = extract_json(body)?;
    let record = clients::update(&state.pool, id, req.into()).await?;
    tracing::debug!(user_id = caller.user_id, client_id = id, "update_client");
    Ok(Json(record))
}

/// DELETE /clients/{id}: Remove a client.
#[utoipa::path(
    delete,
    path = "/clients/{id}",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "clients"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(id)?;
    clients::delete(&state.pool, id).await?;
    tracing::debug!(user_id = caller.user_id, client_id = id, "delete_client");
    Ok(StatusCode::NO_CONTENT)
}
