//! Client operations: list, get, create, update, delete.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tallerplus_core::{ClientFields, ClientPatch};
use utoipa::ToSchema;

use crate::db;
use crate::services::validation::{duplicate_from_constraint, validate_client};
use crate::services::ClientError;
use crate::state::ClientRecord;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a caller may request; larger requests are clamped.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Writes read before they write, so they take SQLite's write lock up front.
/// A deferred transaction cannot upgrade its read snapshot once another
/// connection has committed, and fails with `SQLITE_BUSY` instead of waiting.
pub(crate) const WRITE_TRANSACTION: &str = "BEGIN IMMEDIATE";

/// Listing parameters, already checked by the route layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Case-insensitive substring matched against name, document, and phone.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size. Clamped to [`MAX_PAGE_SIZE`].
    pub page_size: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of clients plus the total number of matches.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientPage {
    /// Number of clients matching the search, across all pages.
    pub total: i64,
    /// 1-based page number of this page.
    pub page: u32,
    /// Page size actually used, after clamping.
    pub page_size: u32,
    /// Clients on this page, newest first.
    pub items: Vec<ClientRecord>,
}

/// List clients, newest first.
///
/// A blank search term is treated as no search.
pub async fn list(pool: &SqlitePool, params: ListParams) -> Result<ClientPage, ClientError> {
    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, MAX_PAGE_SIZE);
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let limit = i64::from(page_size);
    let offset = i64::from(page - 1).saturating_mul(limit);

    let mut tx = pool.begin().await?;
    let total = db::clients::count(&mut *tx, search).await?;
    let items = db::clients::list(&mut *tx, search, limit, offset).await?;
    tx.commit().await?;

    Ok(ClientPage {
        total,
        page,
        page_size,
        items,
    })
}

/// Fetch one client.
pub async fn get(pool: &SqlitePool, id: i64) -> Result<ClientRecord, ClientError> {
    let mut conn = pool.acquire().await?;
    db::clients::get_by_id(&mut conn, id)
        .await?
        .ok_or(ClientError::NotFound(id))
}

/// Validate and store a new client.
pub async fn create(pool: &SqlitePool, patch: ClientPatch) -> Result<ClientRecord, ClientError> {
    let fields = ClientFields::from_patch(patch);

    let mut tx = pool.begin_with(WRITE_TRANSACTION).await?;
    validate_client(&mut *tx, &fields, None).await?;

    let id = db::clients::insert(&mut *tx, &fields, Utc::now())
        .await
        .map_err(|e| duplicate_from_constraint(e, &fields))?;
    let record = db::clients::get_by_id(&mut *tx, id)
        .await?
        .ok_or(ClientError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(client_id = id, "client created");
    Ok(record)
}

/// Merge `patch` into an existing client, validate the result, and store it.
///
/// The client's own document and phone do not count as duplicates.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    patch: ClientPatch,
) -> Result<ClientRecord, ClientError> {
    let mut tx = pool.begin_with(WRITE_TRANSACTION).await?;

    let current = db::clients::get_by_id(&mut *tx, id)
        .await?
        .ok_or(ClientError::NotFound(id))?;
    let fields = current.fields().apply(patch);
    validate_client(&mut *tx, &fields, Some(id)).await?;

    let updated = db::clients::update(&mut *tx, id, &fields)
        .await
        .map_err(|e| duplicate_from_constraint(e, &fields))?;
    if !updated {
        return Err(ClientError::NotFound(id));
    }
    let record = db::clients::get_by_id(&mut *tx, id)
        .await?
        .ok_or(ClientError::NotFound(id))?;
    tx.commit().await?;

    tracing::info!(client_id = id, "client updated");
    Ok(record)
}

/// Delete a client.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ClientError> {
    let mut tx = pool.begin_with(WRITE_TRANSACTION).await?;
    if !db::clients::delete(&mut *tx, id).await? {
        return Err(ClientError::NotFound(id));
    }
    tx.commit().await?;

    tracing::info!(client_id = id, "client deleted");
    Ok(())
}
