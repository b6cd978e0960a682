//! Client persistence operations on the `clients` table.
//!
//! Blank optional fields arrive here already normalized to `None` and are
//! stored as `NULL`, which keeps them out of the partial unique indexes on
//! `documento` and `telefono`.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tallerplus_core::ClientFields;

use crate::state::ClientRecord;

const SELECT_COLUMNS: &str =
    "SELECT id, nombre, documento, telefono, email, direccion, created_at FROM clients";

/// Case-insensitive substring filter over name, document, and phone.
/// Binds the same pattern three times.
const SEARCH_FILTER: &str = "WHERE LOWER(nombre) LIKE LOWER(?) ESCAPE '\\' \
     OR LOWER(documento) LIKE LOWER(?) ESCAPE '\\' \
     OR LOWER(telefono) LIKE LOWER(?) ESCAPE '\\'";

/// Build a LIKE pattern that matches `needle` literally anywhere in a value.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Insert a client and return its assigned id.
pub async fn insert(
    conn: &mut SqliteConnection,
    fields: &ClientFields,
    created_at: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO clients (nombre, documento, telefono, email, direccion, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&fields.name)
    .bind(&fields.document)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(&fields.address)
    .bind(created_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrite every mutable column of a client.
///
/// Returns `false` if no client has this id.
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    fields: &ClientFields,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE clients
         SET nombre = ?, documento = ?, telefono = ?, email = ?, direccion = ?
         WHERE id = ?",
    )
    .bind(&fields.name)
    .bind(&fields.document)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(&fields.address)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a client. Returns `false` if no client has this id.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch a client by id.
pub async fn get_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<ClientRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, ClientRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(ClientRow::into_record))
}

/// Id of a client other than `exclude` holding this document, if any.
pub async fn find_document_holder(
    conn: &mut SqliteConnection,
    document: &str,
    exclude: Option<i64>,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM clients WHERE documento = ? AND (? IS NULL OR id <> ?) LIMIT 1",
    )
    .bind(document)
    .bind(exclude)
    .bind(exclude)
    .fetch_optional(&mut *conn)
    .await
}

/// Id of a client other than `exclude` holding this phone, if any.
pub async fn find_phone_holder(
    conn: &mut SqliteConnection,
    phone: &str,
    exclude: Option<i64>,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM clients WHERE telefono = ? AND (? IS NULL OR id <> ?) LIMIT 1",
    )
    .bind(phone)
    .bind(exclude)
    .bind(exclude)
    .fetch_optional(&mut *conn)
    .await
}

/// Count clients, optionally restricted to those matching `search`.
pub async fn count(conn: &mut SqliteConnection, search: Option<&str>) -> Result<i64, sqlx::Error> {
    let Some(needle) = search else {
        return sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&mut *conn)
            .await;
    };

    let pattern = contains_pattern(needle);
    let sql = format!("SELECT COUNT(*) FROM clients {SEARCH_FILTER}");
    let total = sqlx::query_scalar(&sql)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(&mut *conn)
        .await?;
    Ok(total)
}

/// List one page of clients, newest (highest id) first, optionally
/// restricted to those matching `search`.
pub async fn list(
    conn: &mut SqliteConnection,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ClientRecord>, sqlx::Error> {
    let pattern = search.map(contains_pattern);
    let sql = match pattern {
        Some(_) => format!("{SELECT_COLUMNS} {SEARCH_FILTER} ORDER BY id DESC LIMIT ? OFFSET ?"),
        None => format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ? OFFSET ?"),
    };

    let mut query = sqlx::query_as::<_, ClientRow>(&sql);
    if let Some(pattern) = &pattern {
        query = query.bind(pattern).bind(pattern).bind(pattern);
    }
    let rows = query.bind(limit).bind(offset).fetch_all(&mut *conn).await?;

    Ok(rows.into_iter().map(ClientRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ClientRow {
    id: i64,
    nombre: String,
    documento: Option<String>,
    telefono: Option<String>,
    email: Option<String>,
    direccion: Option<String>,
    created_at: DateTime<Utc>,
}

impl ClientRow {
    fn into_record(self) -> ClientRecord {
        ClientRecord {
            id: self.id,
            name: self.nombre,
            document: self.documento,
            phone: self.telefono,
            email: self.email,
            address: self.direccion,
            created_at: self.created_at,
        }
    }
}
