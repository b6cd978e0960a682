//! User persistence operations on the `users` table.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::state::UserRecord;

/// Fetch a user by exact email match.
pub async fn find_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(UserRow::into_record))
}

/// Insert a user and return its assigned id.
pub async fn insert(
    conn: &mut SqliteConnection,
    email: &str,
    password_hash: &str,
    created_at: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let result =
        sqlx::query("INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)")
            .bind(email)
            .bind(password_hash)
            .bind(created_at)
            .execute(&mut *conn)
            .await?;

    Ok(result.last_insert_rowid())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}
