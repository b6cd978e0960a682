//! # Database Persistence Layer
//!
//! SQLite persistence for users and clients via SQLx.
//!
//! Query functions take `&mut SqliteConnection` so the same function runs on
//! a pooled connection or inside a transaction (`&mut *tx`). The services
//! decide the transaction boundaries; nothing in this module begins or
//! commits one.
//!
//! Schema lives in `migrations/` and is embedded at compile time.

pub mod clients;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connect to the database at `url` and apply pending migrations.
///
/// The database file is created if it does not exist.
pub async fn init_pool(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    tracing::info!(url = %url, "Connected to SQLite");

    MIGRATOR.run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Open a migrated, private in-memory database.
///
/// Every SQLite in-memory connection is its own database, so the pool is
/// pinned to a single connection that never expires.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    Ok(pool)
}
