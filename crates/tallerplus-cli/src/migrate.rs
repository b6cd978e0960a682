//! # Migrate Subcommand
//!
//! Connects to the database, creating the SQLite file if needed, and applies
//! every pending migration embedded in `tallerplus-api`.

use anyhow::{Context, Result};

/// Execute the migrate subcommand.
///
/// Returns exit code 0 on success.
pub async fn run_migrate(database_url: &str) -> Result<u8> {
    let pool = tallerplus_api::db::init_pool(database_url)
        .await
        .with_context(|| format!("failed to migrate database at {database_url}"))?;
    pool.close().await;

    println!("Migrations applied to {database_url}");
    Ok(0)
}
