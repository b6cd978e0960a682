//! # Create-Admin Subcommand
//!
//! Provisions the first login for a fresh deployment. Idempotent: an email
//! that is already registered is reported and left untouched, including its
//! password.

use anyhow::{Context, Result};
use clap::Args;
use sqlx::SqlitePool;
use tallerplus_api::services::{self, AuthError};

/// Arguments for the `tallerplus create-admin` subcommand.
#[derive(Args, Debug)]
pub struct CreateAdminArgs {
    /// Login email for the admin user.
    #[arg(long, default_value = "admin@tallerplus.com")]
    pub email: String,

    /// Initial password. Stored only as an Argon2 hash.
    #[arg(long, default_value = "Admin123")]
    pub password: String,
}

/// What `create-admin` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    /// A new user was created with this id.
    Created(i64),
    /// A user with the email already existed.
    AlreadyExists,
}

/// Create the admin user unless the email is already registered.
pub async fn create_admin(pool: &SqlitePool, email: &str, password: &str) -> Result<AdminOutcome> {
    match services::auth::create_user(pool, email, password).await {
        Ok(id) => Ok(AdminOutcome::Created(id)),
        Err(AuthError::EmailTaken(_)) => Ok(AdminOutcome::AlreadyExists),
        Err(e) => Err(e).with_context(|| format!("failed to create user {email}")),
    }
}

/// Execute the create-admin subcommand.
///
/// Returns exit code 0 whether the user was created or already existed.
pub async fn run_create_admin(args: &CreateAdminArgs, database_url: &str) -> Result<u8> {
    let pool = tallerplus_api::db::init_pool(database_url)
        .await
        .with_context(|| format!("failed to open database at {database_url}"))?;

    let outcome = create_admin(&pool, &args.email, &args.password).await;
    pool.close().await;

    match outcome? {
        AdminOutcome::Created(id) => println!("Admin user {} created (id {id})", args.email),
        AdminOutcome::AlreadyExists => println!("Admin user {} already exists", args.email),
    }
    Ok(0)
}
