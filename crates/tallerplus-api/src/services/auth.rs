//! # Authentication Service
//!
//! Password hashing (Argon2id, PHC string format), login, and user creation.
//!
//! Hashing and verification are CPU-bound and run on the blocking pool.
//! Login against an unknown email still performs one verification against a
//! fixed dummy hash, so the response time does not reveal whether the email
//! exists.

use std::sync::OnceLock;

use argon2::password_hash::{
    rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::auth::TokenKeys;
use crate::db;
use crate::services::clients::WRITE_TRANSACTION;
use crate::services::AuthError;
use crate::state::UserRecord;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: UserRecord,
}

fn hash_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(format!("failed to hash password: {e}")))
}

fn verify_blocking(stored_hash: &str, candidate: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::Hash(format!("invalid stored hash: {e}")))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(format!("failed to verify password: {e}"))),
    }
}

/// Hash of a password nobody knows, used to equalize login timing.
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

fn dummy_hash() -> Result<&'static str, AuthError> {
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash);
    }
    let hash = hash_blocking("tallerplus-dummy-password")?;
    Ok(DUMMY_HASH.get_or_init(|| hash))
}

/// Build the dummy hash on the blocking pool ahead of the first login.
///
/// Without this the first unknown-email login pays for a hash and a verify.
pub async fn prepare_dummy_hash() -> Result<(), AuthError> {
    tokio::task::spawn_blocking(|| dummy_hash().map(|_| ()))
        .await
        .map_err(|e| AuthError::Hash(format!("hashing task failed: {e}")))?
}

/// Hash a password into a salted PHC string.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| AuthError::Hash(format!("hashing task failed: {e}")))?
}

/// Check `candidate` against a stored PHC hash.
///
/// Returns `Ok(false)` on a wrong password; `Err` only if the stored hash is
/// unreadable or the hasher itself fails.
pub async fn verify_password(stored_hash: &str, candidate: &str) -> Result<bool, AuthError> {
    let stored_hash = stored_hash.to_owned();
    let candidate = candidate.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&stored_hash, &candidate))
        .await
        .map_err(|e| AuthError::Hash(format!("verification task failed: {e}")))?
}

async fn burn_verification(candidate: &str) -> Result<(), AuthError> {
    let candidate = candidate.to_owned();
    tokio::task::spawn_blocking(move || {
        let hash = dummy_hash()?;
        verify_blocking(hash, &candidate).map(|_| ())
    })
    .await
    .map_err(|e| AuthError::Hash(format!("verification task failed: {e}")))?
}

/// Authenticate by exact email match and password, and issue a token.
///
/// # Errors
///
/// [`AuthError::InvalidCredentials`] for an unknown email or a wrong
/// password; the two cases are indistinguishable to the caller.
pub async fn login(
    pool: &SqlitePool,
    keys: &TokenKeys,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, AuthError> {
    let user = {
        let mut conn = pool.acquire().await?;
        db::users::find_by_email(&mut conn, email).await?
    };

    let Some(user) = user else {
        burn_verification(password).await?;
        tracing::warn!("login rejected: unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(&user.password_hash, password).await? {
        tracing::warn!(user_id = user.id, "login rejected: wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let token = keys.issue(user.id)?;
    tracing::info!(user_id = user.id, "login succeeded");
    Ok(LoginOutcome { token, user })
}

/// Create a user with a freshly hashed password and return its id.
///
/// # Errors
///
/// [`AuthError::EmailTaken`] if a user with this email already exists.
pub async fn create_user(pool: &SqlitePool, email: &str, password: &str) -> Result<i64, AuthError> {
    // Hash before taking the write lock.
    let hash = hash_password(password).await?;

    let mut tx = pool.begin_with(WRITE_TRANSACTION).await?;
    if db::users::find_by_email(&mut *tx, email).await?.is_some() {
        return Err(AuthError::EmailTaken(email.to_string()));
    }

    let id = db::users::insert(&mut *tx, email, &hash, Utc::now()).await?;
    tx.commit().await?;

    tracing::info!(user_id = id, email = %email, "user created");
    Ok(id)
}
