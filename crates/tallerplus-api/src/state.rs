//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor, plus the configuration it is built from and
//! the record types the API serves.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tallerplus_core::ClientFields;
use thiserror::Error;
use utoipa::ToSchema;

use crate::auth::TokenKeys;

// -- Records ------------------------------------------------------------------

/// A client as stored and served.
///
/// Wire keys are Spanish (`nombre`, `documento`, ...) for compatibility with
/// existing front ends; field names are English.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClientRecord {
    /// Store-assigned identifier.
    pub id: i64,
    /// Full name, trimmed and never empty.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Identity document number, unique among clients.
    #[serde(rename = "documento")]
    pub document: Option<String>,
    /// Phone number, unique among clients.
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Postal address.
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    /// When the client was registered (UTC).
    pub created_at: DateTime<Utc>,
}

impl ClientRecord {
    /// The validated attributes of this record, for merging updates.
    pub fn fields(&self) -> ClientFields {
        ClientFields {
            name: self.name.clone(),
            document: self.document.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
        }
    }
}

/// A credential record. Never serialized: it carries the password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Store-assigned identifier; the token subject.
    pub id: i64,
    /// Login email, matched exactly.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// When the user was created (UTC).
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

// -- Configuration ------------------------------------------------------------

/// Development fallback for `JWT_SECRET_KEY`. Tokens signed with it are
/// forgeable by anyone who has read this file.
pub const DEFAULT_JWT_SECRET: &str = "cambia_este_secreto_localmente";

/// Default SQLite database, created next to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data.db";

/// Error reading configuration from the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got \"{0}\"")]
    InvalidPort(String),

    #[error("HOST must be an IP address, got \"{0}\"")]
    InvalidHost(String),

    #[error("JWT_SECRET_KEY must not be empty")]
    EmptySecret,
}

/// Application configuration.
///
/// Custom `Debug` redacts the `jwt_secret` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Address to bind the HTTP server to.
    pub host: IpAddr,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// SQLx SQLite connection URL.
    pub database_url: String,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
    /// Emit JSON log lines instead of human-readable text.
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Unset keys fall back to [`AppConfig::default`]; set but unparseable
    /// keys are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost(raw))?,
            None => defaults.host,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let jwt_secret = match lookup("JWT_SECRET_KEY") {
            Some(secret) if secret.is_empty() => return Err(ConfigError::EmptySecret),
            Some(secret) => secret,
            None => defaults.jwt_secret,
        };

        Ok(Self {
            host,
            port,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            jwt_secret,
            log_json: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    /// Socket address the server listens on.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether tokens are signed with the development fallback secret.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state accessible to all route handlers.
///
/// Cheap to clone: the pool, token keys, and metrics handle are all
/// reference-counted internally. Holds no mutable state of its own.
#[derive(Debug, Clone)]
pub struct AppState {
    /// SQLite connection pool. Every service operation opens its own
    /// transaction on it.
    pub pool: SqlitePool,
    /// Access-token signing and verification keys.
    pub tokens: TokenKeys,
    /// Prometheus render handle, present when the binary installed a recorder.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from configuration and an already-migrated pool.
    ///
    /// Only the signing secret is kept, inside the token keys.
    pub fn new(config: &AppConfig, pool: SqlitePool) -> Self {
        let tokens = TokenKeys::new(config.jwt_secret.as_bytes());
        Self {
            pool,
            tokens,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle so `/metrics` can render it.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
