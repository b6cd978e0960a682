//! # tallerplus-cli: Operator CLI for TallerPlus
//!
//! Provides the `tallerplus` command-line interface for database chores that
//! must happen outside the HTTP API.
//!
//! ## Subcommands
//!
//! - `tallerplus migrate`: Apply pending schema migrations.
//! - `tallerplus create-admin`: Apply migrations, then create the initial
//!   admin user. Running it again is harmless.
//!
//! ```bash
//! tallerplus --database-url sqlite://data.db migrate
//! tallerplus create-admin --email admin@tallerplus.com --password Admin123
//! ```

pub mod admin;
pub mod migrate;

/// Database used when neither `--database-url` nor `DATABASE_URL` is set.
pub const DEFAULT_DATABASE_URL: &str = tallerplus_api::state::DEFAULT_DATABASE_URL;
