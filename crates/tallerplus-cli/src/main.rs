//! # tallerplus CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tallerplus_cli::admin::{run_create_admin, CreateAdminArgs};
use tallerplus_cli::migrate::run_migrate;
use tallerplus_cli::DEFAULT_DATABASE_URL;

/// TallerPlus operator CLI.
///
/// Applies database migrations and provisions the initial admin user.
#[derive(Parser, Debug)]
#[command(name = "tallerplus", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// SQLx SQLite connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending database migrations.
    Migrate,

    /// Apply migrations and create the admin user if it does not exist.
    CreateAdmin(CreateAdminArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // A local `.env` fills in variables the environment does not set.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match &cli.command {
        Commands::Migrate => run_migrate(&cli.database_url).await,
        Commands::CreateAdmin(args) => run_create_admin(args, &cli.database_url).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
