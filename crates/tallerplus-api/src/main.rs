//! # tallerplus-api server binary
//!
//! Reads configuration from the environment (after loading a `.env` file in
//! the working directory, if present), connects to SQLite and applies
//! migrations, installs the Prometheus recorder, and serves the API until
//! Ctrl-C.

use metrics_exporter_prometheus::PrometheusBuilder;
use tallerplus_api::state::{AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET_KEY not set; signing tokens with the development default");
    }

    let pool = tallerplus_api::db::init_pool(&config.database_url).await?;
    tallerplus_api::services::auth::prepare_dummy_hash().await?;
    let metrics = PrometheusBuilder::new().install_recorder()?;

    let addr = config.bind_addr();
    let state = AppState::new(&config, pool).with_metrics(metrics);
    let app = tallerplus_api::app(state);

    tracing::info!("Starting TallerPlus API on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
