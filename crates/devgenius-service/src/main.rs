//! DevGenius Service - HTTP API for the DevGenius coding assistant
//!
//! This is the main entry point for the devgenius service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devgenius_service::{create_router, AppState, ServiceConfig};
use devgenius_store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,devgenius=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DevGenius Service");

    let config = ServiceConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_file = %config.data_file,
        genai_configured = %config.gemini_api_key.is_some(),
        payment_callbacks = %config.payment_webhook_secret.is_some(),
        quota_period = %config.quota.period,
        free_limit = config.quota.free_limit,
        "Service configuration loaded"
    );

    tracing::info!(path = %config.data_file, "Opening JSON store");
    let store = Arc::new(JsonFileStore::open(&config.data_file)?);

    let state = AppState::new(store, config.clone());

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
