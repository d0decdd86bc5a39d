// Main entry point for the test endpoint

use admin_core::kernel::init_tracing;
use admin_core::server::{build_app, shutdown_signal};
use admin_core::ServerConfig;
use anyhow::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("Starting backend test endpoint");

    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    let app = build_app();

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Test endpoint: http://localhost:{}/api/test", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
