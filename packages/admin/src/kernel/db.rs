//! Connection pool lifecycle shared by the admin binaries.

use std::future::Future;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

/// Connect a pool using the configured host, credentials and TLS mode.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        ssl_mode = ?config.ssl_mode(),
        "Connecting to database"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.connect_options())
        .await
        .context("Failed to connect to database")
}

/// Run `work` against `pool`, then close the pool whatever the outcome.
///
/// The closure receives its own handle; the pool is closed after the work
/// future resolves, on the success path and the error path alike.
pub async fn with_pool<F, Fut, T>(pool: PgPool, work: F) -> Result<T>
where
    F: FnOnce(PgPool) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let result = work(pool.clone()).await;

    debug!("Closing database pool");
    pool.close().await;

    result
}
