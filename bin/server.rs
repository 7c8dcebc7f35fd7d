// Budget Ledger - Web Server
// REST API with Axum over the SQLite registry store

use anyhow::{Context, Result};
use budget_ledger::{api, init_tracing, Ledger, LedgerConfig, SqliteRegistryStore};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BUDGET_LEDGER_CONFIG").ok())
        .map(PathBuf::from);
    let config = LedgerConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.log_filter);

    let store = SqliteRegistryStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    tracing::info!(database = %config.database_path.display(), "database opened");

    let app = api::router(Arc::new(Ledger::new(store)));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "budget ledger listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}
