//! offline-agent server entry point.
//!
//! Loads configuration, opens the response cache, optionally installs and
//! activates the configured version, then serves MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use offline_client::{FetchClient, FetchConfig};
use offline_core::{AppConfig, CacheDb};
use offline_worker::OfflineWorker;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(version = %config.app_version, origin = %config.origin, "Starting offline-agent on stdio transport");

    let store = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let worker = Arc::new(OfflineWorker::from_config(&config, store, network)?);

    if config.install_on_start {
        match worker.install().await {
            Ok(report) => {
                tracing::info!(static_assets = report.static_assets, pages = report.pages, "Install complete");
                match worker.activate().await {
                    Ok(report) => tracing::info!(deleted = ?report.deleted, failed = ?report.failed, "Activated"),
                    Err(e) => tracing::error!(error = %e, "Activation failed"),
                }
            }
            Err(e) => tracing::error!(error = %e, "Install failed; requests pass through until a later install"),
        }
    }

    let handler = handler::OfflineAgentServer::new(worker.clone());
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;
    worker.flush().await;

    Ok(())
}
