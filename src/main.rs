use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use audit_proxy::config::{load_config, AppConfig, StorageBackend};
use audit_proxy::observability::{logging, ProxyMetrics};
use audit_proxy::store::{MemorySessionStore, PostgresSessionStore, SessionStore};
use audit_proxy::HttpServer;

/// Transparent HTTP forwarding proxy with durable session capture.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability.log_filter);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        route_prefix = %config.upstream.route_prefix,
        request_timeout_ms = config.upstream.request_timeout_ms,
        "Configuration loaded"
    );

    let store: Arc<dyn SessionStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let store = PostgresSessionStore::connect(
                &config.storage.database_url,
                config.storage.max_connections,
            )
            .await?;
            tracing::info!(max_connections = config.storage.max_connections, "Connected to Postgres");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory session store; records are not durable");
            Arc::new(MemorySessionStore::new())
        }
    };

    let metrics = Arc::new(ProxyMetrics::new()?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, store, metrics);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
