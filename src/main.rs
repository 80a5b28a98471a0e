//! Block explorer backend.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (request ID, trace, timeout)
//!                       │
//!          ┌────────────┼─────────────────┬──────────────┐
//!          ▼            ▼                 ▼              ▼
//!    transaction    transfers          account        blocks
//!     pipeline      aggregator          reads          reads
//!          │            │                 │              │
//!          └────────────┴────────┬────────┴──────────────┘
//!                                ▼
//!                     factory → ChainProvider (one per network)
//!                                │
//!                                ▼
//!                       chain-data provider (JSON-RPC)
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use block_explorer::blockchain::ClientFactory;
use block_explorer::config::load_or_default;
use block_explorer::http::HttpServer;
use block_explorer::lifecycle::Shutdown;
use block_explorer::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "block-explorer")]
#[command(about = "Block explorer backend for Ethereum-compatible networks", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "EXPLORER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("block-explorer v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        confirmation_timeout_secs = config.pipeline.confirmation_timeout_secs,
        api_key = config.provider.api_key.is_some(),
        "Configuration loaded"
    );

    if config.provider.api_key.is_none() {
        tracing::warn!("No provider API key configured; requests go to the bare endpoint URLs");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let factory = Arc::new(ClientFactory::from_config(&config));
    let server = HttpServer::new(config, factory);

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
