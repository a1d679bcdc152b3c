//! node-bridge server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum fallback ──▶ blocking pool ──▶ Router ──▶ RequestHandler
//!                     (request id,                        (method,         │
//!                      trace, timeout)                     pattern)        ▼
//!                                                                     NodeStore
//!     Client Response                                                      │
//!     ◀────────────── ResponseContext ◀── ApiResult ◀── GraphWalker ◀──────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use node_bridge::config::{load_config, BridgeConfig};
use node_bridge::observability::{logging, metrics};
use node_bridge::{build_api_router, HttpServer, MemoryNodeStore, Shutdown};

#[derive(Parser)]
#[command(name = "node-bridge")]
#[command(about = "HTTP API over a host node graph", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Populate the project with a demo network.
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    config.project.seed_demo |= args.seed_demo;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "node-bridge starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        project = %config.project.root_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(MemoryNodeStore::new(&config.project.root_path)?);
    if config.project.seed_demo {
        store.seed_demo()?;
    }

    let router = build_api_router(store, &config.server.name)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _signals = shutdown.trigger_on_signal();

    let server = HttpServer::new(config, Arc::new(router));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
