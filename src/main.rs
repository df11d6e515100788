//! Maintenance Warden
//!
//! Standalone maintenance gate in front of a single upstream.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ ┌──────────┐   disabled / bypass   ┌──────────────┐
//!                     │   gate   │──────────────────────▶│   upstream   │
//!                     │ (Warden) │                       └──────────────┘
//!                     └────┬─────┘
//!                          │ maintenance
//!                          ▼
//!                  ┌──────────────┐
//!                  │  dispatcher  │──▶ inline | file cache | maintenance service
//!                  └──────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use maintenance_warden::config::load_config;
use maintenance_warden::observability::logging;
use maintenance_warden::{HttpServer, Shutdown, Warden};

#[derive(Parser, Debug)]
#[command(name = "maintenance-warden", version, about = "HTTP maintenance-mode gate")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the upstream origin
    #[arg(long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(upstream) = args.upstream {
        config.server.upstream = upstream;
    }

    let warden = Warden::new(&config.maintenance)?;
    logging::init(warden.log_level());
    tracing::info!("maintenance-warden v{} starting", env!("CARGO_PKG_VERSION"));

    let server = HttpServer::new(config.server.clone(), warden)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        signal.trigger_on_ctrl_c().await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
