//! Encrypted request/response protocol server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                     PNP SERVER                       │
//!                        │                                                      │
//!   encrypted frame      │  ┌──────────┐   ┌──────────┐   ┌──────────────────┐  │
//!   ─────────────────────┼─▶│   net    │──▶│  crypto  │──▶│    protocol      │  │
//!                        │  │ listener │   │ decrypt  │   │ decode request   │  │
//!                        │  └──────────┘   └──────────┘   └────────┬─────────┘  │
//!                        │                                         │            │
//!                        │                                         ▼            │
//!                        │                                ┌──────────────────┐  │
//!                        │                                │     routing      │  │
//!                        │                                │ (method, path) → │  │
//!                        │                                │     handler      │  │
//!                        │                                └────────┬─────────┘  │
//!                        │                                         │            │
//!   encrypted reply      │  ┌──────────┐   ┌──────────┐   ┌────────▼─────────┐  │
//!   ◀────────────────────┼──│  socket  │◀──│  crypto  │◀──│    protocol      │  │
//!                        │  │  write   │   │ encrypt  │   │ encode response  │  │
//!                        │  └──────────┘   └──────────┘   └──────────────────┘  │
//!                        │                                                      │
//!                        │   config · observability · lifecycle (shutdown)      │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use pnp_server::lifecycle::{signals, startup};
use pnp_server::observability::{logging, metrics};
use pnp_server::protocol::{status, Request, Response};
use pnp_server::{PnpServer, Router, Shutdown};

#[derive(Parser)]
#[command(name = "pnp-server")]
#[command(about = "Encrypted request/response protocol server", long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Shared key as 64 hex characters (overrides the config file).
    #[arg(short, long, env = "PNP_KEY")]
    key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = startup::resolve_config(args.config.as_deref())?;
    if let Some(key) = args.key {
        config.crypto.key = key;
    }
    let port = args.port.unwrap_or(config.listener.port);

    logging::init_logging(&config.observability);
    tracing::info!("pnp-server v{} starting", env!("CARGO_PKG_VERSION"));

    let codec = startup::codec_from_config(&config.crypto)?;

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let mut router = Router::new();
    router.get("/health", |_: &Request, res: &mut Response| {
        res.set_status(status::OK).set_body("ok");
    });

    let shutdown = Shutdown::new();
    let server = PnpServer::new(config, router, codec);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server
        .listen(
            port,
            |addr| tracing::info!(address = %addr, "Listening for connections"),
            server_shutdown,
        )
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
