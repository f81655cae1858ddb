//! RESP logging proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                     RESP PROXY                        │
//!                    │                                                       │
//!   Client request   │  ┌─────────┐    ┌──────────┐    ┌──────────┐         │
//!   ─────────────────┼─▶│   net   │───▶│ session  │───▶│ protocol │         │
//!                    │  │listener │    │ inbound  │    │ decoder  │         │
//!                    │  └─────────┘    └────┬─────┘    └────┬─────┘         │
//!                    │                      │               ▼               │
//!                    │                      │         ┌──────────┐          │
//!                    │                      │         │ classify │──▶ sink  │
//!                    │                      │         └──────────┘          │
//!                    │                      └── raw bytes ───────────────────┼──▶ Backend
//!   Client response  │  ┌──────────┐                                         │
//!   ◀────────────────┼──│ session  │◀────────── raw bytes ───────────────────┼─── Backend
//!                    │  │ outbound │                                         │
//!                    │  └──────────┘                                         │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use resp_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use resp_proxy::lifecycle::{signals, Shutdown};
use resp_proxy::observability::{logging, metrics};
use resp_proxy::ProxyServer;

/// Transparent RESP proxy that logs every command it forwards.
#[derive(Parser, Debug)]
#[command(name = "resp-proxy")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address
    #[arg(short, long)]
    listen: Option<String>,

    /// Override backend.address
    #[arg(short, long)]
    backend: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }
    if let Some(backend) = cli.backend {
        config.backend.address = backend;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_addr = %config.listener.bind_address,
        backend_addr = %config.backend.address,
        max_connections = config.listener.max_connections,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let drain_timeout = Duration::from_secs(config.shutdown.drain_timeout_secs);
    let shutdown = Shutdown::new();
    let server = ProxyServer::new(config);
    let tracker = server.tracker();

    let mut server_task = tokio::spawn(server.start(shutdown.subscribe()));

    tokio::select! {
        signal = signals::wait_for_signal() => {
            let signal = signal?;
            tracing::info!(signal, "Received signal");
            shutdown.trigger();
        }
        result = &mut server_task => {
            result??;
            tracing::warn!("Proxy stopped without a shutdown signal");
            return Ok(());
        }
    }

    server_task.await??;

    if tokio::time::timeout(drain_timeout, tracker.wait_for_drain()).await.is_err() {
        tracing::warn!(
            active_sessions = tracker.active_count(),
            "Drain timeout elapsed, dropping remaining sessions"
        );
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
