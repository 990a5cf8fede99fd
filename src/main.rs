//! Service-mesh diagnostic endpoint.
//!
//! Echoes request metadata, forwards single proxy hops, and simulates
//! latency and errors that can be toggled live.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                      OBS TESTER                       │
//!                  │                                                       │
//!   Client Request │  ┌─────────┐    ┌──────────┐    ┌────────────┐        │
//!   ───────────────┼─▶│  http   │───▶│  faults  │───▶│ echo/proxy │────────┼──▶ Upstream
//!                  │  │ server  │    │ latency/ │    │  handlers  │        │    (one hop)
//!                  │  └─────────┘    │ errors   │    └─────┬──────┘        │
//!                  │       ▲         └──────────┘          │               │
//!                  │       │              ▲                ▼               │
//!   Client Response│  ┌─────────┐    ┌──────────┐    ┌────────────┐        │
//!   ◀──────────────┼──│ headers │◀───│ control  │    │ diagnostic │        │
//!                  │  │assembler│    │ /errors  │    │  headers   │        │
//!                  │  └─────────┘    │ /latency │    └────────────┘        │
//!                  │                 └──────────┘                          │
//!                  │  ┌──────────────────────────────────────────────────┐ │
//!                  │  │ config · identity · observability · lifecycle    │ │
//!                  │  └──────────────────────────────────────────────────┘ │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use obs_tester::config::ConfigWatcher;
use obs_tester::lifecycle::{signals, startup};
use obs_tester::observability::{logging, metrics};
use obs_tester::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "obs-tester")]
#[command(about = "Diagnostic HTTP endpoint for service-mesh testing", long_about = None)]
struct Args {
    /// TOML configuration file; watched for fault setting changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (mut config, rejected) =
        startup::resolve_config(args.config.as_deref(), |key| std::env::var(key).ok())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("obs-tester v{} starting", env!("CARGO_PKG_VERSION"));
    for r in &rejected {
        tracing::warn!(key = r.key, value = %r.value, error = %r.reason, "ignoring unparseable environment value");
    }

    let identity = startup::resolve_identity(&config);
    tracing::info!(
        service = %identity.service_name,
        pod = %identity.pod_name,
        namespace = %identity.namespace,
        revision = %identity.revision,
        cluster = %identity.cluster_name,
        latency_ms = config.faults.latency_ms,
        error_percent = config.faults.error_percent,
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

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(handle), updates),
                Err(e) => {
                    tracing::error!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (None, updates)
                }
            }
        }
        None => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, identity);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
