//! Thumbnail gateway (v1)
//!
//! Turns YouTube thumbnails into image-generation prompts and renders those
//! prompts into new images.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser / thumbs-cli
//!          │
//!          ▼
//!   ┌──────────────┐   ┌──────────────────────┐
//!   │ http server  │──▶│ youtube (id, urls)   │──▶ img.youtube.com
//!   │ + middleware │   └──────────────────────┘
//!   │              │   ┌──────────────────────┐
//!   │              │──▶│ providers            │──▶ Gemini generateContent
//!   └──────────────┘   │ gemini → gateway     │──▶ chat-completions gateway
//!                      └──────────────────────┘
//!
//!   cross-cutting: config (+ hot reload), observability, security, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use thumbnail_gateway::config::{load_config, load_from_env, watcher::ConfigWatcher};
use thumbnail_gateway::lifecycle::{wait_for_signal, Shutdown};
use thumbnail_gateway::observability::{logging, metrics};
use thumbnail_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "thumbnail-gateway", version)]
#[command(about = "HTTP gateway for thumbnail prompt and image generation", long_about = None)]
struct Args {
    /// TOML config file. Watched for changes when given.
    #[arg(short, long, env = "THUMBNAIL_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init(&config.observability);
    tracing::info!("thumbnail-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        rate_limit = config.rate_limit.enabled,
        "Configuration loaded"
    );

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

    // The watcher handle must outlive the server for events to keep flowing.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(handle), rx),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (None, rx)
                }
            }
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
