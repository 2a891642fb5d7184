//! fiar-server: four-in-a-row MCP server
//!
//! Exposes game creation, moves and win checks as MCP tools over stdio.
//! Logs go to stderr; stdout carries the protocol.
//!
//! Usage: `fiar-server [--seed <u64>] [--log <filter>]`

use anyhow::Result;
use fiar_server::{FiarServer, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?.apply_args(std::env::args().skip(1))?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match config.seed {
        Some(seed) => info!("Starting {} v{} (seed {})", config.name, config.version, seed),
        None => info!("Starting {} v{}", config.name, config.version),
    }

    let server = FiarServer::new(config);
    server.run_stdio().await?;

    Ok(())
}
