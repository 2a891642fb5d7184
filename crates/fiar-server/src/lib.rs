//! # fiar-server
//!
//! MCP server for four-in-a-row.
//!
//! This crate provides:
//! - `GameRegistry`, the concurrent store of games and move validation
//! - MCP JSON-RPC protocol handling
//! - Tool implementations (create_game, make_move, check_win, etc.)
//! - A newline-delimited stdio transport

pub mod config;
pub mod mcp;
pub mod registry;
pub mod tools;
pub mod transport;

pub use config::ServerConfig;
pub use registry::GameRegistry;

use fiar_core::Result;
use std::sync::Arc;

/// Four-in-a-row MCP server
pub struct FiarServer {
    /// Game store shared by all requests
    registry: Arc<GameRegistry>,
    /// Server configuration
    config: ServerConfig,
}

impl FiarServer {
    /// Create a server with a fresh registry built from `config`
    pub fn new(config: ServerConfig) -> Self {
        let registry = match config.seed {
            Some(seed) => GameRegistry::with_seed(seed),
            None => GameRegistry::new(),
        };
        Self::with_registry(Arc::new(registry), config)
    }

    /// Create a server around an existing registry
    pub fn with_registry(registry: Arc<GameRegistry>, config: ServerConfig) -> Self {
        Self { registry, config }
    }

    /// Run the server on stdio transport
    pub async fn run_stdio(self) -> Result<()> {
        transport::stdio::run(self).await
    }

    /// Shared game registry
    pub fn registry(&self) -> &Arc<GameRegistry> {
        &self.registry
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
