//! Error types for four-in-a-row

use crate::game::GameId;
use thiserror::Error;

/// Result type for four-in-a-row operations
pub type Result<T> = std::result::Result<T, FiarError>;

/// Errors surfaced by the engine, registry and transport
#[derive(Debug, Error)]
pub enum FiarError {
    /// Caller error; the request must be changed before it can succeed
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequest),

    /// Malformed JSON-RPC traffic
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid server configuration or command-line arguments
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for FiarError {
    fn from(err: serde_json::Error) -> Self {
        FiarError::Serialization(err.to_string())
    }
}

/// Reason a request was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    #[error(
        "Board dimensions must be positive and at most {max_cells} cells in total (got {width}x{height})",
        max_cells = crate::board::MAX_BOARD_CELLS
    )]
    BadDimensions { width: i64, height: i64 },

    #[error("Player names cannot be null or empty")]
    EmptyPlayerName,

    #[error("Game ID cannot be null or empty")]
    MissingGameId,

    #[error("Game not found for the provided ID: {0}")]
    GameNotFound(String),

    #[error("Game {0} is already over")]
    GameOver(GameId),

    #[error("Invalid player for the game: {0}")]
    UnknownPlayer(String),

    #[error("It's not your turn, {0}")]
    NotYourTurn(String),

    #[error("Invalid column index: {0}")]
    InvalidColumn(i64),

    #[error("Column {0} is full")]
    ColumnFull(usize),

    #[error("Player number must be 1 or 2 (got {0})")]
    InvalidPlayerNumber(i64),

    #[error("Malformed board: {0}")]
    MalformedBoard(String),
}

/// JSON-RPC error codes
pub mod error_codes {
    pub const INVALID_REQUEST: i32 = -32000;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}
