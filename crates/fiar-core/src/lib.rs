//! # fiar-core
//!
//! Board engine and data model for four-in-a-row.
//!
//! This crate provides:
//! - `Board`, `Cell` and `Marker` for the grid
//! - Pure win and full-board detection (`check_win`, `is_board_full`)
//! - The `Game` record and its `GameStatus`
//! - Error types shared with the server

pub mod board;
pub mod error;
pub mod game;

pub use board::{Board, Cell, MAX_BOARD_CELLS, Marker, WIN_LENGTH, check_win, is_board_full};
pub use error::{FiarError, InvalidRequest, Result, error_codes};
pub use game::{Game, GameId, GameStatus};
