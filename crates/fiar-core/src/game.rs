//! Game record and status

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::board::{Board, Marker};

/// Unique identifier for a game
pub type GameId = Uuid;

/// Lifecycle status of a game. Every status except `InProgress` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    InProgress,
    PlayerOneWon,
    PlayerTwoWon,
    Draw,
}

impl GameStatus {
    /// Whether no further moves are accepted
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::InProgress => "IN_PROGRESS",
            GameStatus::PlayerOneWon => "PLAYER_ONE_WON",
            GameStatus::PlayerTwoWon => "PLAYER_TWO_WON",
            GameStatus::Draw => "DRAW",
        };
        f.write_str(s)
    }
}

/// One match between two named players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub player_one: String,
    pub player_two: String,
    pub board: Board,
    /// Player who must submit the next move; frozen once the game ends
    pub current_player: String,
    pub status: GameStatus,
}

impl Game {
    /// Create a fresh game with an empty board and a random starting player.
    ///
    /// Inputs are assumed to be validated by the caller.
    pub fn new<R: Rng + ?Sized>(
        player_one: impl Into<String>,
        player_two: impl Into<String>,
        width: usize,
        height: usize,
        rng: &mut R,
    ) -> Self {
        let player_one = player_one.into();
        let player_two = player_two.into();
        let current_player = if rng.gen_bool(0.5) {
            player_one.clone()
        } else {
            player_two.clone()
        };

        Self {
            id: Uuid::new_v4(),
            player_one,
            player_two,
            board: Board::new(width, height),
            current_player,
            status: GameStatus::InProgress,
        }
    }

    /// Marker owned by `player`, or `None` if they are not in this game.
    ///
    /// When both players share a name, the name maps to player one.
    pub fn marker_for(&self, player: &str) -> Option<Marker> {
        if player == self.player_one {
            Some(Marker::PlayerOne)
        } else if player == self.player_two {
            Some(Marker::PlayerTwo)
        } else {
            None
        }
    }

    /// The registered player other than `marker`'s owner
    pub fn opponent_of(&self, marker: Marker) -> &str {
        match marker {
            Marker::PlayerOne => &self.player_two,
            Marker::PlayerTwo => &self.player_one,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Game {} [{}] {} vs {} (next: {})",
            self.id, self.status, self.player_one, self.player_two, self.current_player
        )?;
        write!(f, "{}", self.board)
    }
}
