//! Board grid and win detection
//!
//! The engine only examines the grid. Deciding whether a move is legal and
//! whose turn it is belongs to the registry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidRequest;
use crate::game::GameStatus;

/// Number of aligned markers needed to win
pub const WIN_LENGTH: usize = 4;

/// Largest board (in cells) a game may be created with
pub const MAX_BOARD_CELLS: usize = 1 << 16;

/// Row/column steps for the four scan directions: row, column, ↗ and ↘
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (-1, 1), (1, 1)];

/// Contents of a single cell, serialized as 0, 1 or 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Cell {
    #[default]
    Empty,
    PlayerOne,
    PlayerTwo,
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => 0,
            Cell::PlayerOne => 1,
            Cell::PlayerTwo => 2,
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = InvalidRequest;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            1 => Ok(Cell::PlayerOne),
            2 => Ok(Cell::PlayerTwo),
            other => Err(InvalidRequest::MalformedBoard(format!(
                "cell value {} is not 0, 1 or 2",
                other
            ))),
        }
    }
}

/// Token identifying which of the two players owns a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    PlayerOne,
    PlayerTwo,
}

impl Marker {
    /// Wire number of this marker (1 or 2)
    pub fn number(self) -> u8 {
        u8::from(Cell::from(self))
    }

    /// Status reached when this marker completes a line
    pub fn winning_status(self) -> GameStatus {
        match self {
            Marker::PlayerOne => GameStatus::PlayerOneWon,
            Marker::PlayerTwo => GameStatus::PlayerTwoWon,
        }
    }
}

impl From<Marker> for Cell {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::PlayerOne => Cell::PlayerOne,
            Marker::PlayerTwo => Cell::PlayerTwo,
        }
    }
}

impl TryFrom<i64> for Marker {
    type Error = InvalidRequest;

    fn try_from(number: i64) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(Marker::PlayerOne),
            2 => Ok(Marker::PlayerTwo),
            other => Err(InvalidRequest::InvalidPlayerNumber(other)),
        }
    }
}

/// Rectangular grid of cells; row 0 is the top row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Board {
    rows: Vec<Vec<Cell>>,
}

impl Board {
    /// Create an empty board with `height` rows of `width` cells
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            rows: vec![vec![Cell::Empty; width]; height],
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cell at `(row, column)`, or `None` when out of range
    pub fn get(&self, row: usize, column: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Overwrite a cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, row: usize, column: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *slot = cell;
        }
    }

    /// A column is full when its top cell is occupied
    pub fn is_column_full(&self, column: usize) -> bool {
        self.get(0, column).is_some_and(|cell| cell != Cell::Empty)
    }

    /// Lowest empty row in `column`, scanning from the bottom up
    pub fn lowest_empty_row(&self, column: usize) -> Option<usize> {
        (0..self.height())
            .rev()
            .find(|&row| self.get(row, column) == Some(Cell::Empty))
    }

    fn cell_at(&self, row: isize, column: isize) -> Option<Cell> {
        if row < 0 || column < 0 {
            return None;
        }
        self.get(row as usize, column as usize)
    }

    /// Whether `WIN_LENGTH` cells starting at `(row, column)` and stepping
    /// by `(dr, dc)` all hold `target`
    fn window_matches(
        &self,
        row: usize,
        column: usize,
        (dr, dc): (isize, isize),
        target: Cell,
    ) -> bool {
        (0..WIN_LENGTH as isize).all(|k| {
            self.cell_at(row as isize + k * dr, column as isize + k * dc) == Some(target)
        })
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Board {
    type Error = InvalidRequest;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        let width = match rows.first() {
            None => return Err(InvalidRequest::MalformedBoard("board has no rows".into())),
            Some(first) if first.is_empty() => {
                return Err(InvalidRequest::MalformedBoard("board has no columns".into()));
            }
            Some(first) => first.len(),
        };
        if let Some(idx) = rows.iter().position(|row| row.len() != width) {
            return Err(InvalidRequest::MalformedBoard(format!(
                "row {} has {} cells, expected {}",
                idx,
                rows[idx].len(),
                width
            )));
        }
        Ok(Self { rows })
    }
}

impl From<Board> for Vec<Vec<Cell>> {
    fn from(board: Board) -> Self {
        board.rows
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line = row
                .iter()
                .map(|&cell| u8::from(cell).to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Check whether `marker` has four in a row anywhere on `board`.
///
/// Returns the matching win status, or `InProgress` when no line exists.
/// Windows that would leave the grid are never examined, so boards smaller
/// than four cells in some direction simply never win along it.
pub fn check_win(marker: Marker, board: &Board) -> GameStatus {
    let target = Cell::from(marker);
    for direction in DIRECTIONS {
        for row in 0..board.height() {
            for column in 0..board.width() {
                if board.window_matches(row, column, direction, target) {
                    return marker.winning_status();
                }
            }
        }
    }
    GameStatus::InProgress
}

/// True when no cell is empty
pub fn is_board_full(board: &Board) -> bool {
    board
        .rows
        .iter()
        .all(|row| row.iter().all(|&cell| cell != Cell::Empty))
}
