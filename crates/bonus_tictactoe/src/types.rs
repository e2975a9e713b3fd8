//! Core domain types for tic-tac-toe against the computer.

use super::action::MoveError;
use super::rules;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// One of the two sides in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mark {
    /// The human player (always moves first).
    Human,
    /// The computer opponent.
    Computer,
}

impl Mark {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Mark::Human => Mark::Computer,
            Mark::Computer => Mark::Human,
        }
    }

    /// Returns the cell value this mark leaves on the board.
    pub fn cell(self) -> Cell {
        match self {
            Mark::Human => Cell::Human,
            Mark::Computer => Cell::Computer,
        }
    }
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Occupied by the human.
    Human,
    /// Occupied by the computer.
    Computer,
}

impl Cell {
    /// Returns the mark occupying this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Human => Some(Mark::Human),
            Cell::Computer => Some(Mark::Computer),
        }
    }
}

/// 3x3 board, cells in row-major order (0-8).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from raw cells.
    ///
    /// No play-order validation happens here; use [`rules::evaluate`] to
    /// check the result.
    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// Gets the cell at the given index (0-8).
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks if the cell at `index` is on the board and empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Indices of all empty cells in ascending order.
    pub fn empty_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(index, _)| index)
    }

    /// Number of cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|cell| **cell == mark.cell()).count()
    }

    /// Places `mark` at `index`.
    ///
    /// # Errors
    ///
    /// - [`MoveError::OutOfRange`] if `index` is not in 0..9
    /// - [`MoveError::CellOccupied`] if the cell already holds a mark
    /// - [`MoveError::GameOver`] if the board already has a winner or is full
    /// - [`MoveError::InvariantViolation`] if both marks already hold a line
    ///
    /// The board is left untouched on every error.
    #[instrument(skip(self))]
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), MoveError> {
        if index >= CELL_COUNT {
            return Err(MoveError::OutOfRange(index));
        }
        if rules::evaluate(self)?.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if self.cells[index] != Cell::Empty {
            return Err(MoveError::CellOccupied(index));
        }
        self.cells[index] = mark.cell();
        Ok(())
    }

    /// Returns a copy of this board with `mark` written at `index`.
    ///
    /// Used for look-ahead; it skips every check `place` performs.
    pub(crate) fn with_mark(&self, index: usize, mark: Mark) -> Self {
        let mut next = self.clone();
        next.cells[index] = mark.cell();
        next
    }

    /// Clears every cell.
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; CELL_COUNT];
    }

    /// Formats the board as a human-readable string.
    ///
    /// Empty cells show their index so a terminal player knows what to type.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let index = row * 3 + col;
                let symbol = match self.cells[index] {
                    Cell::Empty => index.to_string(),
                    Cell::Human => "X".to_string(),
                    Cell::Computer => "O".to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}
