//! Moves and the errors that reject them.

use super::{Mark, Position};
use serde::{Deserialize, Serialize};

/// A mark placed at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The side making the move.
    pub mark: Mark,
    /// Where the mark went.
    pub position: Position,
}

impl Move {
    /// Creates a new move.
    pub fn new(mark: Mark, position: Position) -> Self {
        Self { mark, position }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.position.label())
    }
}

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The index is not on the board.
    #[display("Cell {} is out of range (must be 0-8)", _0)]
    OutOfRange(usize),

    /// The cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(usize),

    /// The game already has a winner or is drawn.
    #[display("Game is already over")]
    GameOver,

    /// The human tried to move while the computer is thinking.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(Mark),

    /// A scheduled computer move no longer matches the current turn.
    #[display("Scheduled computer move {} is stale", _0)]
    StaleMove(u64),

    /// Board state that correct play cannot reach.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl MoveError {
    /// True for the recoverable rejections a caller reports as "move ignored".
    pub fn is_invalid_move(&self) -> bool {
        matches!(
            self,
            MoveError::OutOfRange(_)
                | MoveError::CellOccupied(_)
                | MoveError::GameOver
                | MoveError::NotYourTurn(_)
        )
    }
}

impl std::error::Error for MoveError {}
