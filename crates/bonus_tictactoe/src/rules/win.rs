//! Win detection.

use super::super::action::MoveError;
use super::super::position::Position;
use super::super::types::{Board, Mark};
use tracing::{error, instrument};

/// The 8 lines that win when uniformly marked.
pub const WIN_LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Checks whether `mark` holds any complete line.
pub fn has_won(board: &Board, mark: Mark) -> bool {
    let target = mark.cell();
    WIN_LINES
        .iter()
        .any(|line| line.iter().all(|pos| board.get(pos.to_index()) == Some(target)))
}

/// Returns the mark holding a complete line, if any.
///
/// Each mark is checked independently, so the answer does not depend on
/// line order.
///
/// # Errors
///
/// Returns [`MoveError::InvariantViolation`] if both marks hold a line.
#[instrument(skip(board))]
pub fn winner(board: &Board) -> Result<Option<Mark>, MoveError> {
    match (has_won(board, Mark::Human), has_won(board, Mark::Computer)) {
        (true, true) => {
            error!(board = %board.display(), "Both marks hold a winning line");
            Err(MoveError::InvariantViolation(
                "both marks hold a winning line".to_string(),
            ))
        }
        (true, false) => Ok(Some(Mark::Human)),
        (false, true) => Ok(Some(Mark::Computer)),
        (false, false) => Ok(None),
    }
}
