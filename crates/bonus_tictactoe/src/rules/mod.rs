//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]; nothing here mutates state.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{WIN_LINES, has_won, winner};

use super::action::MoveError;
use super::outcome::Outcome;
use super::types::{Board, Mark};
use tracing::instrument;

/// Derives the outcome of `board`.
///
/// # Errors
///
/// Returns [`MoveError::InvariantViolation`] if both marks complete a line,
/// which alternating play can never produce.
#[instrument(skip(board))]
pub fn evaluate(board: &Board) -> Result<Outcome, MoveError> {
    match winner(board)? {
        Some(Mark::Human) => Ok(Outcome::HumanWin),
        Some(Mark::Computer) => Ok(Outcome::ComputerWin),
        None if is_full(board) => Ok(Outcome::Draw),
        None => Ok(Outcome::InProgress),
    }
}
