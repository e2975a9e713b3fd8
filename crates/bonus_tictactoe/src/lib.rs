//! Tic-tac-toe against a computer opponent.
//!
//! The human always plays first. After each human move the
//! [`GameController`] hands back a [`PendingMove`] ticket; the caller waits
//! out its delay and plays the computer's reply. The computer picks its cell
//! with a [`HeuristicPolicy`] (win, block, center, corner, side) unless
//! configured with the [`RandomPolicy`].
//!
//! When a game ends the controller calls its [`OutcomeNotifier`] exactly
//! once: `win` with a 5-digit [`RewardCode`] if the human won, `loss`
//! otherwise (draws included).
//!
//! # Example
//!
//! ```
//! use bonus_tictactoe::{GameController, HeuristicPolicy, LogNotifier, Step};
//! use std::sync::Arc;
//!
//! let policy = Box::new(HeuristicPolicy::new());
//! let mut game = GameController::seeded(policy, Arc::new(LogNotifier), 7);
//! if let Ok(Step::ComputerToMove(pending)) = game.place_by_human(4) {
//!     game.play_computer_move(pending).unwrap();
//! }
//! assert_eq!(game.history().len(), 2);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod controller;
mod invariants;
mod notifier;
mod outcome;
mod policy;
mod position;
mod reward;
pub mod rules;
mod types;

pub use action::{Move, MoveError};
pub use controller::{GameController, GameView, PendingMove, Phase, Step, ThinkingDelay};
pub use invariants::{
    AlternatingTurns, BalancedMarks, GameInvariants, GameRecord, HistoryConsistent, Invariant,
    InvariantSet, SingleWinner,
};
pub use notifier::{LogNotifier, OutcomeNotice, OutcomeNotifier, RecordingNotifier};
pub use outcome::{GameResult, Outcome};
pub use policy::{Decision, HeuristicPolicy, OpponentPolicy, PolicyKind, RandomPolicy};
pub use position::Position;
pub use reward::RewardCode;
pub use types::{Board, CELL_COUNT, Cell, Mark};
