//! Computer opponent move selection.

use super::position::Position;
use super::rules;
use super::types::{Board, Mark};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// What a policy decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Place the mark here.
    Place(Position),
    /// The board has no empty cell.
    NoMoveAvailable,
}

/// Selects the computer's next move.
pub trait OpponentPolicy: Send {
    /// Chooses an empty cell for `mark` on `board`.
    fn select(&mut self, board: &Board, mark: Mark) -> Decision;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Which policy to build, as named in configuration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PolicyKind {
    /// [`HeuristicPolicy`].
    #[default]
    Heuristic,
    /// [`RandomPolicy`].
    Random,
}

impl PolicyKind {
    /// Builds the policy; `seed` feeds the random variant.
    pub fn build(self, seed: u64) -> Box<dyn OpponentPolicy> {
        match self {
            PolicyKind::Heuristic => Box::new(HeuristicPolicy::new()),
            PolicyKind::Random => Box::new(RandomPolicy::new(StdRng::seed_from_u64(seed))),
        }
    }
}

/// Priority-ordered heuristic.
///
/// In order, first match wins: complete own line, block the opponent's
/// line, take the center, take the lowest free corner, take the lowest free
/// side. Ties among winning or blocking cells go to the lowest index.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    /// Creates the policy.
    pub fn new() -> Self {
        Self
    }

    /// Lowest empty position that completes a line for `mark`.
    fn completing_move(board: &Board, empties: &[Position], mark: Mark) -> Option<Position> {
        empties
            .iter()
            .copied()
            .find(|pos| rules::has_won(&board.with_mark(pos.to_index(), mark), mark))
    }

    fn first_free(board: &Board, candidates: &[Position]) -> Option<Position> {
        candidates
            .iter()
            .copied()
            .find(|pos| board.is_empty(pos.to_index()))
    }
}

impl OpponentPolicy for HeuristicPolicy {
    #[instrument(skip(self, board), fields(policy = self.name()))]
    fn select(&mut self, board: &Board, mark: Mark) -> Decision {
        let empties = Position::valid_moves(board);
        if empties.is_empty() {
            debug!("No empty cells");
            return Decision::NoMoveAvailable;
        }

        if let Some(pos) = Self::completing_move(board, &empties, mark) {
            debug!(position = %pos, "Taking winning move");
            return Decision::Place(pos);
        }

        if let Some(pos) = Self::completing_move(board, &empties, mark.opponent()) {
            debug!(position = %pos, "Blocking opponent");
            return Decision::Place(pos);
        }

        let positional = Self::first_free(board, &[Position::Center])
            .or_else(|| Self::first_free(board, &Position::CORNERS))
            .or_else(|| Self::first_free(board, &Position::SIDES));

        match positional {
            Some(pos) => {
                debug!(position = %pos, "Taking positional move");
                Decision::Place(pos)
            }
            None => Decision::NoMoveAvailable,
        }
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Uniform choice among empty cells.
#[derive(Debug, Clone)]
pub struct RandomPolicy<R> {
    rng: R,
}

impl<R: Rng + Send> RandomPolicy<R> {
    /// Creates the policy drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> OpponentPolicy for RandomPolicy<R> {
    #[instrument(skip(self, board), fields(policy = self.name()))]
    fn select(&mut self, board: &Board, _mark: Mark) -> Decision {
        let empties = Position::valid_moves(board);
        match empties.choose(&mut self.rng) {
            Some(pos) => {
                debug!(position = %pos, "Picked random move");
                Decision::Place(*pos)
            }
            None => Decision::NoMoveAvailable,
        }
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
