//! Turn sequencing for one game against the computer.
//!
//! The controller owns the board, the turn indicator, the outcome and the
//! reward code. Human moves arrive through [`GameController::place_by_human`].
//! A human move that leaves the game open hands back a [`PendingMove`]
//! ticket; whoever drives the controller waits out the ticket's delay and
//! then calls [`GameController::play_computer_move`]. Tickets are single-use
//! and die on reset, so a delayed move can never land on a fresh game.

use super::action::{Move, MoveError};
use super::invariants::{GameInvariants, GameRecord, InvariantSet};
use super::notifier::{OutcomeNotice, OutcomeNotifier};
use super::outcome::Outcome;
use super::policy::{Decision, OpponentPolicy};
use super::position::Position;
use super::reward::RewardCode;
use super::rules;
use super::types::{Board, CELL_COUNT, Cell, Mark};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Where the game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the human to pick a cell.
    AwaitingHumanMove,
    /// A computer move is scheduled.
    AwaitingComputerMove,
    /// No further moves until reset.
    Concluded(Outcome),
}

/// Bounds for the cosmetic pause before the computer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingDelay {
    /// Shortest pause, in milliseconds.
    pub min_ms: u64,
    /// Pause upper bound (exclusive unless equal to `min_ms`), in milliseconds.
    pub max_ms: u64,
}

impl ThinkingDelay {
    /// Creates a delay window; bounds are swapped if given backwards.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// No pause at all.
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Draws a pause from the window.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.random_range(self.min_ms..self.max_ms))
    }
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        Self::new(300, 600)
    }
}

/// Ticket for one scheduled computer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMove {
    ticket: u64,
    delay: Duration,
}

impl PendingMove {
    /// Identifier checked when the move is played.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// How long to wait before playing it.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// What the caller has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Wait for the human.
    HumanToMove,
    /// Wait `delay`, then call `play_computer_move` with this ticket.
    ComputerToMove(PendingMove),
    /// The game is over; the notifier has been called.
    Concluded(Outcome),
}

/// Read-only snapshot for a UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// The 9 cells, row-major.
    pub cells: [Cell; CELL_COUNT],
    /// Side to move next.
    pub to_move: Mark,
    /// Controller phase.
    pub phase: Phase,
    /// Outcome derived from the board.
    pub outcome: Outcome,
    /// Present only after a human win.
    pub reward_code: Option<RewardCode>,
}

/// State machine for a single game.
pub struct GameController<R = StdRng> {
    board: Board,
    history: Vec<Move>,
    to_move: Mark,
    phase: Phase,
    reward_code: Option<RewardCode>,
    notified: bool,
    pending: Option<u64>,
    last_ticket: u64,
    thinking_delay: ThinkingDelay,
    policy: Box<dyn OpponentPolicy>,
    notifier: Arc<dyn OutcomeNotifier>,
    rng: R,
}

impl GameController<StdRng> {
    /// Creates a controller whose randomness is fixed by `seed`.
    pub fn seeded(
        policy: Box<dyn OpponentPolicy>,
        notifier: Arc<dyn OutcomeNotifier>,
        seed: u64,
    ) -> Self {
        Self::new(policy, notifier, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameController<R> {
    /// Creates a controller with a fresh board, human to move.
    #[instrument(skip_all, fields(policy = policy.name()))]
    pub fn new(
        policy: Box<dyn OpponentPolicy>,
        notifier: Arc<dyn OutcomeNotifier>,
        rng: R,
    ) -> Self {
        debug!("Creating game controller");
        Self {
            board: Board::new(),
            history: Vec::new(),
            to_move: Mark::Human,
            phase: Phase::AwaitingHumanMove,
            reward_code: None,
            notified: false,
            pending: None,
            last_ticket: 0,
            thinking_delay: ThinkingDelay::default(),
            policy,
            notifier,
            rng,
        }
    }

    /// Replaces the computer's thinking delay window.
    pub fn with_thinking_delay(mut self, thinking_delay: ThinkingDelay) -> Self {
        self.thinking_delay = thinking_delay;
        self
    }

    /// Plays the human's mark at `index`.
    ///
    /// # Errors
    ///
    /// - [`MoveError::GameOver`] once the game has concluded
    /// - [`MoveError::NotYourTurn`] while a computer move is pending
    /// - [`MoveError::OutOfRange`] / [`MoveError::CellOccupied`] for bad cells
    ///
    /// Rejected moves leave every piece of state untouched.
    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub fn place_by_human(&mut self, index: usize) -> Result<Step, MoveError> {
        match self.phase {
            Phase::Concluded(_) => {
                warn!(index, "Move after game concluded");
                return Err(MoveError::GameOver);
            }
            Phase::AwaitingComputerMove => {
                warn!(index, "Human moved during computer's turn");
                return Err(MoveError::NotYourTurn(Mark::Human));
            }
            Phase::AwaitingHumanMove => {}
        }

        let phase = self.commit(index, Mark::Human).inspect_err(|e| {
            warn!(index, error = %e, "Rejected human move");
        })?;
        Ok(self.enter(phase))
    }

    /// Plays the computer move scheduled by `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::StaleMove`] if the ticket was already used,
    /// superseded, or issued before a reset. If the policy picks a cell that
    /// cannot be played, that error is returned and the ticket stays live.
    /// Nothing changes in either case.
    #[instrument(skip(self), fields(ticket = pending.ticket()))]
    pub fn play_computer_move(&mut self, pending: PendingMove) -> Result<Step, MoveError> {
        if self.phase != Phase::AwaitingComputerMove || self.pending != Some(pending.ticket) {
            warn!(current = ?self.pending, "Discarding stale computer move");
            return Err(MoveError::StaleMove(pending.ticket));
        }

        let phase = match self.policy.select(&self.board, Mark::Computer) {
            Decision::Place(position) => self
                .commit(position.to_index(), Mark::Computer)
                .inspect_err(|e| {
                    error!(%position, error = %e, "Policy chose an illegal cell");
                })?,
            Decision::NoMoveAvailable => {
                let outcome = rules::evaluate(&self.board)?;
                if !outcome.is_terminal() {
                    error!("Policy found no move on an unfinished board");
                    return Err(MoveError::InvariantViolation(
                        "no computer move on an unfinished board".to_string(),
                    ));
                }
                let phase = Phase::Concluded(outcome);
                Self::validate(&self.board, &self.history, self.to_move, &phase)?;
                self.phase = phase;
                phase
            }
        };

        self.pending = None;
        Ok(self.enter(phase))
    }

    /// Starts a new game. Always succeeds.
    ///
    /// Any outstanding [`PendingMove`] becomes stale.
    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub fn reset(&mut self) {
        if let Some(ticket) = self.pending.take() {
            debug!(ticket, "Cancelling pending computer move");
        }
        self.board.reset();
        self.history.clear();
        self.to_move = Mark::Human;
        self.phase = Phase::AwaitingHumanMove;
        self.reward_code = None;
        self.notified = false;
        info!("Game reset");
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the accepted moves, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the side to move next.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// True while the controller accepts a human move.
    pub fn is_human_turn(&self) -> bool {
        self.phase == Phase::AwaitingHumanMove
    }

    /// Returns the phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> Outcome {
        match self.phase {
            Phase::Concluded(outcome) => outcome,
            _ => Outcome::InProgress,
        }
    }

    /// Returns the reward code, present only after a human win.
    pub fn reward_code(&self) -> Option<&RewardCode> {
        self.reward_code.as_ref()
    }

    /// Snapshot for a UI.
    pub fn view(&self) -> GameView {
        GameView {
            cells: *self.board.cells(),
            to_move: self.to_move,
            phase: self.phase,
            outcome: self.outcome(),
            reward_code: self.reward_code.clone(),
        }
    }

    /// Plays `mark` at `index` if the resulting state is valid.
    ///
    /// The move is worked out on copies and only written back once the
    /// invariants hold, so every error leaves the controller untouched.
    fn commit(&mut self, index: usize, mark: Mark) -> Result<Phase, MoveError> {
        let position = Position::from_index(index).ok_or(MoveError::OutOfRange(index))?;
        let mut board = self.board.clone();
        board.place(index, mark)?;
        let outcome = rules::evaluate(&board)?;

        let phase = match (outcome.is_terminal(), mark) {
            (true, _) => Phase::Concluded(outcome),
            (false, Mark::Human) => Phase::AwaitingComputerMove,
            (false, Mark::Computer) => Phase::AwaitingHumanMove,
        };
        let mut history = self.history.clone();
        history.push(Move::new(mark, position));
        let to_move = mark.opponent();
        Self::validate(&board, &history, to_move, &phase)?;

        self.board = board;
        self.history = history;
        self.to_move = to_move;
        self.phase = phase;
        debug!(%mark, %position, "Move applied");
        Ok(phase)
    }

    /// Runs the side effects of entering `phase`.
    fn enter(&mut self, phase: Phase) -> Step {
        match phase {
            Phase::Concluded(outcome) => self.conclude(outcome),
            Phase::AwaitingComputerMove => Step::ComputerToMove(self.schedule()),
            Phase::AwaitingHumanMove => Step::HumanToMove,
        }
    }

    fn schedule(&mut self) -> PendingMove {
        self.last_ticket += 1;
        self.pending = Some(self.last_ticket);
        let pending = PendingMove {
            ticket: self.last_ticket,
            delay: self.thinking_delay.sample(&mut self.rng),
        };
        debug!(
            ticket = pending.ticket,
            delay = ?pending.delay,
            "Computer move scheduled"
        );
        pending
    }

    fn conclude(&mut self, outcome: Outcome) -> Step {
        if outcome == Outcome::HumanWin {
            self.reward_code = Some(RewardCode::generate(&mut self.rng));
        }
        info!(%outcome, reward_code = ?self.reward_code, "Game concluded");

        if let Some(result) = outcome.result()
            && !self.notified
        {
            self.notified = true;
            self.notifier.notify(OutcomeNotice {
                result,
                reward_code: self.reward_code.clone(),
            });
        }
        Step::Concluded(outcome)
    }

    fn validate(
        board: &Board,
        history: &[Move],
        to_move: Mark,
        phase: &Phase,
    ) -> Result<(), MoveError> {
        let record = GameRecord {
            board,
            history,
            to_move,
            phase,
        };
        GameInvariants::check_all(&record).map_err(|violations| {
            let descriptions = violations.join("; ");
            error!(%descriptions, "Game invariants violated");
            MoveError::InvariantViolation(descriptions)
        })
    }
}
