//! Invariants that hold for every state the controller can reach.
//!
//! The controller checks them after every accepted move; each one is also
//! usable on its own.

use super::action::Move;
use super::controller::Phase;
use super::rules;
use super::types::{Board, Mark};

/// The parts of a game an invariant looks at.
#[derive(Debug, Clone, Copy)]
pub struct GameRecord<'a> {
    /// Current board.
    pub board: &'a Board,
    /// Accepted moves, oldest first.
    pub history: &'a [Move],
    /// Side to move next.
    pub to_move: Mark,
    /// Controller phase.
    pub phase: &'a Phase,
}

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// A set of invariants checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants, returning the descriptions of those that fail.
    fn check_all(state: &S) -> Result<(), Vec<&'static str>>;
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<&'static str>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
            (I4::holds(state), I4::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| description)
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Human count minus computer count is 0 or 1.
pub struct BalancedMarks;

impl<'a> Invariant<GameRecord<'a>> for BalancedMarks {
    fn holds(state: &GameRecord<'a>) -> bool {
        let humans = state.board.count(Mark::Human);
        let computers = state.board.count(Mark::Computer);
        humans == computers || humans == computers + 1
    }

    fn description() -> &'static str {
        "Human marks exceed computer marks by at most one"
    }
}

/// At most one mark holds a line.
pub struct SingleWinner;

impl<'a> Invariant<GameRecord<'a>> for SingleWinner {
    fn holds(state: &GameRecord<'a>) -> bool {
        rules::winner(state.board).is_ok()
    }

    fn description() -> &'static str {
        "At most one mark holds a winning line"
    }
}

/// History replays to the board.
pub struct HistoryConsistent;

impl<'a> Invariant<GameRecord<'a>> for HistoryConsistent {
    fn holds(state: &GameRecord<'a>) -> bool {
        let filled = state.board.cells().len() - state.board.empty_indices().count();
        filled == state.history.len()
            && state.history.iter().all(|mv| {
                state.board.get(mv.position.to_index()) == Some(mv.mark.cell())
            })
    }

    fn description() -> &'static str {
        "Move history matches the board"
    }
}

/// Human moves first, sides alternate, and the turn indicator follows.
pub struct AlternatingTurns;

impl<'a> Invariant<GameRecord<'a>> for AlternatingTurns {
    fn holds(state: &GameRecord<'a>) -> bool {
        let alternates = state
            .history
            .iter()
            .enumerate()
            .all(|(i, mv)| mv.mark == if i % 2 == 0 { Mark::Human } else { Mark::Computer });
        let expected_next = if state.history.len() % 2 == 0 {
            Mark::Human
        } else {
            Mark::Computer
        };
        let phase_agrees = match state.phase {
            Phase::AwaitingHumanMove => state.to_move == Mark::Human,
            Phase::AwaitingComputerMove => state.to_move == Mark::Computer,
            Phase::Concluded(_) => true,
        };
        alternates && state.to_move == expected_next && phase_agrees
    }

    fn description() -> &'static str {
        "Sides alternate starting with the human"
    }
}

/// Every invariant of a game as one set.
pub type GameInvariants = (
    BalancedMarks,
    SingleWinner,
    HistoryConsistent,
    AlternatingTurns,
);
