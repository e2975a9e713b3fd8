//! Scenario tests for the game controller.

use bonus_tictactoe::{
    Board, Cell, Decision, GameController, GameResult, HeuristicPolicy, Mark, MoveError,
    OpponentPolicy, Outcome, PendingMove, Phase, Position, RecordingNotifier, Step, ThinkingDelay,
};
use std::sync::Arc;

fn new_game(notifier: &RecordingNotifier, seed: u64) -> GameController {
    GameController::seeded(Box::new(HeuristicPolicy::new()), Arc::new(notifier.clone()), seed)
        .with_thinking_delay(ThinkingDelay::none())
}

/// Plays each human index, answering with the computer whenever asked.
fn play(game: &mut GameController, moves: &[usize]) -> Step {
    let mut last = Step::HumanToMove;
    for &index in moves {
        last = game.place_by_human(index).expect("legal human move");
        if let Step::ComputerToMove(pending) = last {
            last = game.play_computer_move(pending).expect("computer move");
        }
    }
    last
}

#[test]
fn test_center_opening_gets_corner_reply() {
    let notifier = RecordingNotifier::new();
    let mut game = new_game(&notifier, 1);
    play(&mut game, &[4]);
    assert_eq!(game.board().get(0), Some(Cell::Computer));
    assert_eq!(game.phase(), Phase::AwaitingHumanMove);
}

#[test]
fn test_policy_blocks_two_in_a_row() {
    use Cell::{Computer as C, Empty as E, Human as H};
    let board = Board::from_cells([H, H, E, C, E, E, E, E, E]);
    let decision = HeuristicPolicy::new().select(&board, Mark::Computer);
    assert_eq!(decision, Decision::Place(Position::TopRight));
}

#[test]
fn test_fork_win_issues_reward_code() {
    let notifier = RecordingNotifier::new();
    let mut game = new_game(&notifier, 99);
    let step = play(&mut game, &[0, 8, 6, 7]);

    assert_eq!(step, Step::Concluded(Outcome::HumanWin));
    let code = game.reward_code().expect("reward code on win").clone();
    assert_eq!(code.as_str().len(), 5);

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].result, GameResult::Win);
    assert_eq!(notices[0].reward_code.as_ref(), Some(&code));
}

#[test]
fn test_draw_notifies_loss_without_code() {
    let notifier = RecordingNotifier::new();
    let mut game = new_game(&notifier, 3);
    let step = play(&mut game, &[4, 2, 3, 1, 8]);

    assert_eq!(step, Step::Concluded(Outcome::Draw));
    assert!(game.board().empty_indices().next().is_none());
    assert_eq!(game.reward_code(), None);
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].result, GameResult::Loss);
    assert_eq!(notices[0].reward_code, None);
}

#[test]
fn test_moves_after_conclusion_rejected() {
    let notifier = RecordingNotifier::new();
    let mut game = new_game(&notifier, 5);
    play(&mut game, &[0, 8, 6, 7]);
    let before = game.board().clone();

    for index in [1, 2, 9] {
        assert_eq!(game.place_by_human(index), Err(MoveError::GameOver));
    }
    assert_eq!(game.board(), &before);
    assert_eq!(notifier.count(), 1);
}

#[test]
fn test_invalid_moves_leave_board_unchanged() {
    let notifier = RecordingNotifier::new();
    let mut game = new_game(&notifier, 5);
    play(&mut game, &[4]);
    let before = game.view();

    let occupied = game.place_by_human(4).unwrap_err();
    assert_eq!(occupied, MoveError::CellOccupied(4));
    assert!(occupied.is_invalid_move());
    assert_eq!(game.place_by_human(42), Err(MoveError::OutOfRange(42)));
    assert_eq!(game.view(), before);
}

#[test]
fn test_reset_restores_initial_state() {
    let notifier = RecordingNotifier::new();
    let mut game = new_game(&notifier, 8);
    play(&mut game, &[0, 8, 6, 7]);
    assert!(game.reward_code().is_some());

    game.reset();
    let view = game.view();
    assert_eq!(view.cells, [Cell::Empty; 9]);
    assert_eq!(view.outcome, Outcome::InProgress);
    assert_eq!(view.reward_code, None);
    assert_eq!(view.to_move, Mark::Human);
    assert!(game.is_human_turn());
    assert!(game.history().is_empty());
}

#[test]
fn test_each_concluded_game_notifies_once_across_resets() {
    let notifier = RecordingNotifier::new();
    let mut game = new_game(&notifier, 21);

    play(&mut game, &[0, 8, 6, 7]);
    game.reset();
    game.reset();
    play(&mut game, &[4, 2, 3, 1, 8]);
    game.reset();

    // Pending move dropped by a reset never concludes anything.
    let stale: PendingMove = match game.place_by_human(4).unwrap() {
        Step::ComputerToMove(pending) => pending,
        other => panic!("unexpected step {other:?}"),
    };
    game.reset();
    game.reset();
    assert!(game.play_computer_move(stale).is_err());

    let results: Vec<_> = notifier.notices().into_iter().map(|n| n.result).collect();
    assert_eq!(results, vec![GameResult::Win, GameResult::Loss]);
}

#[test]
fn test_view_serializes_for_ui() {
    let notifier = RecordingNotifier::new();
    let mut game = new_game(&notifier, 2);
    play(&mut game, &[4]);
    let json = serde_json::to_value(game.view()).unwrap();
    assert_eq!(json["cells"][0], "computer");
    assert_eq!(json["cells"][4], "human");
    assert_eq!(json["cells"][1], "empty");
    assert_eq!(json["phase"], "awaiting_human_move");
    assert_eq!(json["outcome"], "in_progress");
    assert!(json["reward_code"].is_null());
}
