//! Terminal play loop driven from canned input.

use bonus_server::{GameSession, play};
use bonus_tictactoe::{
    GameController, GameResult, HeuristicPolicy, RecordingNotifier, ThinkingDelay,
};
use std::sync::Arc;

fn session(notifier: RecordingNotifier) -> GameSession {
    let controller = GameController::seeded(Box::new(HeuristicPolicy::new()), Arc::new(notifier), 2)
        .with_thinking_delay(ThinkingDelay::none());
    GameSession::new(0, controller)
}

async fn run(session: &GameSession, input: &str) -> String {
    let mut out = Vec::new();
    play::run(session, input.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_center_opening_shows_reply() {
    let output = run(&session(RecordingNotifier::new()), "4\nq\n").await;
    assert!(output.contains("Computer is thinking..."));
    assert!(output.contains("O|1|2\n-+-+-\n3|X|5\n-+-+-\n6|7|8"), "{output}");
    assert!(output.contains("Your move (X)."));
}

#[tokio::test(start_paused = true)]
async fn test_bad_input_prints_help_and_errors() {
    let game = session(RecordingNotifier::new());
    let output = run(&game, "hello\n4\n0\n").await;
    assert!(output.matches("Enter a cell 0-8").count() >= 2);
    assert!(output.contains("occupied"), "{output}");
}

#[tokio::test(start_paused = true)]
async fn test_losing_line_then_restart() {
    let notifier = RecordingNotifier::new();
    let game = session(notifier.clone());
    let output = run(&game, "0\n1\n8\n5\nr\nq\n").await;

    assert!(output.contains("Computer wins."));
    assert!(output.contains("New game."));
    assert_eq!(notifier.count(), 1);
    assert_eq!(notifier.notices()[0].result, GameResult::Loss);
    assert!(game.view().cells.iter().all(|c| *c == bonus_tictactoe::Cell::Empty));
}

#[tokio::test(start_paused = true)]
async fn test_winning_line_shows_code() {
    let notifier = RecordingNotifier::new();
    let game = session(notifier.clone());
    let output = run(&game, "top-left\n8\n6\n7\n").await;

    let code = game.view().reward_code.unwrap();
    assert!(output.contains(&format!("Your promo code: {}", code)), "{output}");
    assert_eq!(notifier.notices()[0].reward_code.as_ref(), Some(&code));
}
