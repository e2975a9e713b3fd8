//! RelayNotifier against a live router on a loopback port.

use async_trait::async_trait;
use bonus_server::{AppState, ChatError, ChatSender, RelayNotifier, SessionManager, router};
use bonus_tictactoe::{
    GameController, GameResult, HeuristicPolicy, LogNotifier, OutcomeNotice, OutcomeNotifier,
    RewardCode,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct FakeChat(mpsc::UnboundedSender<(i64, String)>);

#[async_trait]
impl ChatSender for FakeChat {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Value, ChatError> {
        let _ = self.0.send((chat_id, text.to_string()));
        Ok(json!({ "message_id": 1 }))
    }
}

async fn spawn_relay() -> (String, mpsc::UnboundedReceiver<(i64, String)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let chat: Arc<dyn ChatSender> = Arc::new(FakeChat(tx));
    let sessions = SessionManager::new(Arc::new(|_chat_id: i64| {
        GameController::seeded(Box::new(HeuristicPolicy::new()), Arc::new(LogNotifier), 0)
    }));
    let app = router(AppState::new(chat, sessions), None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", address), rx)
}

#[tokio::test]
async fn test_relay_notifier_reaches_chat() {
    let (url, mut rx) = spawn_relay().await;
    let code = RewardCode::generate(&mut StdRng::seed_from_u64(21));

    RelayNotifier::new(&url, 314).notify(OutcomeNotice {
        result: GameResult::Win,
        reward_code: Some(code.clone()),
    });

    let (chat_id, text) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(chat_id, 314);
    assert!(text.contains(code.as_str()), "{text}");
}

#[tokio::test]
async fn test_unreachable_relay_is_ignored() {
    let notifier = RelayNotifier::new("http://127.0.0.1:1", 1);
    notifier.notify(OutcomeNotice {
        result: GameResult::Loss,
        reward_code: None,
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
}
