//! Outcome notifiers that leave the process.
//!
//! Both spawn onto the current tokio runtime and return immediately.
//! Delivery failures are logged and otherwise ignored.

use crate::chat::ChatSender;
use crate::phrases;
use bonus_tictactoe::{GameResult, OutcomeNotice, OutcomeNotifier};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, warn};

fn spawn_delivery<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
        }
        Err(_) => warn!("No async runtime, dropping outcome notice"),
    }
}

/// Sends the outcome phrase straight to a chat.
pub struct ChatNotifier {
    sender: Arc<dyn ChatSender>,
    chat_id: i64,
    rng: Mutex<StdRng>,
}

impl ChatNotifier {
    /// Creates a notifier for `chat_id`.
    pub fn new(sender: Arc<dyn ChatSender>, chat_id: i64) -> Self {
        Self::with_rng(sender, chat_id, StdRng::from_os_rng())
    }

    /// Creates a notifier whose phrase choice is drawn from `rng`.
    pub fn with_rng(sender: Arc<dyn ChatSender>, chat_id: i64, rng: StdRng) -> Self {
        Self {
            sender,
            chat_id,
            rng: Mutex::new(rng),
        }
    }
}

impl OutcomeNotifier for ChatNotifier {
    fn notify(&self, notice: OutcomeNotice) {
        let text = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            phrases::compose(
                notice.result,
                notice.reward_code.as_ref().map(|c| c.as_str()),
                &mut *rng,
            )
        };
        let sender = Arc::clone(&self.sender);
        let chat_id = self.chat_id;
        let result = notice.result;

        spawn_delivery(async move {
            match sender.send_message(chat_id, &text).await {
                Ok(_) => info!(chat_id, %result, "Outcome delivered to chat"),
                Err(e) => error!(chat_id, %result, error = %e, "Outcome delivery failed"),
            }
        });
    }
}

/// Body of `POST /send-result`.
///
/// Only `"win"` reads as a win; any other or missing `result` is a loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResultRequest {
    /// Win or loss.
    #[serde(default = "loss", deserialize_with = "win_or_loss")]
    pub result: GameResult,
    /// Reward code, on a win.
    #[serde(default)]
    pub code: Option<String>,
    /// Chat to message.
    #[serde(default)]
    pub chat_id: Option<i64>,
}

fn loss() -> GameResult {
    GameResult::Loss
}

fn win_or_loss<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GameResult, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw.as_ref().and_then(Value::as_str) {
        Some("win") => GameResult::Win,
        _ => GameResult::Loss,
    })
}

/// Reports outcomes to a relay server's `/send-result`.
pub struct RelayNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: i64,
}

impl RelayNotifier {
    /// Creates a notifier posting to `{relay_url}/send-result` for `chat_id`.
    pub fn new(relay_url: &str, chat_id: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/send-result", relay_url.trim_end_matches('/')),
            chat_id,
        }
    }

    /// Full URL outcomes are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl OutcomeNotifier for RelayNotifier {
    fn notify(&self, notice: OutcomeNotice) {
        let body = SendResultRequest {
            result: notice.result,
            code: notice.reward_code.map(|c| c.to_string()),
            chat_id: Some(self.chat_id),
        };
        let request = self.client.post(&self.endpoint).json(&body);
        let endpoint = self.endpoint.clone();

        spawn_delivery(async move {
            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(response) => info!(%endpoint, status = %response.status(), "Outcome relayed"),
                Err(e) => error!(%endpoint, error = %e, "Outcome relay failed"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatError;
    use async_trait::async_trait;
    use bonus_tictactoe::RewardCode;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct ChannelSender(mpsc::UnboundedSender<(i64, String)>);

    #[async_trait]
    impl ChatSender for ChannelSender {
        async fn send_message(&self, chat_id: i64, text: &str) -> Result<Value, ChatError> {
            let _ = self.0.send((chat_id, text.to_string()));
            Ok(json!({ "message_id": 1 }))
        }
    }

    struct FailingSender;

    #[async_trait]
    impl ChatSender for FailingSender {
        async fn send_message(&self, _chat_id: i64, _text: &str) -> Result<Value, ChatError> {
            Err(ChatError::Api {
                description: "chat not found".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_chat_notifier_sends_code_on_win() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = Arc::new(ChannelSender(tx));
        let notifier = ChatNotifier::with_rng(sender, 42, StdRng::seed_from_u64(5));
        let code = RewardCode::generate(&mut StdRng::seed_from_u64(9));
        notifier.notify(OutcomeNotice {
            result: GameResult::Win,
            reward_code: Some(code.clone()),
        });

        let (chat_id, text) = rx.recv().await.unwrap();
        assert_eq!(chat_id, 42);
        assert!(text.contains(code.as_str()));
    }

    #[tokio::test]
    async fn test_chat_notifier_sends_loss_phrase() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = ChatNotifier::new(Arc::new(ChannelSender(tx)), 7);
        notifier.notify(OutcomeNotice {
            result: GameResult::Loss,
            reward_code: None,
        });

        let (_, text) = rx.recv().await.unwrap();
        assert!(phrases::templates(GameResult::Loss).contains(&text.as_str()));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let notifier = ChatNotifier::new(Arc::new(FailingSender), 1);
        notifier.notify(OutcomeNotice {
            result: GameResult::Loss,
            reward_code: None,
        });
        tokio::task::yield_now().await;
    }

    #[test]
    fn test_notify_without_runtime_does_not_panic() {
        let notifier = RelayNotifier::new("http://127.0.0.1:9/", 1);
        assert_eq!(notifier.endpoint(), "http://127.0.0.1:9/send-result");
        notifier.notify(OutcomeNotice {
            result: GameResult::Loss,
            reward_code: None,
        });
    }

    #[test]
    fn test_send_result_body_shape() {
        let body = SendResultRequest {
            result: GameResult::Win,
            code: Some("55555".to_string()),
            chat_id: Some(9),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "result": "win", "code": "55555", "chat_id": 9 })
        );
        let parsed: SendResultRequest = serde_json::from_str(r#"{"result":"loss"}"#).unwrap();
        assert_eq!(parsed.chat_id, None);
    }

    #[test]
    fn test_anything_but_win_reads_as_loss() {
        let parse = |raw: &str| serde_json::from_str::<SendResultRequest>(raw).unwrap().result;
        assert_eq!(parse(r#"{"result":"win"}"#), GameResult::Win);
        assert_eq!(parse(r#"{"result":"draw"}"#), GameResult::Loss);
        assert_eq!(parse(r#"{"result":"WIN"}"#), GameResult::Loss);
        assert_eq!(parse(r#"{"result":1}"#), GameResult::Loss);
        assert_eq!(parse(r#"{"result":null}"#), GameResult::Loss);
        assert_eq!(parse(r#"{"chat_id":5}"#), GameResult::Loss);
    }
}
