//! Chat platform client.
//!
//! [`ChatSender`] is the seam the rest of the server talks to; tests swap in
//! a fake. [`TelegramClient`] is the real implementation over the Bot API.

use async_trait::async_trait;
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Failure talking to the chat platform.
#[derive(Debug, Display, Error, From)]
pub enum ChatError {
    /// Transport or decoding failure.
    #[display("Chat request failed: {}", _0)]
    Http(reqwest::Error),

    /// The platform answered with `ok: false`.
    #[display("Chat platform rejected request: {}", description)]
    #[from(ignore)]
    Api {
        /// Platform-supplied description.
        description: String,
    },
}

/// Sends text messages to a chat.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Sends `text` to `chat_id`, returning the platform's result payload.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Value, ChatError>;
}

/// Bot API envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One entry from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id.
    pub update_id: i64,
    /// Incoming message, if this update carries one.
    pub message: Option<IncomingMessage>,
}

/// Message part of an [`Update`].
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// Chat the message came from.
    pub chat: ChatRef,
    /// Message text.
    pub text: Option<String>,
}

/// Chat reference inside a message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRef {
    /// Chat id.
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
}

/// Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Creates a client for the bot identified by `token`.
    pub fn new(api_base: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        }
    }

    #[instrument(skip(self, body))]
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, ChatError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let response: ApiResponse<T> = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => {
                let description = response
                    .description
                    .unwrap_or_else(|| "no description".to_string());
                warn!(method, %description, "Bot API call failed");
                Err(ChatError::Api { description })
            }
        }
    }

    /// Fetches updates after `offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, ChatError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: timeout_secs,
            },
        )
        .await
    }
}

#[async_trait]
impl ChatSender for TelegramClient {
    #[instrument(skip(self, text))]
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Value, ChatError> {
        let result: Value = self.call("sendMessage", &SendMessage { chat_id, text }).await?;
        debug!("Message sent");
        Ok(result)
    }
}

/// Replies to `/start` with a fixed greeting.
pub struct StartCommandListener {
    client: Arc<TelegramClient>,
    greeting: String,
    poll_timeout_secs: u64,
    retry_delay: Duration,
}

impl StartCommandListener {
    /// Creates a listener answering with `greeting`.
    pub fn new(client: Arc<TelegramClient>, greeting: String) -> Self {
        Self {
            client,
            greeting,
            poll_timeout_secs: 30,
            retry_delay: Duration::from_secs(2),
        }
    }

    /// True if `text` is the `/start` command, with or without bot suffix or payload.
    pub fn is_start_command(text: &str) -> bool {
        text.split_whitespace()
            .next()
            .and_then(|command| command.split('@').next())
            == Some("/start")
    }

    /// Polls forever.
    #[instrument(skip(self))]
    pub async fn run(self) {
        info!("Listening for /start commands");
        let mut offset = 0;
        loop {
            let updates = match self.client.get_updates(offset, self.poll_timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "Polling for updates failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(message) = update.message else {
                    continue;
                };
                if message.text.as_deref().is_some_and(Self::is_start_command) {
                    debug!(chat_id = message.chat.id, "Answering /start");
                    let chat_id = message.chat.id;
                    if let Err(e) = self.client.send_message(chat_id, &self.greeting).await {
                        error!(chat_id, error = %e, "Failed to send greeting");
                    }
                }
            }
        }
    }
}
