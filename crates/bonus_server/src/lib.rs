//! Bonus Games server.
//!
//! Async shell around [`bonus_tictactoe`]: hosted game sessions with a
//! delayed computer reply, outcome delivery to a chat platform, and the
//! HTTP relay the mini-app reports results to.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chat;
pub mod cli;
pub mod config;
pub mod notifier;
pub mod phrases;
pub mod play;
pub mod server;
pub mod session;

pub use chat::{ChatError, ChatSender, StartCommandListener, TelegramClient};
pub use config::{ConfigError, ServerConfig};
pub use notifier::{ChatNotifier, RelayNotifier, SendResultRequest};
pub use server::{AppState, MoveRequest, controller_factory, router};
pub use session::{ChatId, ControllerFactory, GameSession, SessionError, SessionManager};
