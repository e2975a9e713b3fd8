//! Hosted game sessions.
//!
//! A [`GameSession`] owns one [`GameController`] and drives its delayed
//! computer move on the tokio runtime. [`SessionManager`] keeps one
//! independent session per chat.

use bonus_tictactoe::{GameController, GameView, MoveError, PendingMove, Step};
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Chat id a session belongs to.
pub type ChatId = i64;

/// Session lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// No game has been started for this chat.
    #[display("No game for chat {}", _0)]
    NotFound(#[error(not(source))] ChatId),
}

struct SessionInner {
    chat_id: ChatId,
    controller: Mutex<GameController>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SessionInner {
    fn controller(&self) -> MutexGuard<'_, GameController> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(handle) = self.pending().take() {
            handle.abort();
        }
    }
}

/// One game plus its scheduled computer move.
///
/// Clones share the same game.
#[derive(Clone)]
pub struct GameSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("chat_id", &self.inner.chat_id)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Wraps `controller` for `chat_id`.
    #[instrument(skip(controller))]
    pub fn new(chat_id: ChatId, controller: GameController) -> Self {
        info!("Creating game session");
        Self {
            inner: Arc::new(SessionInner {
                chat_id,
                controller: Mutex::new(controller),
                pending: Mutex::new(None),
            }),
        }
    }

    /// Chat this session belongs to.
    pub fn chat_id(&self) -> ChatId {
        self.inner.chat_id
    }

    /// Current snapshot.
    pub fn view(&self) -> GameView {
        self.inner.controller().view()
    }

    /// Plays the human move at `index` and schedules the reply.
    ///
    /// Returns the view right after the human mark is placed; the computer
    /// move lands later.
    #[instrument(skip(self), fields(chat_id = self.inner.chat_id))]
    pub fn human_move(&self, index: usize) -> Result<GameView, MoveError> {
        let (step, view) = {
            let mut controller = self.inner.controller();
            let step = controller.place_by_human(index)?;
            (step, controller.view())
        };

        match step {
            Step::ComputerToMove(pending) => self.schedule(pending),
            Step::Concluded(outcome) => info!(%outcome, "Game concluded on human move"),
            Step::HumanToMove => {}
        }
        Ok(view)
    }

    /// Cancels any scheduled move and starts over.
    #[instrument(skip(self), fields(chat_id = self.inner.chat_id))]
    pub fn reset(&self) -> GameView {
        if let Some(handle) = self.inner.pending().take() {
            debug!("Aborting scheduled computer move");
            handle.abort();
        }
        let mut controller = self.inner.controller();
        controller.reset();
        controller.view()
    }

    /// Waits for the scheduled computer move, if any, and returns the view.
    pub async fn settle(&self) -> GameView {
        let handle = self.inner.pending().take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            error!(error = %e, "Computer move task failed");
        }
        self.view()
    }

    fn schedule(&self, pending: PendingMove) {
        let session: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(pending.delay()).await;
            let Some(inner) = session.upgrade() else {
                return;
            };
            let result = inner.controller().play_computer_move(pending);
            match result {
                Ok(step) => debug!(chat_id = inner.chat_id, ?step, "Computer moved"),
                Err(MoveError::StaleMove(ticket)) => {
                    debug!(chat_id = inner.chat_id, ticket, "Computer move no longer wanted")
                }
                Err(e) => error!(chat_id = inner.chat_id, error = %e, "Computer move failed"),
            }
        });

        debug!(ticket = pending.ticket(), delay = ?pending.delay(), "Scheduled computer move");
        if let Some(previous) = self.inner.pending().replace(handle) {
            warn!("Replacing an unfinished computer move");
            previous.abort();
        }
    }
}

/// Builds the controller for a new chat.
pub type ControllerFactory = Arc<dyn Fn(ChatId) -> GameController + Send + Sync>;

/// All hosted sessions, keyed by chat.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<ChatId, GameSession>>>,
    factory: ControllerFactory,
}

impl SessionManager {
    /// Creates an empty manager using `factory` for new games.
    #[instrument(skip(factory))]
    pub fn new(factory: ControllerFactory) -> Self {
        info!("Creating session manager");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            factory,
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<ChatId, GameSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session for `chat_id`, starting one if needed.
    #[instrument(skip(self))]
    pub fn get_or_create(&self, chat_id: ChatId) -> GameSession {
        self.sessions()
            .entry(chat_id)
            .or_insert_with(|| GameSession::new(chat_id, (self.factory)(chat_id)))
            .clone()
    }

    /// Returns the session for `chat_id`.
    #[instrument(skip(self))]
    pub fn get(&self, chat_id: ChatId) -> Result<GameSession, SessionError> {
        self.sessions().get(&chat_id).cloned().ok_or_else(|| {
            debug!("Session not found");
            SessionError::NotFound(chat_id)
        })
    }

    /// Drops the session for `chat_id`, cancelling its scheduled move.
    #[instrument(skip(self))]
    pub fn remove(&self, chat_id: ChatId) -> Result<(), SessionError> {
        self.sessions()
            .remove(&chat_id)
            .map(|_| info!("Session removed"))
            .ok_or(SessionError::NotFound(chat_id))
    }

    /// Chats with an active session.
    pub fn chat_ids(&self) -> Vec<ChatId> {
        let mut ids: Vec<_> = self.sessions().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("chat_ids", &self.chat_ids())
            .finish_non_exhaustive()
    }
}
