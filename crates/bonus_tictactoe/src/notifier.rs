//! The one-shot outcome notification contract.

use super::outcome::GameResult;
use super::reward::RewardCode;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Payload delivered when a game concludes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeNotice {
    /// Win or loss from the human's point of view.
    pub result: GameResult,
    /// Present only on a win.
    pub reward_code: Option<RewardCode>,
}

/// Receives the final outcome of a game.
///
/// The controller calls `notify` exactly once per concluded game.
/// Implementations deliver however they like but must not block;
/// delivery is fire-and-forget.
pub trait OutcomeNotifier: Send + Sync {
    /// Delivers the outcome.
    fn notify(&self, notice: OutcomeNotice);
}

impl<N: OutcomeNotifier + ?Sized> OutcomeNotifier for Arc<N> {
    fn notify(&self, notice: OutcomeNotice) {
        (**self).notify(notice)
    }
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl OutcomeNotifier for LogNotifier {
    fn notify(&self, notice: OutcomeNotice) {
        info!(
            result = %notice.result,
            reward_code = ?notice.reward_code,
            "Game concluded"
        );
    }
}

/// Notifier that keeps every notice it receives.
///
/// Clones share storage, so a test can hand one clone to a controller and
/// inspect another.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<OutcomeNotice>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the notices received so far.
    pub fn notices(&self) -> Vec<OutcomeNotice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    /// Number of notices received so far.
    pub fn count(&self) -> usize {
        self.notices.lock().map(|n| n.len()).unwrap_or_default()
    }
}

impl OutcomeNotifier for RecordingNotifier {
    fn notify(&self, notice: OutcomeNotice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
