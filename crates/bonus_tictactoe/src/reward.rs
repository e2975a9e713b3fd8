//! Reward codes issued on a human win.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 5-digit numeric code, 10000-99999.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct RewardCode(String);

impl RewardCode {
    /// Smallest code issued.
    pub const MIN: u32 = 10_000;
    /// Largest code issued.
    pub const MAX: u32 = 99_999;

    /// Draws a fresh code from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(Self::MIN..=Self::MAX).to_string())
    }

    /// The code as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
