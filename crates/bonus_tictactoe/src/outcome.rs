//! Game outcomes and the win/loss signal sent to the player.

use serde::{Deserialize, Serialize};

/// Outcome derived from the board after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// No line completed and empty cells remain.
    #[default]
    InProgress,
    /// The human completed a line.
    HumanWin,
    /// The computer completed a line.
    ComputerWin,
    /// Board full, no line.
    Draw,
}

impl Outcome {
    /// True once no further moves are accepted.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// The signal reported to the player, if the game is over.
    ///
    /// A draw reports [`GameResult::Loss`], same as a computer win.
    pub fn result(self) -> Option<GameResult> {
        match self {
            Outcome::InProgress => None,
            Outcome::HumanWin => Some(GameResult::Win),
            Outcome::ComputerWin | Outcome::Draw => Some(GameResult::Loss),
        }
    }
}

/// What the player is told when a game ends.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameResult {
    /// The human won.
    Win,
    /// The human did not win.
    Loss,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_reports_loss() {
        assert_eq!(Outcome::Draw.result(), Some(GameResult::Loss));
        assert_eq!(Outcome::ComputerWin.result(), Some(GameResult::Loss));
        assert_eq!(Outcome::HumanWin.result(), Some(GameResult::Win));
        assert_eq!(Outcome::InProgress.result(), None);
    }

    #[test]
    fn test_result_wire_names() {
        assert_eq!(serde_json::to_string(&GameResult::Win).unwrap(), "\"win\"");
        assert_eq!("loss".parse::<GameResult>().unwrap(), GameResult::Loss);
        assert_eq!(GameResult::Loss.to_string(), "loss");
    }
}
