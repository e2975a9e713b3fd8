//! Messages sent to the player when a game ends.

use bonus_tictactoe::GameResult;
use rand::Rng;
use rand::seq::IndexedRandom;

const CODE_SLOT: &str = "{code}";

const WIN_PHRASES: [&str; 4] = [
    "Yay, you won! 🎉 Here's your promo code: {code} Enjoy! 💖",
    "You did it! Use code {code} at checkout and treat yourself. ✨",
    "Winner! 🎉 Your code: {code}. Hope you love it! 🌸",
    "Congrats, you won! Here's {code}. Thank you for playing. 💐",
];

const LOSS_PHRASES: [&str; 4] = [
    "Not this time, you were so close. Fancy another go? 💪",
    "Almost there! Try once more, you've got this. ✨",
    "So close! Take another shot, I believe in you. 💖",
    "Not quite, but great play. Ready for a rematch? 🎯",
];

/// Picks a phrase for `result`; win phrases carry `code` (empty when absent).
pub fn compose<R: Rng + ?Sized>(result: GameResult, code: Option<&str>, rng: &mut R) -> String {
    let pool: &[&str] = match result {
        GameResult::Win => &WIN_PHRASES,
        GameResult::Loss => &LOSS_PHRASES,
    };
    let template = pool.choose(rng).copied().unwrap_or_default();
    template.replace(CODE_SLOT, code.unwrap_or_default())
}

/// Every phrase that can be sent for `result`, before the code is filled in.
pub fn templates(result: GameResult) -> &'static [&'static str] {
    match result {
        GameResult::Win => &WIN_PHRASES,
        GameResult::Loss => &LOSS_PHRASES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_win_phrase_carries_code() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let text = compose(GameResult::Win, Some("48213"), &mut rng);
            assert!(text.contains("48213"), "{text}");
            assert!(!text.contains(CODE_SLOT));
        }
    }

    #[test]
    fn test_win_without_code_leaves_blank() {
        let mut rng = StdRng::seed_from_u64(2);
        let text = compose(GameResult::Win, None, &mut rng);
        assert!(!text.contains(CODE_SLOT));
        assert!(
            templates(GameResult::Win)
                .iter()
                .any(|t| t.replace(CODE_SLOT, "") == text)
        );
    }

    #[test]
    fn test_loss_phrase_from_loss_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        let text = compose(GameResult::Loss, Some("11111"), &mut rng);
        assert!(templates(GameResult::Loss).contains(&text.as_str()));
    }
}
