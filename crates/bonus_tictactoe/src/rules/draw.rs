//! Draw detection.

use super::super::types::{Board, Cell};

/// Checks if every cell is occupied.
///
/// A full board with no winner is a draw.
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|c| *c != Cell::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mark;

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.place(4, Mark::Human).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_full_board() {
        use Cell::{Computer as C, Human as H};
        let board = Board::from_cells([H, C, H, H, C, C, C, H, H]);
        assert!(is_full(&board));
    }
}
