use serde::Serialize;

use crate::board::{Board, Direction, Tile};

/// Keyboard entry cursor drawn on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlacementArrow {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub show: bool,
}

impl PlacementArrow {
    /// Next state after a click on (row, col). A new square starts a
    /// horizontal arrow; repeated clicks cycle horizontal, vertical, hidden.
    pub fn click(self, row: usize, col: usize) -> Self {
        if (row, col) != (self.row, self.col) {
            return Self { row, col, direction: Direction::Horizontal, show: true };
        }
        let (direction, show) = match (self.show, self.direction) {
            (true, Direction::Horizontal) => (Direction::Vertical, true),
            (true, Direction::Vertical) => (Direction::Vertical, false),
            (false, _) => (Direction::Horizontal, true),
        };
        Self { row, col, direction, show }
    }

    /// Whether typing at the arrow would land on the board.
    pub fn on_board(&self, dim: usize) -> bool {
        self.show && self.row < dim && self.col < dim
    }

    /// Step past the square just typed on, skipping occupied squares.
    /// The arrow may end one square past the edge, where typing is refused.
    pub fn advance(self, board: &Board, pending: &[Tile]) -> Self {
        let (dr, dc) = self.direction.step();
        let dim = board.dim() as i64;
        let (mut r, mut c) = (self.row as i64, self.col as i64);
        loop {
            r += dr;
            c += dc;
            let inside = r < dim && c < dim;
            let taken = board.letter_at_signed(r, c).is_some()
                || pending.iter().any(|t| (t.row as i64, t.col as i64) == (r, c));
            if !(inside && taken) {
                break;
            }
        }
        Self { row: r as usize, col: c as usize, show: true, ..self }
    }

    /// Step back for a backspace, over board tiles but not pending ones.
    /// Stays put at the top or left edge.
    pub fn retreat(self, board: &Board) -> Self {
        let (dr, dc) = self.direction.step();
        let (mut r, mut c) = (self.row as i64, self.col as i64);
        loop {
            r -= dr;
            c -= dc;
            if r < 0 || c < 0 {
                return Self { show: true, ..self };
            }
            if board.letter_at_signed(r, c).is_none() {
                break;
            }
        }
        Self { row: r as usize, col: c as usize, show: true, ..self }
    }
}
