use serde::{Deserialize, Serialize};

use super::layout::{BoardLayout, BonusSquare};
use crate::error::BoardError;
use crate::tiles::letter::Letter;

/// Orientation of a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn cross(self) -> Direction {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }

    /// Row and column step for one cell along this direction.
    pub fn step(self) -> (i64, i64) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
        }
    }
}

/// A letter at a board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
    pub letter: Letter,
}

impl Tile {
    pub fn new(row: usize, col: usize, letter: Letter) -> Self {
        Self { row, col, letter }
    }
}

/// Row-major square grid of optional letters, annotated with its premium layout.
///
/// A cell is either empty or holds exactly one letter; designated blanks
/// keep their blank bit so scoring can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    layout: BoardLayout,
    cells: Vec<Option<Letter>>,
    tile_count: usize,
}

impl Board {
    pub fn empty(layout: BoardLayout) -> Self {
        let dim = layout.dim;
        Self {
            layout,
            cells: vec![None; dim * dim],
            tile_count: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.layout.dim
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn is_empty(&self) -> bool {
        self.tile_count == 0
    }

    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        let dim = self.dim() as i64;
        row >= 0 && col >= 0 && row < dim && col < dim
    }

    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.dim() + col
    }

    /// The letter at a cell; `None` for empty or off-board cells.
    pub fn letter_at(&self, row: usize, col: usize) -> Option<Letter> {
        if row < self.dim() && col < self.dim() {
            self.cells[self.idx(row, col)]
        } else {
            None
        }
    }

    /// Signed variant of [`Board::letter_at`] for neighbour scans.
    pub fn letter_at_signed(&self, row: i64, col: i64) -> Option<Letter> {
        if self.in_bounds(row, col) {
            self.letter_at(row as usize, col as usize)
        } else {
            None
        }
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.letter_at(row, col).is_some()
    }

    pub fn bonus(&self, row: usize, col: usize) -> BonusSquare {
        self.layout.bonus(row, col)
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), BoardError> {
        if row < self.dim() && col < self.dim() {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds { row: row as i64, col: col as i64 })
        }
    }

    /// Write tiles into a copy of this board. Fails without touching
    /// anything if any target cell is off-board or occupied.
    pub fn place_tiles(&self, tiles: &[Tile]) -> Result<Board, BoardError> {
        let mut next = self.clone();
        for t in tiles {
            next.check_bounds(t.row, t.col)?;
            let i = next.idx(t.row, t.col);
            if next.cells[i].is_some() {
                return Err(BoardError::Overlap { row: t.row, col: t.col });
            }
            next.cells[i] = Some(t.letter);
            next.tile_count += 1;
        }
        Ok(next)
    }

    /// Clear cells in a copy of this board. Empty cells are skipped.
    pub fn remove_tiles(&self, cells: &[(usize, usize)]) -> Result<Board, BoardError> {
        let mut next = self.clone();
        for &(row, col) in cells {
            next.check_bounds(row, col)?;
            let i = next.idx(row, col);
            if next.cells[i].take().is_some() {
                next.tile_count -= 1;
            }
        }
        Ok(next)
    }

    /// Iterate occupied cells in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        let dim = self.dim();
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|letter| Tile::new(i / dim, i % dim, letter))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::empty(BoardLayout::standard())
    }

    #[test]
    fn place_tiles_returns_new_board() {
        let b = board();
        let next = b
            .place_tiles(&[Tile::new(7, 7, Letter(3)), Tile::new(7, 8, Letter(1))])
            .unwrap();
        assert!(b.is_empty());
        assert_eq!(next.tile_count(), 2);
        assert_eq!(next.letter_at(7, 8), Some(Letter(1)));
    }

    #[test]
    fn place_tiles_rejects_overlap() {
        let b = board().place_tiles(&[Tile::new(7, 7, Letter(3))]).unwrap();
        let err = b.place_tiles(&[Tile::new(7, 7, Letter(4))]).unwrap_err();
        assert_eq!(err, BoardError::Overlap { row: 7, col: 7 });
    }

    #[test]
    fn place_tiles_rejects_off_board() {
        let err = board().place_tiles(&[Tile::new(15, 0, Letter(1))]).unwrap_err();
        assert!(matches!(err, BoardError::OutOfBounds { .. }));
    }

    #[test]
    fn remove_tiles_restores_empty() {
        let b = board().place_tiles(&[Tile::new(0, 0, Letter(1))]).unwrap();
        let cleared = b.remove_tiles(&[(0, 0), (0, 1)]).unwrap();
        assert!(cleared.is_empty());
        assert_eq!(cleared, board());
    }
}
