use std::collections::HashMap;

use serde::Serialize;

use super::grid::{Board, Direction, Tile};
use crate::error::BoardError;
use crate::tiles::letter::Letter;

/// One square of a run or word: a letter and whether it is being placed now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunTile {
    pub row: usize,
    pub col: usize,
    pub letter: Letter,
    pub fresh: bool,
}

/// A straight line of contiguous letters in board order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub direction: Direction,
    pub tiles: Vec<RunTile>,
}

impl Run {
    pub fn start(&self) -> (usize, usize) {
        self.tiles.first().map_or((0, 0), |t| (t.row, t.col))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn fresh_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.fresh).count()
    }

    pub fn letters(&self) -> Vec<Letter> {
        self.tiles.iter().map(|t| t.letter).collect()
    }
}

/// Board letters with a set of fresh tiles laid on top.
struct Overlay<'a> {
    board: &'a Board,
    fresh: HashMap<(usize, usize), Letter>,
}

impl<'a> Overlay<'a> {
    fn new(board: &'a Board, tiles: &[Tile]) -> Self {
        let fresh = tiles.iter().map(|t| ((t.row, t.col), t.letter)).collect();
        Self { board, fresh }
    }

    fn at(&self, row: i64, col: i64) -> Option<RunTile> {
        if !self.board.in_bounds(row, col) {
            return None;
        }
        let (r, c) = (row as usize, col as usize);
        if let Some(&letter) = self.fresh.get(&(r, c)) {
            return Some(RunTile { row: r, col: c, letter, fresh: true });
        }
        self.board
            .letter_at(r, c)
            .map(|letter| RunTile { row: r, col: c, letter, fresh: false })
    }

    /// The maximal line through (row, col) along `dir`.
    fn line(&self, row: usize, col: usize, dir: Direction) -> Run {
        let (dr, dc) = dir.step();
        let (mut r, mut c) = (row as i64, col as i64);
        while self.at(r - dr, c - dc).is_some() {
            r -= dr;
            c -= dc;
        }
        let mut tiles = Vec::new();
        while let Some(t) = self.at(r, c) {
            tiles.push(t);
            r += dr;
            c += dc;
        }
        Run { direction: dir, tiles }
    }
}

fn has_board_neighbour(board: &Board, row: usize, col: usize, dir: Direction) -> bool {
    let (dr, dc) = dir.step();
    let (r, c) = (row as i64, col as i64);
    board.letter_at_signed(r - dr, c - dc).is_some() || board.letter_at_signed(r + dr, c + dc).is_some()
}

/// Check that a set of freshly placed tiles lies on one line with no empty
/// gaps (existing board tiles may fill them), and return the full run,
/// extended over adjacent board tiles, in board order.
///
/// A lone tile runs horizontally when it has a horizontal board neighbour,
/// vertically otherwise.
pub fn contiguous_run(tiles: &[Tile], board: &Board) -> Result<Run, BoardError> {
    let first = tiles.first().ok_or(BoardError::Empty)?;
    let mut seen = HashMap::with_capacity(tiles.len());
    for t in tiles {
        if t.row >= board.dim() || t.col >= board.dim() {
            return Err(BoardError::OutOfBounds { row: t.row as i64, col: t.col as i64 });
        }
        if board.is_occupied(t.row, t.col) || seen.insert((t.row, t.col), ()).is_some() {
            return Err(BoardError::Overlap { row: t.row, col: t.col });
        }
    }

    let same_row = tiles.iter().all(|t| t.row == first.row);
    let same_col = tiles.iter().all(|t| t.col == first.col);
    let direction = if tiles.len() == 1 {
        if has_board_neighbour(board, first.row, first.col, Direction::Horizontal) {
            Direction::Horizontal
        } else {
            Direction::Vertical
        }
    } else if same_row {
        Direction::Horizontal
    } else if same_col {
        Direction::Vertical
    } else {
        return Err(BoardError::NonContiguous);
    };

    let overlay = Overlay::new(board, tiles);
    let run = overlay.line(first.row, first.col, direction);
    // Every fresh tile must be reachable from the first without crossing an empty cell.
    if run.fresh_count() != tiles.len() {
        return Err(BoardError::NonContiguous);
    }
    Ok(run)
}

/// [`contiguous_run`] plus connectivity: the play must touch an existing
/// tile, or cover the start square when the board is empty.
pub fn legal_placement(tiles: &[Tile], board: &Board) -> Result<Run, BoardError> {
    let run = contiguous_run(tiles, board)?;
    if board.is_empty() {
        let start = board.layout().start;
        if !tiles.iter().any(|t| (t.row, t.col) == start) {
            return Err(BoardError::MissesStart);
        }
        return Ok(run);
    }
    let touches = run.fresh_count() != run.len()
        || tiles.iter().any(|t| {
            has_board_neighbour(board, t.row, t.col, Direction::Horizontal)
                || has_board_neighbour(board, t.row, t.col, Direction::Vertical)
        });
    if !touches {
        return Err(BoardError::NotConnected);
    }
    Ok(run)
}

/// Every word a placement forms: its main line, plus the perpendicular line
/// through each fresh tile. Only lines of two or more letters count, so a
/// lone tile with no cross word still forms a word along its own axis.
pub fn words_formed(board: &Board, placed: &[Tile]) -> Result<Vec<Run>, BoardError> {
    let main = contiguous_run(placed, board)?;
    let overlay = Overlay::new(board, placed);
    let cross = main.direction.cross();

    let mut words = Vec::new();
    for t in main.tiles.iter().filter(|t| t.fresh) {
        let line = overlay.line(t.row, t.col, cross);
        if line.len() >= 2 {
            words.push(line);
        }
    }
    if main.len() >= 2 {
        words.insert(0, main);
    }
    Ok(words)
}
