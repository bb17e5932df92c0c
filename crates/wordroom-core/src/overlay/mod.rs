//! Local, uncommitted tiles the player is arranging on top of the
//! canonical board, and the outbound actions built from them.

pub mod arrow;
pub mod scoring;

pub use arrow::PlacementArrow;
pub use scoring::tentative_score;

use serde::Serialize;

use crate::board::{legal_placement, Board, Tile};
use crate::error::{BoardError, OverlayError};
use crate::protocol::OutboundAction;
use crate::reducer::GameState;
use crate::tiles::alphabet::Alphabet;
use crate::tiles::letter::Letter;

/// Tentative tiles plus the rack as displayed, with a gap
/// ([`Letter::EMPTY_RACK_SLOT`]) wherever a tile has been lifted.
///
/// Never written into [`GameState`]; the canonical board only changes when
/// the server confirms a move.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Overlay {
    tiles: Vec<Tile>,
    rack: Vec<Letter>,
    arrow: PlacementArrow,
}

impl Overlay {
    pub fn new(rack: &[Letter]) -> Self {
        Self { rack: rack.to_vec(), ..Default::default() }
    }

    /// Drop every tentative tile and take a fresh copy of the rack.
    pub fn reset(&mut self, rack: &[Letter]) {
        self.tiles.clear();
        self.rack = rack.to_vec();
        self.arrow.show = false;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn rack(&self) -> &[Letter] {
        &self.rack
    }

    pub fn arrow(&self) -> PlacementArrow {
        self.arrow
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Put a rack tile on an empty square. A designated blank consumes a
    /// blank from the rack; an undesignated one must be designated before
    /// the move can be committed.
    pub fn place(&mut self, letter: Letter, row: usize, col: usize, state: &GameState) -> Result<(), OverlayError> {
        if !state.alphabet.contains(letter) {
            return Err(OverlayError::UnknownLetter(letter.0));
        }
        self.check_square(row, col, &state.board)?;
        let wanted = letter.tile();
        let slot = self
            .rack
            .iter()
            .position(|&l| l == wanted)
            .ok_or_else(|| OverlayError::NotOnRack(state.alphabet.rune(letter)))?;
        self.rack[slot] = Letter::EMPTY_RACK_SLOT;
        self.tiles.push(Tile::new(row, col, letter));
        Ok(())
    }

    /// Take a tentative tile back to the rack. No-op if the square has none.
    pub fn remove(&mut self, row: usize, col: usize) -> Option<Tile> {
        let idx = self.tiles.iter().position(|t| (t.row, t.col) == (row, col))?;
        let tile = self.tiles.remove(idx);
        self.return_to_rack(tile.letter);
        Some(tile)
    }

    /// Return every tentative tile to the rack.
    pub fn recall(&mut self) {
        for tile in std::mem::take(&mut self.tiles) {
            self.return_to_rack(tile.letter);
        }
    }

    /// Give every undesignated blank on the board the letter `as_letter`.
    pub fn designate_blank(&mut self, as_letter: Letter, alphabet: &Alphabet) -> Result<(), OverlayError> {
        let plain = as_letter.unblanked();
        if plain.is_blank() || !alphabet.contains(plain) {
            return Err(OverlayError::UnknownLetter(as_letter.0));
        }
        for t in self.tiles.iter_mut().filter(|t| t.letter.is_blank()) {
            t.letter = plain.designate();
        }
        Ok(())
    }

    /// Whether the rack still shows gaps with no tentative tile to fill them,
    /// as after a commit the server has not answered.
    pub fn has_orphaned_gaps(&self) -> bool {
        self.tiles.is_empty() && self.rack.contains(&Letter::EMPTY_RACK_SLOT)
    }

    /// Click on a square: moves or cycles the placement arrow.
    pub fn click(&mut self, row: usize, col: usize) {
        self.arrow = self.arrow.click(row, col);
    }

    /// Type a letter at the arrow and move the arrow on. Falls back to a
    /// blank when the plain letter is not on the rack.
    pub fn type_letter(&mut self, letter: Letter, state: &GameState) -> Result<(), OverlayError> {
        let arrow = self.arrow;
        if !arrow.on_board(state.board.dim()) {
            return Err(OverlayError::OutOfBounds { row: arrow.row, col: arrow.col });
        }
        let has_plain = !letter.is_designated_blank() && self.rack.contains(&letter);
        let to_place = if has_plain || !self.rack.contains(&Letter::BLANK) {
            letter
        } else {
            letter.unblanked().designate()
        };
        self.place(to_place, arrow.row, arrow.col, state)?;
        self.arrow = arrow.advance(&state.board, &self.tiles);
        Ok(())
    }

    /// Move the arrow back one square and lift the tile there, if any.
    pub fn backspace(&mut self, state: &GameState) -> Option<Tile> {
        self.arrow = self.arrow.retreat(&state.board);
        self.remove(self.arrow.row, self.arrow.col)
    }

    /// Score of the tentative move, or `None` if it is not a legal placement.
    pub fn score(&self, state: &GameState, bingo_bonus: i32, rack_size: usize) -> Option<i32> {
        if self.tiles.is_empty() {
            return None;
        }
        tentative_score(&state.board, &self.tiles, state.alphabet, bingo_bonus, rack_size)
    }

    /// Build the placement request and clear the overlay optimistically.
    /// The rack keeps its gaps until the server's new rack arrives.
    pub fn commit(&mut self, state: &GameState) -> Result<OutboundAction, OverlayError> {
        if self.tiles.iter().any(|t| t.letter.is_blank()) {
            return Err(OverlayError::UndesignatedBlank);
        }
        let run = legal_placement(&self.tiles, &state.board)?;
        let (row, col) = run.start();
        let tiles = run
            .tiles
            .iter()
            .map(|t| if t.fresh { t.letter } else { Letter::PLAYED_THROUGH })
            .collect();
        self.tiles.clear();
        Ok(OutboundAction::PlaceTiles {
            game_id: state.game_id.clone(),
            row,
            col,
            direction: run.direction,
            tiles,
        })
    }

    fn check_square(&self, row: usize, col: usize, board: &Board) -> Result<(), OverlayError> {
        if row >= board.dim() || col >= board.dim() {
            return Err(OverlayError::OutOfBounds { row, col });
        }
        if board.is_occupied(row, col) || self.tiles.iter().any(|t| (t.row, t.col) == (row, col)) {
            return Err(OverlayError::CellOccupied { row, col });
        }
        Ok(())
    }

    fn return_to_rack(&mut self, letter: Letter) {
        let tile = letter.tile();
        match self.rack.iter().position(|&l| l == Letter::EMPTY_RACK_SLOT) {
            Some(gap) => self.rack[gap] = tile,
            None => self.rack.push(tile),
        }
    }
}

/// Exchange request for `letters`, which must all be on `rack`.
pub fn exchange(state: &GameState, rack: &[Letter], letters: &[Letter]) -> Result<OutboundAction, OverlayError> {
    if letters.is_empty() {
        return Err(OverlayError::NotLegal(BoardError::Empty));
    }
    let mut left = rack.to_vec();
    for &l in letters {
        let idx = left
            .iter()
            .position(|&r| r == l)
            .ok_or_else(|| OverlayError::NotOnRack(state.alphabet.rune(l)))?;
        left.swap_remove(idx);
    }
    Ok(OutboundAction::Exchange { game_id: state.game_id.clone(), tiles: letters.to_vec() })
}

pub fn pass(state: &GameState) -> OutboundAction {
    OutboundAction::Pass { game_id: state.game_id.clone() }
}

pub fn challenge(state: &GameState) -> OutboundAction {
    OutboundAction::Challenge { game_id: state.game_id.clone() }
}
