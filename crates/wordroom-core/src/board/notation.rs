use super::grid::{Board, Direction};
use crate::tiles::alphabet::Alphabet;

/// A play position in standard notation: `8H` is row 8 across from column H,
/// `H8` is column H down from row 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
}

/// Parse `8H` / `H8` style coordinates (1-based rows, lettered columns A–U).
pub fn parse_coordinates(s: &str) -> Option<Coordinates> {
    let s = s.trim();
    let first = s.chars().next()?;
    let (digits, col_char, direction) = if first.is_ascii_digit() {
        let split = s.find(|c: char| !c.is_ascii_digit())?;
        let (d, rest) = s.split_at(split);
        let mut rest = rest.chars();
        let c = rest.next()?;
        if rest.next().is_some() {
            return None;
        }
        (d, c, Direction::Horizontal)
    } else {
        (&s[first.len_utf8()..], first, Direction::Vertical)
    };
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let row: usize = digits.parse().ok()?;
    let col_char = col_char.to_ascii_uppercase();
    if row == 0 || !('A'..='U').contains(&col_char) {
        return None;
    }
    Some(Coordinates {
        row: row - 1,
        col: (col_char as u8 - b'A') as usize,
        direction,
    })
}

/// Inverse of [`parse_coordinates`].
pub fn format_coordinates(row: usize, col: usize, direction: Direction) -> String {
    let col_char = (b'A' + col as u8) as char;
    match direction {
        Direction::Horizontal => format!("{}{}", row + 1, col_char),
        Direction::Vertical => format!("{}{}", col_char, row + 1),
    }
}

/// Compact board string: rows separated by `/`, runs of empty cells as counts.
pub fn to_fen(board: &Board, alphabet: &Alphabet) -> String {
    let dim = board.dim();
    let mut rows = Vec::with_capacity(dim);
    for r in 0..dim {
        let mut row = String::new();
        let mut empties = 0;
        for c in 0..dim {
            match board.letter_at(r, c) {
                Some(letter) => {
                    if empties > 0 {
                        row.push_str(&empties.to_string());
                        empties = 0;
                    }
                    row.push(alphabet.rune(letter));
                }
                None => empties += 1,
            }
        }
        if empties > 0 {
            row.push_str(&empties.to_string());
        }
        rows.push(row);
    }
    rows.join("/")
}
