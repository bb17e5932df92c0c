use serde::Serialize;

/// Premium square kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusSquare {
    #[default]
    None,
    DoubleLetter,
    TripleLetter,
    QuadrupleLetter,
    DoubleWord,
    TripleWord,
    QuadrupleWord,
}

impl BonusSquare {
    /// Parse one cell of the textual layout encoding.
    pub fn from_char(c: char) -> BonusSquare {
        match c {
            '\'' => BonusSquare::DoubleLetter,
            '"' => BonusSquare::TripleLetter,
            '^' => BonusSquare::QuadrupleLetter,
            '-' => BonusSquare::DoubleWord,
            '=' => BonusSquare::TripleWord,
            '~' => BonusSquare::QuadrupleWord,
            _ => BonusSquare::None,
        }
    }

    pub fn letter_multiplier(self) -> i32 {
        match self {
            BonusSquare::DoubleLetter => 2,
            BonusSquare::TripleLetter => 3,
            BonusSquare::QuadrupleLetter => 4,
            _ => 1,
        }
    }

    pub fn word_multiplier(self) -> i32 {
        match self {
            BonusSquare::DoubleWord => 2,
            BonusSquare::TripleWord => 3,
            BonusSquare::QuadrupleWord => 4,
            _ => 1,
        }
    }
}

/// Standard 15×15 crossword-game premium layout.
/// `=` triple word, `-` double word, `"` triple letter, `'` double letter.
pub const CROSSWORD_GAME: [&str; 15] = [
    "=  '   =   '  =",
    " -   \"   \"   - ",
    "  -   ' '   -  ",
    "'  -   '   -  '",
    "    -     -    ",
    " \"   \"   \"   \" ",
    "  '   ' '   '  ",
    "=  '   -   '  =",
    "  '   ' '   '  ",
    " \"   \"   \"   \" ",
    "    -     -    ",
    "'  -   '   -  '",
    "  -   ' '   -  ",
    " -   \"   \"   - ",
    "=  '   =   '  =",
];

/// Square grid of premium squares, plus the square the first play must cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardLayout {
    pub name: String,
    pub dim: usize,
    squares: Vec<BonusSquare>,
    pub start: (usize, usize),
}

impl BoardLayout {
    /// Build a layout from rows of the textual encoding. Rows shorter than
    /// the row count are padded with plain squares. The start square is the center.
    pub fn parse(name: &str, rows: &[&str]) -> Self {
        let dim = rows.len();
        let mut squares = vec![BonusSquare::None; dim * dim];
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().take(dim).enumerate() {
                squares[r * dim + c] = BonusSquare::from_char(ch);
            }
        }
        Self {
            name: name.to_string(),
            dim,
            squares,
            start: (dim / 2, dim / 2),
        }
    }

    pub fn standard() -> Self {
        Self::parse("CrosswordGame", &CROSSWORD_GAME)
    }

    /// Resolve a layout by its wire name. Only the standard layout ships built in.
    pub fn from_name(name: &str) -> Self {
        if !name.is_empty() && name != "CrosswordGame" {
            log::warn!("unknown board layout {:?}, using CrosswordGame", name);
        }
        Self::standard()
    }

    pub fn bonus(&self, row: usize, col: usize) -> BonusSquare {
        if row < self.dim && col < self.dim {
            self.squares[row * self.dim + col]
        } else {
            BonusSquare::None
        }
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_corners_and_center() {
        let layout = BoardLayout::standard();
        assert_eq!(layout.dim, 15);
        assert_eq!(layout.bonus(0, 0), BonusSquare::TripleWord);
        assert_eq!(layout.bonus(14, 14), BonusSquare::TripleWord);
        assert_eq!(layout.bonus(7, 7), BonusSquare::DoubleWord);
        assert_eq!(layout.bonus(7, 11), BonusSquare::DoubleLetter);
        assert_eq!(layout.bonus(1, 5), BonusSquare::TripleLetter);
        assert_eq!(layout.start, (7, 7));
    }

    #[test]
    fn layout_is_symmetric() {
        let layout = BoardLayout::standard();
        for r in 0..15 {
            for c in 0..15 {
                assert_eq!(layout.bonus(r, c), layout.bonus(c, r), "({}, {})", r, c);
                assert_eq!(layout.bonus(r, c), layout.bonus(14 - r, 14 - c));
            }
        }
    }

    #[test]
    fn out_of_range_is_plain() {
        let layout = BoardLayout::standard();
        assert_eq!(layout.bonus(15, 0), BonusSquare::None);
    }
}
