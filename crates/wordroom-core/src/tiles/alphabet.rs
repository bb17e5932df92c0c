use serde::Serialize;

use super::letter::Letter;

/// Scoring and distribution data for one letter of an alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LetterInfo {
    pub rune: char,
    pub score: i32,
    pub count: u32,
}

const fn li(rune: char, score: i32, count: u32) -> LetterInfo {
    LetterInfo { rune, score, count }
}

/// A letter distribution: the tiles in the bag at the start of a game.
///
/// `letters[i]` is machine letter `i + 1`. Blanks are machine letter 0
/// and are described by `blanks` alone (they always score zero).
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Alphabet {
    pub name: &'static str,
    pub letters: &'static [LetterInfo],
    pub blanks: u32,
}

pub const BLANK_RUNE: char = '?';
pub const PLAYED_THROUGH_RUNE: char = '.';

pub static ENGLISH: Alphabet = Alphabet {
    name: "english",
    letters: &[
        li('A', 1, 9), li('B', 3, 2), li('C', 3, 2),
        li('D', 2, 4), li('E', 1, 12), li('F', 4, 2),
        li('G', 2, 3), li('H', 4, 2), li('I', 1, 9),
        li('J', 8, 1), li('K', 5, 1), li('L', 1, 4),
        li('M', 3, 2), li('N', 1, 6), li('O', 1, 8),
        li('P', 3, 2), li('Q', 10, 1), li('R', 1, 6),
        li('S', 1, 4), li('T', 1, 6), li('U', 1, 4),
        li('V', 4, 2), li('W', 4, 2), li('X', 8, 1),
        li('Y', 4, 2), li('Z', 10, 1),
    ],
    blanks: 2,
};

pub static SUPER_ENGLISH: Alphabet = Alphabet {
    name: "english_super",
    letters: &[
        li('A', 1, 16), li('B', 3, 4), li('C', 3, 6),
        li('D', 2, 8), li('E', 1, 24), li('F', 4, 4),
        li('G', 2, 5), li('H', 4, 5), li('I', 1, 13),
        li('J', 8, 2), li('K', 5, 2), li('L', 1, 7),
        li('M', 3, 6), li('N', 1, 13), li('O', 1, 15),
        li('P', 3, 4), li('Q', 10, 2), li('R', 1, 13),
        li('S', 1, 10), li('T', 1, 15), li('U', 1, 7),
        li('V', 4, 3), li('W', 4, 4), li('X', 8, 2),
        li('Y', 4, 4), li('Z', 10, 2),
    ],
    blanks: 4,
};

pub static GERMAN: Alphabet = Alphabet {
    name: "german",
    letters: &[
        li('A', 1, 5), li('Ä', 6, 1), li('B', 3, 2),
        li('C', 4, 2), li('D', 1, 4), li('E', 1, 15),
        li('F', 4, 2), li('G', 2, 3), li('H', 2, 4),
        li('I', 1, 6), li('J', 6, 1), li('K', 4, 2),
        li('L', 2, 3), li('M', 3, 4), li('N', 1, 9),
        li('O', 2, 3), li('Ö', 8, 1), li('P', 4, 1),
        li('Q', 10, 1), li('R', 1, 6), li('S', 1, 7),
        li('T', 1, 6), li('U', 1, 6), li('Ü', 6, 1),
        li('V', 6, 1), li('W', 3, 1), li('X', 8, 1),
        li('Y', 10, 1), li('Z', 3, 1),
    ],
    blanks: 2,
};

// Zero-count letters stay in the table so blanks can still be designated as them.
pub static NORWEGIAN: Alphabet = Alphabet {
    name: "norwegian",
    letters: &[
        li('A', 1, 7), li('Ä', 0, 0), li('B', 4, 3),
        li('C', 10, 1), li('D', 1, 5), li('E', 1, 9),
        li('F', 2, 4), li('G', 2, 4), li('H', 3, 3),
        li('I', 1, 5), li('J', 4, 2), li('K', 2, 4),
        li('L', 1, 5), li('M', 2, 3), li('N', 1, 6),
        li('O', 2, 4), li('Ö', 0, 0), li('P', 4, 2),
        li('Q', 0, 0), li('R', 1, 6), li('S', 1, 6),
        li('T', 1, 6), li('U', 4, 3), li('Ü', 0, 0),
        li('V', 4, 3), li('W', 8, 1), li('X', 0, 0),
        li('Y', 6, 1), li('Z', 0, 0), li('Æ', 6, 1),
        li('Ø', 5, 2), li('Å', 4, 2),
    ],
    blanks: 2,
};

pub static FRENCH: Alphabet = Alphabet {
    name: "french",
    letters: &[
        li('A', 1, 9), li('B', 3, 2), li('C', 3, 2),
        li('D', 2, 3), li('E', 1, 15), li('F', 4, 2),
        li('G', 2, 2), li('H', 4, 2), li('I', 1, 8),
        li('J', 8, 1), li('K', 10, 1), li('L', 1, 5),
        li('M', 2, 3), li('N', 1, 6), li('O', 1, 6),
        li('P', 3, 2), li('Q', 8, 1), li('R', 1, 6),
        li('S', 1, 6), li('T', 1, 6), li('U', 1, 6),
        li('V', 4, 2), li('W', 10, 1), li('X', 10, 1),
        li('Y', 10, 1), li('Z', 10, 1),
    ],
    blanks: 2,
};

impl Alphabet {
    /// Look up a distribution by its wire name. Unknown names fall back to English.
    pub fn from_name(name: &str) -> &'static Alphabet {
        match name.to_lowercase().as_str() {
            "english" => &ENGLISH,
            "english_super" => &SUPER_ENGLISH,
            "german" => &GERMAN,
            "norwegian" => &NORWEGIAN,
            "french" => &FRENCH,
            other => {
                log::warn!("unknown letter distribution {:?}, using english", other);
                &ENGLISH
            }
        }
    }

    /// Number of distinct machine letters, blank included.
    pub fn len(&self) -> usize {
        self.letters.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    fn info(&self, letter: Letter) -> Option<&LetterInfo> {
        let idx = letter.unblanked().0 as usize;
        if idx == 0 {
            return None;
        }
        self.letters.get(idx - 1)
    }

    /// Tile value. Blanks, designated or not, are worth nothing.
    pub fn score(&self, letter: Letter) -> i32 {
        if letter.is_blank() || letter.is_designated_blank() {
            return 0;
        }
        self.info(letter).map_or(0, |i| i.score)
    }

    /// Starting count of a tile in the bag.
    pub fn count(&self, letter: Letter) -> u32 {
        if letter.is_blank() {
            return self.blanks;
        }
        self.info(letter).map_or(0, |i| i.count)
    }

    /// Whether a machine letter belongs to this alphabet.
    pub fn contains(&self, letter: Letter) -> bool {
        letter.is_blank() || self.info(letter).is_some()
    }

    /// Display rune: uppercase for tiles, lowercase for designated blanks, `?` for blanks.
    pub fn rune(&self, letter: Letter) -> char {
        if letter.is_blank() {
            return BLANK_RUNE;
        }
        match self.info(letter) {
            Some(info) if letter.is_designated_blank() => {
                info.rune.to_lowercase().next().unwrap_or(info.rune)
            }
            Some(info) => info.rune,
            None => BLANK_RUNE,
        }
    }

    /// Inverse of [`Alphabet::rune`]. A lowercase rune is a designated blank.
    pub fn letter(&self, rune: char) -> Option<Letter> {
        if rune == BLANK_RUNE {
            return Some(Letter::BLANK);
        }
        let upper = rune.to_uppercase().next()?;
        let idx = self.letters.iter().position(|i| i.rune == upper)?;
        let letter = Letter(idx as u8 + 1);
        if upper != rune {
            Some(letter.designate())
        } else {
            Some(letter)
        }
    }

    /// Convert a rune string (e.g. a rack "CESAR" or a play "C.RES") to machine letters.
    /// `.` maps to [`Letter::PLAYED_THROUGH`].
    pub fn letters(&self, runes: &str) -> Option<Vec<Letter>> {
        runes
            .chars()
            .map(|c| {
                if c == PLAYED_THROUGH_RUNE {
                    Some(Letter::PLAYED_THROUGH)
                } else {
                    self.letter(c)
                }
            })
            .collect()
    }

    pub fn runes(&self, letters: &[Letter]) -> String {
        letters.iter().map(|&l| self.rune(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_tile_count_is_one_hundred() {
        let total: u32 = ENGLISH.letters.iter().map(|i| i.count).sum::<u32>() + ENGLISH.blanks;
        assert_eq!(total, 100);
    }

    #[test]
    fn runes_convert_both_ways() {
        let letters = ENGLISH.letters("CESAR").unwrap();
        assert_eq!(letters[0], Letter(3));
        assert_eq!(ENGLISH.runes(&letters), "CESAR");

        let with_blank = ENGLISH.letters("Ca?").unwrap();
        assert!(with_blank[1].is_designated_blank());
        assert!(with_blank[2].is_blank());
        assert_eq!(ENGLISH.runes(&with_blank), "Ca?");
    }

    #[test]
    fn designated_blank_scores_zero() {
        let q = ENGLISH.letter('Q').unwrap();
        assert_eq!(ENGLISH.score(q), 10);
        assert_eq!(ENGLISH.score(q.designate()), 0);
        assert_eq!(ENGLISH.score(Letter::BLANK), 0);
    }

    #[test]
    fn unknown_distribution_falls_back_to_english() {
        assert_eq!(Alphabet::from_name("klingon").name, "english");
        assert_eq!(Alphabet::from_name("GERMAN").name, "german");
    }

    #[test]
    fn non_ascii_runes_resolve() {
        let ae = NORWEGIAN.letter('Æ').unwrap();
        assert_eq!(NORWEGIAN.score(ae), 6);
        assert_eq!(NORWEGIAN.rune(ae.designate()), 'æ');
    }
}
