use crate::board::{legal_placement, words_formed, Board, Run, Tile};
use crate::tiles::alphabet::Alphabet;

/// Score a tentative placement the way the server will, without checking
/// words against a lexicon. Returns `None` if the tiles are not a legal
/// placement on `board`.
///
/// Every word the placement forms scores on its own. Premium squares count
/// only under freshly placed tiles.
pub fn tentative_score(
    board: &Board,
    tiles: &[Tile],
    alphabet: &Alphabet,
    bingo_bonus: i32,
    rack_size: usize,
) -> Option<i32> {
    legal_placement(tiles, board).ok()?;
    let words = words_formed(board, tiles).ok()?;
    let total: i32 = words.iter().map(|w| word_score(board, alphabet, w)).sum();
    let bingo = if tiles.len() == rack_size { bingo_bonus } else { 0 };
    Some(total + bingo)
}

fn word_score(board: &Board, alphabet: &Alphabet, word: &Run) -> i32 {
    let mut sum = 0;
    let mut word_mult = 1;
    for t in &word.tiles {
        let value = alphabet.score(t.letter);
        if t.fresh {
            let bonus = board.bonus(t.row, t.col);
            sum += value * bonus.letter_multiplier();
            word_mult *= bonus.word_multiplier();
        } else {
            sum += value;
        }
    }
    sum * word_mult
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardLayout;
    use crate::tiles::alphabet::ENGLISH;

    fn row_tiles(row: usize, col: usize, word: &str) -> Vec<Tile> {
        ENGLISH
            .letters(word)
            .unwrap()
            .into_iter()
            .enumerate()
            .map(|(i, l)| Tile::new(row, col + i, l))
            .collect()
    }

    fn empty() -> Board {
        Board::empty(BoardLayout::standard())
    }

    #[test]
    fn opening_play_doubles_on_center() {
        let score = tentative_score(&empty(), &row_tiles(7, 7, "CARES"), &ENGLISH, 50, 7);
        assert_eq!(score, Some(16));
    }

    #[test]
    fn seven_tiles_earn_the_bingo_bonus() {
        let score = tentative_score(&empty(), &row_tiles(7, 4, "RETAINS"), &ENGLISH, 50, 7);
        assert_eq!(score, Some(7 * 2 + 50));
    }

    #[test]
    fn designated_blank_scores_zero() {
        let score = tentative_score(&empty(), &row_tiles(7, 7, "cARES"), &ENGLISH, 50, 7);
        assert_eq!(score, Some((1 + 1 + 1 + 2) * 2));
    }

    #[test]
    fn cross_words_add_their_own_score() {
        let board = empty().place_tiles(&row_tiles(7, 7, "CARES")).unwrap();
        // A under C forms CA; T under A on a double letter forms AT.
        let score = tentative_score(&board, &row_tiles(8, 7, "AT"), &ENGLISH, 50, 7);
        assert_eq!(score, Some(3 + 4 + 3));
    }

    #[test]
    fn premiums_under_existing_tiles_do_not_count() {
        let board = empty().place_tiles(&row_tiles(7, 7, "CARES")).unwrap();
        // S hooks the end of CARES, playing through all five board tiles.
        let score = tentative_score(&board, &row_tiles(7, 12, "S"), &ENGLISH, 50, 7);
        assert_eq!(score, Some(3 + 1 + 1 + 1 + 1 + 1));
    }

    #[test]
    fn illegal_play_has_no_score() {
        let tiles = vec![
            Tile::new(7, 7, ENGLISH.letter('A').unwrap()),
            Tile::new(7, 9, ENGLISH.letter('B').unwrap()),
        ];
        assert_eq!(tentative_score(&empty(), &tiles, &ENGLISH, 50, 7), None);
        assert_eq!(tentative_score(&empty(), &row_tiles(0, 0, "AB"), &ENGLISH, 50, 7), None);
    }
}
