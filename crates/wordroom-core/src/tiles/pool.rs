use serde::Serialize;

use super::alphabet::Alphabet;
use super::letter::Letter;

/// Tile counts indexed by machine letter (index 0 = blanks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileDistribution {
    counts: Vec<i32>,
}

impl TileDistribution {
    /// The full bag for an alphabet.
    pub fn full(alphabet: &Alphabet) -> Self {
        let mut counts = Vec::with_capacity(alphabet.len());
        counts.push(alphabet.blanks as i32);
        counts.extend(alphabet.letters.iter().map(|i| i.count as i32));
        Self { counts }
    }

    pub fn get(&self, letter: Letter) -> i32 {
        self.counts.get(letter.tile().0 as usize).copied().unwrap_or(0)
    }

    /// Take a tile out. Designated blanks are taken from the blank count.
    pub fn take(&mut self, letter: Letter) {
        if let Some(c) = self.counts.get_mut(letter.tile().0 as usize) {
            *c -= 1;
        }
    }

    /// Total tiles remaining.
    pub fn total(&self) -> i32 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Letter, i32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (Letter(i as u8), c))
    }
}
