use serde::{Deserialize, Serialize};

/// A machine letter, as carried on the wire.
///
/// `0` is the blank tile. `1..=n` index into the game's alphabet.
/// The high bit marks a blank that has been designated as a letter
/// (a blank played as `E` is `E | 0x80`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Letter(pub u8);

impl Letter {
    /// An undesignated blank (on a rack, or in the pool).
    pub const BLANK: Letter = Letter(0);
    /// In a placement's tile list, a zero means "played through an existing tile".
    pub const PLAYED_THROUGH: Letter = Letter(0);
    /// An empty slot on a displayed rack. Never a board letter.
    pub const EMPTY_RACK_SLOT: Letter = Letter(Self::BLANK_BIT);

    const BLANK_BIT: u8 = 0x80;

    pub fn is_blank(self) -> bool {
        self.0 == 0
    }

    /// True for a blank that was played as a letter.
    pub fn is_designated_blank(self) -> bool {
        self.0 & Self::BLANK_BIT != 0 && self.0 != Self::BLANK_BIT
    }

    /// Mark this letter as a blank playing it.
    pub fn designate(self) -> Letter {
        Letter(self.0 | Self::BLANK_BIT)
    }

    /// The plain letter, with any blank designation stripped.
    pub fn unblanked(self) -> Letter {
        Letter(self.0 & !Self::BLANK_BIT)
    }

    /// The physical tile this letter came from: designated blanks are blanks.
    pub fn tile(self) -> Letter {
        if self.is_designated_blank() {
            Letter::BLANK
        } else {
            self
        }
    }
}
