pub mod grid;
pub mod layout;
pub mod notation;
pub mod words;

pub use grid::{Board, Direction, Tile};
pub use layout::{BoardLayout, BonusSquare};
pub use words::{contiguous_run, legal_placement, words_formed, Run, RunTile};
