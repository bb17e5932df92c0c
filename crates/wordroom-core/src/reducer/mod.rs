//! The canonical game state and the pure transition that folds server
//! messages into it.

pub mod apply;
pub mod state;

pub use apply::{apply, apply_turn, fold, from_history};
pub use state::{GameState, Player};
