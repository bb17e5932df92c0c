pub mod board;
pub mod bridge;
pub mod clock;
pub mod error;
pub mod examine;
pub mod meta;
pub mod overlay;
pub mod protocol;
pub mod reducer;
pub mod session;
pub mod tiles;

// Re-export key types at crate root for convenience
pub use board::{Board, BoardLayout, BonusSquare, Direction, Tile};
pub use board::notation::{format_coordinates, parse_coordinates, to_fen, Coordinates};
pub use bridge::{ClockReadout, READOUT_FLOATS};
pub use clock::{current_remaining, format_millis, next_tick_delay, ClockController, ClockTick, Times};
pub use error::{BoardError, MetaError, OverlayError, ReduceError, SessionError};
pub use examine::{Cursor, Examiner};
pub use meta::{MetaMachine, MetaNotice, MetaRequest, MetaState};
pub use overlay::{tentative_score, Overlay, PlacementArrow};
pub use protocol::{
    ChallengeRule, GameEndReason, GameHistory, MetaEvent, MetaEventType, OutboundAction,
    PlayState, PlayerInfo, ServerMessage, Turn, TurnKind,
};
pub use reducer::{apply, fold, from_history, GameState, Player};
pub use session::{GameSession, SessionConfig, SubscriptionId};
pub use tiles::alphabet::Alphabet;
pub use tiles::letter::Letter;
pub use tiles::pool::TileDistribution;
