use serde::{Deserialize, Serialize};

use super::events::MetaEvent;
use crate::board::Direction;
use crate::tiles::letter::Letter;

/// A request the client sends to the server. Serialized by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundAction {
    /// Tiles in board order from (`row`, `col`); played-through squares are
    /// [`Letter::PLAYED_THROUGH`].
    PlaceTiles {
        game_id: String,
        row: usize,
        col: usize,
        direction: Direction,
        tiles: Vec<Letter>,
    },
    Pass {
        game_id: String,
    },
    Exchange {
        game_id: String,
        tiles: Vec<Letter>,
    },
    Challenge {
        game_id: String,
    },
    Meta(MetaEvent),
    /// A clock ran out locally; the server decides whether the game is lost.
    TimedOut {
        game_id: String,
        user_id: String,
    },
    /// Ask for a fresh `GameHistoryRefresher` after a desync.
    RequestResync {
        game_id: String,
    },
}
