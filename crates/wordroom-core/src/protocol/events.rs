use serde::{Deserialize, Serialize};

use crate::board::Direction;
use crate::tiles::letter::Letter;

/// What happened on a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    #[default]
    TilePlacement,
    /// A challenged play was phony; its tiles come off the board.
    PhonyTilesReturned,
    Pass,
    /// Points awarded to the player whose play survived a challenge.
    ChallengeBonus,
    Exchange,
    EndRackPoints,
    TimePenalty,
    EndRackPenalty,
    UnsuccessfulChallengeTurnLoss,
    Challenge,
    TimedOut,
}

impl TurnKind {
    /// For these, the time snapshot on the event belongs to the challenger,
    /// not to the player named in it.
    pub fn time_belongs_to_challenger(self) -> bool {
        matches!(self, TurnKind::ChallengeBonus | TurnKind::PhonyTilesReturned)
    }

    /// Post-game rack adjustments carry no meaningful clock snapshot.
    pub fn carries_time(self) -> bool {
        !matches!(self, TurnKind::EndRackPoints | TurnKind::EndRackPenalty)
    }
}

/// One immutable entry of the turn log.
///
/// `rack` is the acting player's rack *before* the turn. In `played_tiles`
/// a [`Letter::PLAYED_THROUGH`] marks a square already on the board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "type")]
    pub kind: TurnKind,
    pub player_index: usize,
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub column: usize,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub played_tiles: Vec<Letter>,
    #[serde(default)]
    pub exchanged: Vec<Letter>,
    #[serde(default)]
    pub rack: Vec<Letter>,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub cumulative: i32,
    #[serde(default)]
    pub bonus: i32,
    #[serde(default)]
    pub end_rack_points: i32,
    #[serde(default)]
    pub lost_score: i32,
    #[serde(default)]
    pub is_bingo: bool,
    #[serde(default)]
    pub words_formed: Vec<Vec<Letter>>,
    #[serde(default)]
    pub millis_remaining: i64,
}

impl Turn {
    /// Board cells this turn's `played_tiles` cover, skipping played-through squares.
    pub fn placed_cells(&self) -> impl Iterator<Item = (usize, usize, Letter)> + '_ {
        let (dr, dc) = match self.direction {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
        };
        self.played_tiles
            .iter()
            .enumerate()
            .filter(|(_, l)| **l != Letter::PLAYED_THROUGH)
            .map(move |(i, &l)| {
                (self.row.saturating_add(i * dr), self.column.saturating_add(i * dc), l)
            })
    }

    /// Whether every square from the anchor to the last played tile lies on
    /// a board of `dim` by `dim`.
    pub fn fits_on(&self, dim: usize) -> bool {
        let span = self.played_tiles.len().saturating_sub(1);
        let (last_row, last_col) = match self.direction {
            Direction::Horizontal => (Some(self.row), self.column.checked_add(span)),
            Direction::Vertical => (self.row.checked_add(span), Some(self.column)),
        };
        matches!((last_row, last_col), (Some(r), Some(c)) if r < dim && c < dim)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    #[default]
    Playing,
    WaitingForFinalPass,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndReason {
    #[default]
    None,
    Time,
    Standard,
    ConsecutiveZeroes,
    Resigned,
    Aborted,
    TripleChallenge,
    Cancelled,
    ForceForfeit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeRule {
    Void,
    Single,
    #[default]
    Double,
    FivePoint,
    TenPoint,
    TripleChallenge,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub user_id: String,
    pub nickname: String,
}

/// A complete game record as sent on (re)connect.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameHistory {
    pub game_id: String,
    /// In first-to-move order.
    pub players: Vec<PlayerInfo>,
    #[serde(default)]
    pub events: Vec<Turn>,
    #[serde(default)]
    pub last_known_racks: Vec<Vec<Letter>>,
    #[serde(default)]
    pub letter_distribution: String,
    #[serde(default)]
    pub board_layout: String,
    #[serde(default)]
    pub play_state: PlayState,
    #[serde(default)]
    pub end_reason: GameEndReason,
    #[serde(default)]
    pub final_scores: Vec<i32>,
    #[serde(default)]
    pub challenge_rule: ChallengeRule,
    /// Starting time per player; shown for players who have not moved yet.
    #[serde(default)]
    pub initial_time_millis: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaEventType {
    RequestAbort,
    RequestAdjudication,
    AbortAccepted,
    AbortDenied,
    AdjudicationAccepted,
    AdjudicationDenied,
    AddTime,
    TimerExpired,
}

/// Out-of-band game control message, in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEvent {
    pub game_id: String,
    pub event_type: MetaEventType,
    /// The request this event creates or answers.
    #[serde(default)]
    pub orig_event_id: String,
    /// Who sent it. Empty on a server-side auto-cancel.
    #[serde(default)]
    pub player_id: String,
    /// Countdown length of a request, in milliseconds from receipt.
    #[serde(default)]
    pub expiry: i64,
}

/// Every message kind the game-state core consumes, already decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot; always replaces the turn log wholesale.
    GameHistoryRefresher {
        history: GameHistory,
        time_player1: i64,
        time_player2: i64,
        #[serde(default)]
        time_bank_player1: i64,
        #[serde(default)]
        time_bank_player2: i64,
        #[serde(default)]
        max_overtime_minutes: u32,
    },
    ServerGameplayEvent {
        game_id: String,
        event: Turn,
        #[serde(default)]
        new_rack: Vec<Letter>,
        time_remaining: i64,
        #[serde(default)]
        time_bank: Option<i64>,
        playing: PlayState,
        /// Log position this event expects to occupy, when the server sends it.
        #[serde(default)]
        turn_index: Option<usize>,
    },
    /// `valid` describes the challenged play: `false` means it was phony
    /// and comes off the board.
    ServerChallengeResultEvent {
        game_id: String,
        valid: bool,
        #[serde(default)]
        challenger: String,
        #[serde(default)]
        challenge_rule: ChallengeRule,
        #[serde(default)]
        time_remaining: Option<i64>,
    },
    /// Clock heartbeat; never touches the turn log.
    TimeUpdate {
        game_id: String,
        player_index: usize,
        time_remaining: i64,
    },
    TimedOut {
        game_id: String,
        user_id: String,
    },
    GameEndedEvent {
        game_id: String,
        #[serde(default)]
        history: Option<GameHistory>,
        #[serde(default)]
        end_reason: GameEndReason,
        #[serde(default)]
        final_scores: Vec<i32>,
        #[serde(default)]
        winner: Option<String>,
    },
    GameMetaEvent(MetaEvent),
}

impl ServerMessage {
    /// Parse a decoded message handed over as JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn game_id(&self) -> &str {
        match self {
            ServerMessage::GameHistoryRefresher { history, .. } => &history.game_id,
            ServerMessage::ServerGameplayEvent { game_id, .. }
            | ServerMessage::ServerChallengeResultEvent { game_id, .. }
            | ServerMessage::TimeUpdate { game_id, .. }
            | ServerMessage::TimedOut { game_id, .. }
            | ServerMessage::GameEndedEvent { game_id, .. } => game_id,
            ServerMessage::GameMetaEvent(meta) => &meta.game_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_gameplay_event() {
        let json = r#"{
            "type": "server_gameplay_event",
            "game_id": "g1",
            "event": {
                "type": "tile_placement",
                "player_index": 0,
                "row": 7, "column": 7, "direction": "horizontal",
                "played_tiles": [3, 1, 18, 5, 19],
                "rack": [3, 5, 19, 1, 18],
                "score": 16, "cumulative": 16
            },
            "new_rack": [1, 2],
            "time_remaining": 59000,
            "playing": "playing"
        }"#;
        let msg = ServerMessage::from_json(json).unwrap();
        assert_eq!(msg.game_id(), "g1");
        match msg {
            ServerMessage::ServerGameplayEvent { event, turn_index, time_bank, .. } => {
                assert_eq!(event.kind, TurnKind::TilePlacement);
                assert_eq!(event.played_tiles.len(), 5);
                assert_eq!(turn_index, None);
                assert_eq!(time_bank, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_meta_event() {
        let json = r#"{
            "type": "game_meta_event",
            "game_id": "g1",
            "event_type": "request_abort",
            "orig_event_id": "m1",
            "player_id": "u2",
            "expiry": 60000
        }"#;
        let msg = ServerMessage::from_json(json).unwrap();
        match msg {
            ServerMessage::GameMetaEvent(meta) => {
                assert_eq!(meta.event_type, MetaEventType::RequestAbort);
                assert_eq!(meta.expiry, 60000);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_message_type_is_a_decode_error() {
        assert!(ServerMessage::from_json(r#"{"type": "lobby_chat"}"#).is_err());
    }

    #[test]
    fn placed_cells_skip_played_through() {
        let turn = Turn {
            row: 3,
            column: 2,
            direction: Direction::Vertical,
            played_tiles: vec![Letter(1), Letter::PLAYED_THROUGH, Letter(2)],
            ..Default::default()
        };
        let cells: Vec<_> = turn.placed_cells().collect();
        assert_eq!(cells, vec![(3, 2, Letter(1)), (5, 2, Letter(2))]);
    }

    #[test]
    fn far_anchor_does_not_fit_and_does_not_overflow() {
        let turn = Turn {
            row: 7,
            column: usize::MAX,
            played_tiles: vec![Letter(1), Letter(2)],
            ..Default::default()
        };
        assert!(!turn.fits_on(15));
        let cells: Vec<_> = turn.placed_cells().collect();
        assert_eq!(cells[1], (7, usize::MAX, Letter(2)));

        let turn = Turn { row: 7, column: 13, played_tiles: vec![Letter(1), Letter(2)], ..Default::default() };
        assert!(turn.fits_on(15));
        assert!(!turn.fits_on(14));
    }
}
