use serde::{Deserialize, Serialize};

use crate::protocol::ChallengeRule;

/// Per-session settings, handed over by the host page as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// User id of the local player. `None` when observing.
    pub me: Option<String>,
    /// Overtime allowed past zero before a clock counts as flagged.
    pub max_overtime_minutes: u32,
    /// Points for using every tile on the rack (default: 50).
    pub bingo_bonus: i32,
    /// Tiles on a full rack (default: 7).
    pub rack_size: usize,
    /// Drop a history refresher with no turns once one has been applied.
    /// Servers resend an empty one on reconnect before the real history.
    pub ignore_empty_refresher: bool,
    pub challenge_rule: ChallengeRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            me: None,
            max_overtime_minutes: 0,
            bingo_bonus: 50,
            rack_size: 7,
            ignore_empty_refresher: true,
            challenge_rule: ChallengeRule::Double,
        }
    }
}

impl SessionConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
