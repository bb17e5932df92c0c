//! Read-only navigation through the turn log.

use serde::Serialize;

use crate::error::ReduceError;
use crate::protocol::{PlayerInfo, TurnKind};
use crate::reducer::{fold, GameState};

/// Which point of the log is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    /// Following the live game.
    #[default]
    Live,
    /// Showing the position after the first `n` turns.
    At(usize),
}

/// History cursor. Every move takes the current log length so the cursor
/// can clamp; it never holds state of its own beyond the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Examiner {
    cursor: Cursor,
}

impl Examiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_examining(&self) -> bool {
        self.cursor != Cursor::Live
    }

    /// Number of turns shown for a log of `len` turns.
    pub fn shown_turns(&self, len: usize) -> usize {
        match self.cursor {
            Cursor::Live => len,
            Cursor::At(n) => n.min(len),
        }
    }

    /// Jump to the position after `n` turns. Anything at or past the end is live.
    pub fn goto(&mut self, n: usize, len: usize) {
        self.cursor = if n >= len { Cursor::Live } else { Cursor::At(n) };
        log::debug!("examine cursor -> {:?}", self.cursor);
    }

    pub fn first(&mut self, len: usize) {
        self.goto(0, len);
    }

    pub fn prev(&mut self, len: usize) {
        let shown = self.shown_turns(len);
        self.goto(shown.saturating_sub(1), len);
    }

    pub fn next(&mut self, len: usize) {
        let next = match self.cursor {
            Cursor::Live => return,
            Cursor::At(n) if n + 1 >= len => len,
            Cursor::At(n) => n + 1,
        };
        self.goto(next, len);
    }

    /// Back to the live position.
    pub fn last(&mut self) {
        self.cursor = Cursor::Live;
    }

    /// Leave examine mode. Same as [`Examiner::last`].
    pub fn end(&mut self) {
        self.last();
    }

    /// The state to display at the cursor.
    ///
    /// A historical position is rebuilt by folding the log prefix from an
    /// empty board, through the same transition the live reducer uses.
    /// Scores and clocks come from each player's most recent turn; racks
    /// from the next turn each player makes.
    pub fn derived_state(&self, live: &GameState) -> Result<GameState, ReduceError> {
        let n = match self.cursor {
            Cursor::Live => return Ok(live.clone()),
            Cursor::At(n) => n.min(live.turns.len()),
        };
        let infos: Vec<PlayerInfo> = live
            .players
            .iter()
            .map(|p| PlayerInfo { user_id: p.user_id.clone(), nickname: p.nickname.clone() })
            .collect();
        let mut base = GameState::new(&live.game_id, live.alphabet, live.board.layout().clone(), &infos);
        base.challenge_rule = live.challenge_rule;
        base.max_overtime_minutes = live.max_overtime_minutes;
        base.initial_time_millis = live.initial_time_millis;
        base.refreshers = live.refreshers;

        let mut gs = fold(base, &live.turns[..n])?;
        let (past, future) = live.turns.split_at(n);
        for (i, player) in gs.players.iter_mut().enumerate() {
            player.time_millis = past
                .iter()
                .rev()
                .filter(|t| t.kind.carries_time())
                .find(|t| (t.player_index == i) != t.kind.time_belongs_to_challenger())
                .map_or(live.initial_time_millis, |t| t.millis_remaining);

            player.rack = future
                .iter()
                .filter(|t| !matches!(t.kind, TurnKind::EndRackPoints | TurnKind::EndRackPenalty))
                .find(|t| t.player_index == i)
                .map_or_else(|| live.players[i].rack.clone(), |t| t.rack.clone());
        }
        gs.recompute_pool();
        Ok(gs)
    }
}
