use std::collections::BTreeSet;

use serde::Serialize;

use crate::board::{Board, BoardLayout};
use crate::protocol::{ChallengeRule, GameEndReason, PlayState, PlayerInfo, Turn};
use crate::tiles::alphabet::{Alphabet, ENGLISH};
use crate::tiles::letter::Letter;
use crate::tiles::pool::TileDistribution;

/// A seat at the table. Players are always kept in first-to-move order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub user_id: String,
    pub nickname: String,
    /// Empty when the rack is hidden from this client.
    pub rack: Vec<Letter>,
    pub score: i32,
    /// Last time snapshot from the server, not a live countdown.
    pub time_millis: i64,
    pub time_bank_millis: Option<i64>,
    pub on_turn: bool,
    pub timed_out: bool,
}

impl Player {
    pub fn new(info: &PlayerInfo) -> Self {
        Self {
            user_id: info.user_id.clone(),
            nickname: info.nickname.clone(),
            rack: Vec::new(),
            score: 0,
            time_millis: 0,
            time_bank_millis: None,
            on_turn: false,
            timed_out: false,
        }
    }
}

/// The canonical game state: a fold of the turn log, plus the racks and
/// clock snapshots the server sent alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub game_id: String,
    pub alphabet: &'static Alphabet,
    pub board: Board,
    pub players: Vec<Player>,
    /// `None` once the game is over.
    pub on_turn: Option<usize>,
    pub turns: Vec<Turn>,
    /// Tiles not on the board or on any known rack.
    pub pool: TileDistribution,
    pub play_state: PlayState,
    pub end_reason: GameEndReason,
    pub winner: Option<String>,
    pub challenge_rule: ChallengeRule,
    /// Squares covered by the most recent placement.
    pub last_played: BTreeSet<(usize, usize)>,
    /// Player index that placed each square, row-major. Not cleared when
    /// a phony comes off, so the UI can still show who tried it.
    player_of_tile: Vec<Option<usize>>,
    pub max_overtime_minutes: u32,
    pub initial_time_millis: i64,
    /// Number of history refreshers folded into this session so far.
    pub refreshers: u32,
}

impl GameState {
    pub fn new(
        game_id: &str,
        alphabet: &'static Alphabet,
        layout: BoardLayout,
        players: &[PlayerInfo],
    ) -> Self {
        let dim = layout.dim;
        let mut players: Vec<Player> = players.iter().map(Player::new).collect();
        if let Some(first) = players.first_mut() {
            first.on_turn = true;
        }
        let on_turn = if players.is_empty() { None } else { Some(0) };
        Self {
            game_id: game_id.to_string(),
            alphabet,
            board: Board::empty(layout),
            players,
            on_turn,
            turns: Vec::new(),
            pool: TileDistribution::full(alphabet),
            play_state: PlayState::Playing,
            end_reason: GameEndReason::None,
            winner: None,
            challenge_rule: ChallengeRule::default(),
            last_played: BTreeSet::new(),
            player_of_tile: vec![None; dim * dim],
            max_overtime_minutes: 0,
            initial_time_millis: 0,
            refreshers: 0,
        }
    }

    /// Placeholder state for a game whose history has not arrived yet.
    pub fn waiting(game_id: &str) -> Self {
        let mut gs = Self::new(game_id, &ENGLISH, BoardLayout::standard(), &[]);
        gs.play_state = PlayState::GameOver;
        gs
    }

    pub fn is_over(&self) -> bool {
        self.play_state == PlayState::GameOver
    }

    pub fn player_index(&self, user_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.user_id == user_id)
    }

    pub fn player_of_tile(&self, row: usize, col: usize) -> Option<usize> {
        let dim = self.board.dim();
        if row < dim && col < dim {
            self.player_of_tile[row * dim + col]
        } else {
            None
        }
    }

    pub(crate) fn set_player_of_tile(&mut self, row: usize, col: usize, player: usize) {
        let dim = self.board.dim();
        if row < dim && col < dim {
            self.player_of_tile[row * dim + col] = Some(player);
        }
    }

    /// Hand the turn to `next`, or to nobody.
    pub(crate) fn set_on_turn(&mut self, next: Option<usize>) {
        self.on_turn = next;
        for (i, p) in self.players.iter_mut().enumerate() {
            p.on_turn = Some(i) == next;
        }
    }

    /// Rebuild the pool from the full distribution minus every tile on
    /// the board and on every known rack.
    pub(crate) fn recompute_pool(&mut self) {
        let mut pool = TileDistribution::full(self.alphabet);
        for tile in self.board.tiles() {
            pool.take(tile.letter);
        }
        for p in &self.players {
            for &l in &p.rack {
                if l != Letter::EMPTY_RACK_SLOT {
                    pool.take(l);
                }
            }
        }
        self.pool = pool;
    }
}
