//! One live game: the single writer that owns the canonical state and every
//! projection of it.

pub mod config;

pub use config::SessionConfig;

use crate::bridge::ClockReadout;
use crate::clock::{ClockController, ClockTick, Times};
use crate::error::{MetaError, OverlayError, ReduceError, SessionError};
use crate::examine::Examiner;
use crate::meta::{MetaMachine, MetaNotice};
use crate::overlay::{self, Overlay};
use crate::protocol::{MetaEvent, MetaEventType, OutboundAction, ServerMessage};
use crate::reducer::{apply, GameState};
use crate::tiles::letter::Letter;

pub type SubscriptionId = u32;

type Subscriber = Box<dyn FnMut(&GameState)>;

/// Everything the client holds for one game.
///
/// Server messages enter only through [`GameSession::handle`]. The overlay,
/// examiner, clock and meta machine are rebuilt or reset from the canonical
/// state and never write back into it.
pub struct GameSession {
    config: SessionConfig,
    state: GameState,
    examiner: Examiner,
    overlay: Overlay,
    clock: ClockController,
    meta: MetaMachine,
    outbound: Vec<OutboundAction>,
    notices: Vec<MetaNotice>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
    needs_resync: bool,
}

impl GameSession {
    pub fn new(game_id: &str, config: SessionConfig) -> Self {
        let mut state = GameState::waiting(game_id);
        state.challenge_rule = config.challenge_rule;
        Self {
            clock: ClockController::new(config.max_overtime_minutes),
            meta: MetaMachine::new(config.me.clone()),
            config,
            state,
            examiner: Examiner::new(),
            overlay: Overlay::default(),
            outbound: Vec::new(),
            notices: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            needs_resync: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn game_id(&self) -> &str {
        &self.state.game_id
    }

    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    /// Seat index of the local player, if they are playing in this game.
    pub fn my_index(&self) -> Option<usize> {
        self.config.me.as_deref().and_then(|me| self.state.player_index(me))
    }

    fn my_rack(&self) -> Vec<Letter> {
        self.my_index().map(|i| self.state.players[i].rack.clone()).unwrap_or_default()
    }

    // ---- Server input ----

    /// Fold one server message into the session. A rejected message leaves
    /// the session exactly as it was; the error is logged and returned.
    pub fn handle(&mut self, msg: &ServerMessage, now: f64) -> Result<(), SessionError> {
        if let ServerMessage::GameMetaEvent(evt) = msg {
            return self.handle_meta(msg, evt, now);
        }
        if let ServerMessage::GameHistoryRefresher { history, .. } = msg {
            if self.config.ignore_empty_refresher && history.events.is_empty() && self.state.refreshers > 0 {
                log::info!("{}: ignoring empty history refresher", self.state.game_id);
                return Ok(());
            }
        }

        let next = match apply(&self.state, msg) {
            Ok(next) => next,
            Err(err) => {
                log::warn!("{}: rejected server message: {}", self.state.game_id, err);
                if matches!(err, ReduceError::Desync { .. }) && !self.needs_resync {
                    self.needs_resync = true;
                    self.outbound.push(OutboundAction::RequestResync { game_id: self.state.game_id.clone() });
                }
                return Err(err.into());
            }
        };

        let log_replaced = matches!(
            msg,
            ServerMessage::GameHistoryRefresher { .. } | ServerMessage::GameEndedEvent { history: Some(_), .. }
        );
        let log_changed = log_replaced || next.turns.len() != self.state.turns.len();
        let clock_restart = log_replaced
            || next.on_turn != self.state.on_turn
            || next.play_state != self.state.play_state
            || next.players.len() != self.state.players.len();
        let prior_snapshots: Vec<(i64, Option<i64>)> =
            self.state.players.iter().map(|p| (p.time_millis, p.time_bank_millis)).collect();
        self.state = next;

        if log_replaced {
            log::info!("{}: history refreshed, {} turns", self.state.game_id, self.state.turns.len());
            self.examiner.last();
            self.needs_resync = false;
            self.clock.set_max_overtime(self.state.max_overtime_minutes.max(self.config.max_overtime_minutes));
        }
        if let ServerMessage::GameEndedEvent { end_reason, .. } = msg {
            log::info!("{}: game over ({:?})", self.state.game_id, end_reason);
        }
        if log_changed {
            self.reset_overlay();
        }
        if clock_restart {
            self.sync_clock(now);
        } else {
            self.refresh_clock(&prior_snapshots, now);
        }
        self.notify();
        Ok(())
    }

    fn handle_meta(&mut self, msg: &ServerMessage, evt: &MetaEvent, now: f64) -> Result<(), SessionError> {
        if msg.game_id() != self.state.game_id {
            let err = ReduceError::WrongGame { expected: self.state.game_id.clone(), got: msg.game_id().to_string() };
            log::warn!("{}: rejected meta event: {}", self.state.game_id, err);
            return Err(err.into());
        }
        match self.meta.handle(evt, now) {
            Ok(notice) => {
                self.notices.extend(notice);
                Ok(())
            }
            Err(err) => {
                log::warn!("{}: rejected meta event: {}", self.state.game_id, err);
                Err(err.into())
            }
        }
    }

    /// Decode a JSON message and handle it.
    pub fn handle_json(&mut self, json: &str, now: f64) -> Result<(), SessionError> {
        let msg = ServerMessage::from_json(json).map_err(|err| {
            log::warn!("{}: undecodable server message: {}", self.state.game_id, err);
            err
        })?;
        self.handle(&msg, now)
    }

    /// Drop the current game entirely and start waiting on `game_id`.
    /// Subscribers stay registered.
    pub fn switch_game(&mut self, game_id: &str) {
        log::info!("switching from game {} to {}", self.state.game_id, game_id);
        let subscribers = std::mem::take(&mut self.subscribers);
        let next_subscription = self.next_subscription;
        *self = Self::new(game_id, self.config.clone());
        self.subscribers = subscribers;
        self.next_subscription = next_subscription;
        self.notify();
    }

    // ---- Subscriptions ----

    /// Register a callback run after every accepted state change.
    pub fn subscribe(&mut self, f: impl FnMut(&GameState) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        for (_, f) in self.subscribers.iter_mut() {
            f(&self.state);
        }
    }

    // ---- Examine ----

    pub fn examiner(&self) -> &Examiner {
        &self.examiner
    }

    fn examine_with(&mut self, f: impl FnOnce(&mut Examiner, usize)) {
        let was = self.examiner.is_examining();
        f(&mut self.examiner, self.state.turns.len());
        if was != self.examiner.is_examining() {
            self.reset_overlay();
        }
    }

    pub fn examine_first(&mut self) {
        self.examine_with(|ex, len| ex.first(len));
    }

    pub fn examine_prev(&mut self) {
        self.examine_with(|ex, len| ex.prev(len));
    }

    pub fn examine_next(&mut self) {
        self.examine_with(|ex, len| ex.next(len));
    }

    pub fn examine_last(&mut self) {
        self.examine_with(|ex, _| ex.last());
    }

    pub fn examine_goto(&mut self, n: usize) {
        self.examine_with(|ex, len| ex.goto(n, len));
    }

    /// The state at the examine cursor; the live state when not examining.
    pub fn examined_state(&self) -> Result<GameState, ReduceError> {
        self.examiner.derived_state(&self.state)
    }

    // ---- Overlay ----

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    fn check_live(&self) -> Result<(), OverlayError> {
        if self.examiner.is_examining() {
            return Err(OverlayError::Examining);
        }
        Ok(())
    }

    fn check_on_turn(&self) -> Result<(), OverlayError> {
        self.check_live()?;
        match self.my_index() {
            Some(me) if self.state.on_turn == Some(me) => Ok(()),
            _ => Err(OverlayError::NotOnTurn),
        }
    }

    pub fn place(&mut self, letter: Letter, row: usize, col: usize) -> Result<(), OverlayError> {
        self.check_live()?;
        self.overlay.place(letter, row, col, &self.state)
    }

    pub fn remove(&mut self, row: usize, col: usize) {
        self.overlay.remove(row, col);
    }

    /// Return tentative tiles to the rack. With nothing pending, gaps left by
    /// an unanswered commit are refilled from the canonical rack.
    pub fn recall(&mut self) {
        if self.overlay.has_orphaned_gaps() {
            self.reset_overlay();
        } else {
            self.overlay.recall();
        }
    }

    /// Throw the overlay away and rebuild it from the canonical rack.
    pub fn reset_overlay(&mut self) {
        let rack = self.my_rack();
        self.overlay.reset(&rack);
    }

    pub fn designate_blank(&mut self, as_letter: Letter) -> Result<(), OverlayError> {
        self.overlay.designate_blank(as_letter, self.state.alphabet)
    }

    pub fn click(&mut self, row: usize, col: usize) {
        if !self.examiner.is_examining() {
            self.overlay.click(row, col);
        }
    }

    pub fn type_letter(&mut self, letter: Letter) -> Result<(), OverlayError> {
        self.check_live()?;
        self.overlay.type_letter(letter, &self.state)
    }

    pub fn backspace(&mut self) {
        if !self.examiner.is_examining() {
            self.overlay.backspace(&self.state);
        }
    }

    /// Score of the tentative move.
    pub fn tentative_score(&self) -> Option<i32> {
        self.overlay.score(&self.state, self.config.bingo_bonus, self.config.rack_size)
    }

    /// Send the tentative move.
    pub fn commit(&mut self) -> Result<(), OverlayError> {
        self.check_on_turn()?;
        let action = self.overlay.commit(&self.state)?;
        self.outbound.push(action);
        Ok(())
    }

    pub fn exchange(&mut self, letters: &[Letter]) -> Result<(), OverlayError> {
        self.check_on_turn()?;
        let action = overlay::exchange(&self.state, &self.my_rack(), letters)?;
        self.outbound.push(action);
        Ok(())
    }

    pub fn pass(&mut self) -> Result<(), OverlayError> {
        self.check_on_turn()?;
        self.outbound.push(overlay::pass(&self.state));
        Ok(())
    }

    pub fn challenge(&mut self) -> Result<(), OverlayError> {
        self.check_on_turn()?;
        self.outbound.push(overlay::challenge(&self.state));
        Ok(())
    }

    // ---- Clock ----

    fn sync_clock(&mut self, now: f64) {
        let players = &self.state.players;
        if players.len() != 2 {
            return;
        }
        let times = Times {
            millis: [players[0].time_millis, players[1].time_millis],
            time_bank: [players[0].time_bank_millis, players[1].time_bank_millis],
            using_time_bank: [false, false],
            active: self.state.on_turn,
            last_update: now,
        };
        self.clock.set_clock(self.state.play_state, times, now, 0);
    }

    /// Re-seed only the players whose server snapshot changed, so the
    /// running clock keeps counting from its own snapshot time.
    fn refresh_clock(&mut self, prior: &[(i64, Option<i64>)], now: f64) {
        for (i, p) in self.state.players.iter().enumerate() {
            if prior.get(i) != Some(&(p.time_millis, p.time_bank_millis)) {
                self.clock.set_player_time(i, p.time_millis, p.time_bank_millis, now);
            }
        }
    }

    pub fn remaining_millis(&self, player: usize, now: f64) -> i64 {
        self.clock.millis_of(player, now)
    }

    /// Sample the clock. A local timeout is reported to the server once.
    pub fn clock_tick(&mut self, now: f64) -> ClockTick {
        let tick = self.clock.tick(now);
        if let ClockTick::TimedOut { player } = tick {
            if let Some(p) = self.state.players.get(player) {
                log::info!("{}: {} ran out of time", self.state.game_id, p.nickname);
                self.outbound.push(OutboundAction::TimedOut {
                    game_id: self.state.game_id.clone(),
                    user_id: p.user_id.clone(),
                });
            }
        }
        tick
    }

    /// Sample the clock into the packed form the page reads each frame.
    pub fn clock_readout(&mut self, now: f64) -> ClockReadout {
        let tick = self.clock_tick(now);
        let displayed = [self.clock.millis_of(0, now), self.clock.millis_of(1, now)];
        ClockReadout::new(self.clock.times(), tick, displayed)
    }

    // ---- Meta events ----

    pub fn meta(&self) -> &MetaMachine {
        &self.meta
    }

    pub fn meta_accept(&mut self) -> Result<(), MetaError> {
        let evt = self.meta.accept(&self.state.game_id)?;
        self.outbound.push(OutboundAction::Meta(evt));
        Ok(())
    }

    pub fn meta_decline(&mut self) -> Result<(), MetaError> {
        let evt = self.meta.decline(&self.state.game_id)?;
        self.outbound.push(OutboundAction::Meta(evt));
        Ok(())
    }

    /// Ask to cancel the game or nudge the opponent.
    pub fn meta_request(&mut self, kind: MetaEventType) -> Result<(), MetaError> {
        let evt = self.meta.open(&self.state.game_id, kind)?;
        self.outbound.push(OutboundAction::Meta(evt));
        Ok(())
    }

    /// Expire an open request whose countdown has run out.
    pub fn meta_poll(&mut self, now: f64) {
        if let Some(evt) = self.meta.poll(&self.state.game_id, now) {
            self.outbound.push(OutboundAction::Meta(evt));
        }
    }

    // ---- Output ----

    pub fn drain_outbound(&mut self) -> Vec<OutboundAction> {
        std::mem::take(&mut self.outbound)
    }

    pub fn drain_notices(&mut self) -> Vec<MetaNotice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::meta::MetaState;
    use crate::protocol::{GameHistory, PlayState, PlayerInfo, Turn, TurnKind};
    use crate::tiles::alphabet::ENGLISH;

    fn config() -> SessionConfig {
        SessionConfig { me: Some("a".into()), ..Default::default() }
    }

    fn refresher(events: Vec<Turn>) -> ServerMessage {
        ServerMessage::GameHistoryRefresher {
            history: GameHistory {
                game_id: "g".into(),
                players: vec![
                    PlayerInfo { user_id: "a".into(), nickname: "alice".into() },
                    PlayerInfo { user_id: "b".into(), nickname: "bob".into() },
                ],
                events,
                last_known_racks: vec![ENGLISH.letters("CARESXY").unwrap(), vec![]],
                ..Default::default()
            },
            time_player1: 60_000,
            time_player2: 60_000,
            time_bank_player1: 0,
            time_bank_player2: 0,
            max_overtime_minutes: 0,
        }
    }

    fn pass_event(player: usize, turn_index: Option<usize>) -> ServerMessage {
        ServerMessage::ServerGameplayEvent {
            game_id: "g".into(),
            event: Turn { kind: TurnKind::Pass, player_index: player, ..Default::default() },
            new_rack: vec![],
            time_remaining: 55_000,
            time_bank: None,
            playing: PlayState::Playing,
            turn_index,
        }
    }

    fn started() -> GameSession {
        let mut s = GameSession::new("g", config());
        s.handle(&refresher(vec![]), 0.0).unwrap();
        s
    }

    #[test]
    fn subscribers_see_accepted_changes_only() {
        let mut s = GameSession::new("g", config());
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let id = s.subscribe(move |_| seen.set(seen.get() + 1));

        s.handle(&refresher(vec![]), 0.0).unwrap();
        assert_eq!(calls.get(), 1);
        let wrong = ServerMessage::TimeUpdate { game_id: "other".into(), player_index: 0, time_remaining: 1 };
        assert!(s.handle(&wrong, 0.0).is_err());
        assert_eq!(calls.get(), 1);

        assert!(s.unsubscribe(id));
        s.handle(&pass_event(0, None), 0.0).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn empty_refresher_after_the_first_is_ignored() {
        let mut s = started();
        s.handle(&pass_event(0, None), 0.0).unwrap();
        s.handle(&refresher(vec![]), 0.0).unwrap();
        assert_eq!(s.state().turns.len(), 1);
    }

    #[test]
    fn desync_requests_a_resync_once() {
        let mut s = started();
        assert!(s.handle(&pass_event(0, Some(4)), 0.0).is_err());
        assert!(s.handle(&pass_event(0, Some(4)), 0.0).is_err());
        assert!(s.needs_resync());
        assert_eq!(s.drain_outbound(), vec![OutboundAction::RequestResync { game_id: "g".into() }]);
        s.handle(&refresher(vec![Turn { kind: TurnKind::Pass, ..Default::default() }]), 0.0).unwrap();
        assert!(!s.needs_resync());
    }

    #[test]
    fn overlay_is_cleared_when_a_turn_lands() {
        let mut s = started();
        s.place(ENGLISH.letter('C').unwrap(), 7, 7).unwrap();
        assert!(!s.overlay().is_empty());
        s.handle(&ServerMessage::TimeUpdate { game_id: "g".into(), player_index: 1, time_remaining: 10 }, 0.0)
            .unwrap();
        assert!(!s.overlay().is_empty());
        s.handle(&pass_event(0, None), 0.0).unwrap();
        assert!(s.overlay().is_empty());
        assert_eq!(s.overlay().rack(), ENGLISH.letters("CARESXY").unwrap().as_slice());
    }

    #[test]
    fn examining_blocks_placement_and_clears_overlay() {
        let mut s = started();
        s.handle(&pass_event(0, None), 0.0).unwrap();
        s.handle(&pass_event(1, None), 0.0).unwrap();
        s.place(ENGLISH.letter('C').unwrap(), 7, 7).unwrap();
        s.examine_prev();
        assert!(s.overlay().is_empty());
        assert_eq!(s.place(ENGLISH.letter('C').unwrap(), 7, 7), Err(OverlayError::Examining));
        assert_eq!(s.examined_state().unwrap().turns.len(), 1);
        s.examine_last();
        assert!(s.place(ENGLISH.letter('C').unwrap(), 7, 7).is_ok());
    }

    #[test]
    fn commit_needs_the_turn() {
        let mut s = started();
        for (i, c) in "CARES".chars().enumerate() {
            s.place(ENGLISH.letter(c).unwrap(), 7, 7 + i).unwrap();
        }
        assert_eq!(s.tentative_score(), Some(16));
        s.commit().unwrap();
        assert!(matches!(s.drain_outbound().as_slice(), [OutboundAction::PlaceTiles { .. }]));

        s.handle(&pass_event(0, None), 0.0).unwrap();
        assert_eq!(s.pass(), Err(OverlayError::NotOnTurn));
    }

    #[test]
    fn unanswered_commit_can_be_recalled() {
        let mut s = started();
        for (i, c) in "CARES".chars().enumerate() {
            s.place(ENGLISH.letter(c).unwrap(), 7, 7 + i).unwrap();
        }
        s.commit().unwrap();
        assert!(s.overlay().rack().contains(&Letter::EMPTY_RACK_SLOT));

        s.recall();
        assert_eq!(s.overlay().rack(), ENGLISH.letters("CARESXY").unwrap().as_slice());
        assert!(s.place(ENGLISH.letter('C').unwrap(), 7, 7).is_ok());

        s.reset_overlay();
        assert!(s.overlay().is_empty());
        assert_eq!(s.overlay().rack(), ENGLISH.letters("CARESXY").unwrap().as_slice());
    }

    #[test]
    fn clock_runs_for_the_player_on_turn() {
        let mut s = started();
        assert_eq!(s.remaining_millis(0, 5_000.0), 55_000);
        assert_eq!(s.remaining_millis(1, 5_000.0), 60_000);
        let readout = s.clock_readout(5_000.0);
        assert_eq!(readout.active, 0.0);
        assert_eq!(readout.millis, [55_000.0, 60_000.0]);
    }

    #[test]
    fn idle_player_update_does_not_rewind_the_running_clock() {
        let mut s = started();
        let update = ServerMessage::TimeUpdate { game_id: "g".into(), player_index: 1, time_remaining: 58_000 };
        s.handle(&update, 20_000.0).unwrap();
        assert_eq!(s.remaining_millis(0, 20_000.0), 40_000);
        assert_eq!(s.remaining_millis(1, 20_000.0), 58_000);

        let upheld = ServerMessage::ServerChallengeResultEvent {
            game_id: "g".into(),
            valid: true,
            challenger: "b".into(),
            challenge_rule: Default::default(),
            time_remaining: None,
        };
        s.handle(&upheld, 30_000.0).unwrap();
        assert_eq!(s.remaining_millis(0, 30_000.0), 30_000);
    }

    #[test]
    fn running_player_update_restarts_from_the_new_snapshot() {
        let mut s = started();
        let update = ServerMessage::TimeUpdate { game_id: "g".into(), player_index: 0, time_remaining: 45_000 };
        s.handle(&update, 10_000.0).unwrap();
        assert_eq!(s.remaining_millis(0, 15_000.0), 40_000);
    }

    #[test]
    fn observers_cannot_answer_meta_requests() {
        let mut s = GameSession::new("g", SessionConfig::default());
        s.handle(&refresher(vec![]), 0.0).unwrap();
        let request = MetaEvent {
            game_id: "g".into(),
            event_type: MetaEventType::RequestAbort,
            orig_event_id: "m1".into(),
            player_id: "b".into(),
            expiry: 30_000,
        };
        s.handle(&ServerMessage::GameMetaEvent(request), 0.0).unwrap();
        assert_eq!(s.meta().state(), MetaState::NoActiveRequest);
        assert_eq!(s.meta_accept(), Err(MetaError::NotReceiver));
        assert_eq!(s.meta_decline(), Err(MetaError::NotReceiver));
        assert_eq!(s.meta_request(MetaEventType::RequestAbort), Err(MetaError::NotReceiver));
        s.meta_poll(60_000.0);
        assert!(s.drain_outbound().is_empty());
    }

    #[test]
    fn local_timeout_is_reported() {
        let mut s = started();
        assert_eq!(s.clock_tick(61_000.0), ClockTick::TimedOut { player: 0 });
        assert_eq!(
            s.drain_outbound(),
            vec![OutboundAction::TimedOut { game_id: "g".into(), user_id: "a".into() }]
        );
        assert_eq!(s.clock_tick(62_000.0), ClockTick::Stopped);
    }

    #[test]
    fn meta_requests_are_answered_through_the_outbound_queue() {
        let mut s = started();
        let request = MetaEvent {
            game_id: "g".into(),
            event_type: MetaEventType::RequestAbort,
            orig_event_id: "m1".into(),
            player_id: "b".into(),
            expiry: 30_000,
        };
        s.handle(&ServerMessage::GameMetaEvent(request), 0.0).unwrap();
        assert_eq!(s.meta().state(), MetaState::ReceiverAbortCountdown);
        s.meta_decline().unwrap();
        match s.drain_outbound().as_slice() {
            [OutboundAction::Meta(evt)] => assert_eq!(evt.event_type, MetaEventType::AbortDenied),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(s.meta_accept(), Err(MetaError::NoActiveRequest));
    }

    #[test]
    fn switch_game_starts_over_but_keeps_subscribers() {
        let mut s = started();
        s.handle(&pass_event(0, None), 0.0).unwrap();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        s.subscribe(move |_| seen.set(seen.get() + 1));

        s.switch_game("h");
        assert_eq!(s.game_id(), "h");
        assert!(s.state().turns.is_empty());
        assert_eq!(calls.get(), 1);
        assert!(s.handle(&pass_event(0, None), 0.0).is_err());
    }
}
