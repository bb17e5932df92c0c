use wordroom_core::{
    ClockReadout, GameSession, Letter, MetaEventType, OverlayError, SessionConfig, SessionError,
    READOUT_FLOATS,
};

/// Owns one [`GameSession`] plus the buffers JavaScript reads directly
/// from wasm memory.
pub struct SessionRunner {
    session: GameSession,
    /// Heap slot for the last clock sample so its address survives moves.
    readout: Vec<f64>,
}

impl SessionRunner {
    pub fn new(game_id: &str, config: SessionConfig) -> Self {
        Self {
            session: GameSession::new(game_id, config),
            readout: vec![0.0; READOUT_FLOATS],
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    /// Feed one server message. Rejections are logged by the session and
    /// returned so the page can decide whether to surface them.
    pub fn handle_json(&mut self, json: &str, now: f64) -> Result<(), SessionError> {
        self.session.handle_json(json, now)
    }

    pub fn state_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.session.state())
    }

    pub fn examined_state_json(&self) -> Result<String, SessionError> {
        let state = self.session.examined_state()?;
        Ok(serde_json::to_string(&state)?)
    }

    pub fn overlay_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.session.overlay())
    }

    pub fn place(&mut self, letter: u8, row: usize, col: usize) -> Result<(), OverlayError> {
        self.session.place(Letter(letter), row, col)
    }

    pub fn exchange(&mut self, letters: &[u8]) -> Result<(), OverlayError> {
        let letters: Vec<Letter> = letters.iter().copied().map(Letter).collect();
        self.session.exchange(&letters)
    }

    /// Sample the clock and the meta countdown at `now`, refreshing the
    /// readout buffer.
    pub fn sample_clock(&mut self, now: f64) {
        self.session.meta_poll(now);
        let readout: ClockReadout = self.session.clock_readout(now);
        self.readout.copy_from_slice(readout.as_floats());
    }

    pub fn readout_ptr(&self) -> *const f64 {
        self.readout.as_ptr()
    }

    pub fn readout(&self) -> &[f64] {
        &self.readout
    }

    pub fn meta_request(&mut self, adjudicate: bool) -> Result<(), wordroom_core::MetaError> {
        let kind = if adjudicate {
            MetaEventType::RequestAdjudication
        } else {
            MetaEventType::RequestAbort
        };
        self.session.meta_request(kind)
    }

    pub fn drain_outbound_json(&mut self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.session.drain_outbound())
    }

    pub fn drain_notices_json(&mut self) -> Result<String, serde_json::Error> {
        let notices: Vec<String> = self.session.drain_notices().into_iter().map(|n| n.0).collect();
        serde_json::to_string(&notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = r#"{
        "type": "game_history_refresher",
        "history": {
            "game_id": "g1",
            "players": [
                {"user_id": "u1", "nickname": "alice"},
                {"user_id": "u2", "nickname": "bob"}
            ],
            "last_known_racks": [[1, 3, 5, 18, 19, 0, 0], []],
            "events": []
        },
        "time_player1": 60000,
        "time_player2": 60000
    }"#;

    fn runner() -> SessionRunner {
        let config = SessionConfig::from_json(r#"{"me": "u1"}"#).unwrap();
        SessionRunner::new("g1", config)
    }

    #[test]
    fn readout_is_written_on_sample() {
        let mut r = runner();
        r.handle_json(HISTORY, 0.0).unwrap();
        r.sample_clock(1_000.0);
        assert_eq!(r.readout()[0], wordroom_core::bridge::readout::READOUT_VERSION);
        assert_eq!(r.readout()[1], 0.0);
        assert_eq!(r.readout()[2], 59_000.0);
    }

    #[test]
    fn state_json_reports_players() {
        let mut r = runner();
        r.handle_json(HISTORY, 0.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&r.state_json().unwrap()).unwrap();
        assert_eq!(value["players"][0]["nickname"], "alice");
    }

    #[test]
    fn pass_lands_in_outbound_queue() {
        let mut r = runner();
        r.handle_json(HISTORY, 0.0).unwrap();
        r.session_mut().pass().unwrap();
        let json = r.drain_outbound_json().unwrap();
        assert!(json.contains(r#""type":"pass""#));
        assert_eq!(r.drain_outbound_json().unwrap(), "[]");
    }

    #[test]
    fn reset_restores_the_rack_after_an_unanswered_commit() {
        let mut r = runner();
        r.handle_json(HISTORY, 0.0).unwrap();
        r.place(3, 7, 7).unwrap();
        r.place(1, 7, 8).unwrap();
        r.session_mut().commit().unwrap();
        assert!(r.session().overlay().rack().contains(&Letter::EMPTY_RACK_SLOT));

        r.session_mut().reset_overlay();
        let rack: Vec<u8> = r.session().overlay().rack().iter().map(|l| l.0).collect();
        assert_eq!(rack, vec![1, 3, 5, 18, 19, 0, 0]);
    }
}
