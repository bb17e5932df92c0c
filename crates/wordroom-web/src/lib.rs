//! Browser entry points for one live game session.
//!
//! The page owns the websocket and the animation frame loop. It feeds every
//! server message to [`session_handle`], calls [`clock_sample`] once per frame
//! and reads the packed clock readout at [`clock_readout_ptr`]. Everything
//! that must go back to the server is collected with [`drain_outbound_json`].

pub mod runner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wordroom_core::{format_millis, SessionConfig};

pub use runner::SessionRunner;

thread_local! {
    static RUNNER: RefCell<Option<SessionRunner>> = RefCell::new(None);
}

fn with_runner<R>(f: impl FnOnce(&mut SessionRunner) -> R) -> Result<R, JsError> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Ok(f(runner)),
            None => Err(JsError::new("session not initialized, call session_init() first")),
        }
    })
}

#[wasm_bindgen]
pub fn session_init(game_id: &str, config_json: &str) -> Result<(), JsError> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        SessionConfig::default()
    } else {
        SessionConfig::from_json(config_json)?
    };
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(SessionRunner::new(game_id, config));
    });
    log::info!("{}: session initialized", game_id);
    Ok(())
}

#[wasm_bindgen]
pub fn session_destroy() {
    RUNNER.with(|cell| {
        if let Some(runner) = cell.borrow_mut().take() {
            log::info!("{}: session destroyed", runner.session().game_id());
        }
    });
}

/// Returns false when the message was rejected; the reason is logged.
#[wasm_bindgen]
pub fn session_handle(message_json: &str, now: f64) -> Result<bool, JsError> {
    with_runner(|r| r.handle_json(message_json, now).is_ok())
}

#[wasm_bindgen]
pub fn session_switch_game(game_id: &str) -> Result<(), JsError> {
    with_runner(|r| r.session_mut().switch_game(game_id))
}

#[wasm_bindgen]
pub fn session_state_json() -> Result<String, JsError> {
    Ok(with_runner(|r| r.state_json())??)
}

#[wasm_bindgen]
pub fn session_examined_state_json() -> Result<String, JsError> {
    Ok(with_runner(|r| r.examined_state_json())??)
}

#[wasm_bindgen]
pub fn session_needs_resync() -> Result<bool, JsError> {
    with_runner(|r| r.session().needs_resync())
}

// ---- Examine ----

#[wasm_bindgen]
pub fn examine_first() -> Result<(), JsError> {
    with_runner(|r| r.session_mut().examine_first())
}

#[wasm_bindgen]
pub fn examine_prev() -> Result<(), JsError> {
    with_runner(|r| r.session_mut().examine_prev())
}

#[wasm_bindgen]
pub fn examine_next() -> Result<(), JsError> {
    with_runner(|r| r.session_mut().examine_next())
}

#[wasm_bindgen]
pub fn examine_last() -> Result<(), JsError> {
    with_runner(|r| r.session_mut().examine_last())
}

#[wasm_bindgen]
pub fn examine_goto(n: u32) -> Result<(), JsError> {
    with_runner(|r| r.session_mut().examine_goto(n as usize))
}

// ---- Tile overlay ----

#[wasm_bindgen]
pub fn overlay_place(letter: u8, row: u32, col: u32) -> Result<(), JsError> {
    Ok(with_runner(|r| r.place(letter, row as usize, col as usize))??)
}

#[wasm_bindgen]
pub fn overlay_remove(row: u32, col: u32) -> Result<(), JsError> {
    with_runner(|r| r.session_mut().remove(row as usize, col as usize))
}

#[wasm_bindgen]
pub fn overlay_recall() -> Result<(), JsError> {
    with_runner(|r| r.session_mut().recall())
}

/// Rebuild the overlay from the canonical rack, e.g. after a commit the
/// server never confirmed.
#[wasm_bindgen]
pub fn overlay_reset() -> Result<(), JsError> {
    with_runner(|r| r.session_mut().reset_overlay())
}

#[wasm_bindgen]
pub fn overlay_click(row: u32, col: u32) -> Result<(), JsError> {
    with_runner(|r| r.session_mut().click(row as usize, col as usize))
}

#[wasm_bindgen]
pub fn overlay_type(letter: u8) -> Result<(), JsError> {
    Ok(with_runner(|r| r.session_mut().type_letter(wordroom_core::Letter(letter)))??)
}

#[wasm_bindgen]
pub fn overlay_backspace() -> Result<(), JsError> {
    with_runner(|r| r.session_mut().backspace())
}

#[wasm_bindgen]
pub fn overlay_designate_blank(letter: u8) -> Result<(), JsError> {
    Ok(with_runner(|r| r.session_mut().designate_blank(wordroom_core::Letter(letter)))??)
}

/// Tentative score of the pending tiles, or -1 when they are not a legal play.
#[wasm_bindgen]
pub fn overlay_score() -> Result<i32, JsError> {
    with_runner(|r| r.session().tentative_score().unwrap_or(-1))
}

#[wasm_bindgen]
pub fn overlay_json() -> Result<String, JsError> {
    Ok(with_runner(|r| r.overlay_json())??)
}

#[wasm_bindgen]
pub fn overlay_commit() -> Result<(), JsError> {
    Ok(with_runner(|r| r.session_mut().commit())??)
}

#[wasm_bindgen]
pub fn overlay_exchange(letters: &[u8]) -> Result<(), JsError> {
    Ok(with_runner(|r| r.exchange(letters))??)
}

#[wasm_bindgen]
pub fn turn_pass() -> Result<(), JsError> {
    Ok(with_runner(|r| r.session_mut().pass())??)
}

#[wasm_bindgen]
pub fn turn_challenge() -> Result<(), JsError> {
    Ok(with_runner(|r| r.session_mut().challenge())??)
}

// ---- Clock ----

#[wasm_bindgen]
pub fn clock_sample(now: f64) -> Result<(), JsError> {
    with_runner(|r| r.sample_clock(now))
}

/// Null until `session_init` has run.
#[wasm_bindgen]
pub fn clock_readout_ptr() -> *const f64 {
    with_runner(|r| r.readout_ptr()).unwrap_or(std::ptr::null())
}

/// Copy of the readout for callers that do not map wasm memory.
#[wasm_bindgen]
pub fn clock_readout() -> Result<js_sys::Float64Array, JsError> {
    with_runner(|r| js_sys::Float64Array::from(r.readout()))
}

#[wasm_bindgen]
pub fn clock_remaining(player: u32, now: f64) -> Result<f64, JsError> {
    with_runner(|r| r.session().remaining_millis(player as usize, now) as f64)
}

#[wasm_bindgen]
pub fn format_clock(millis: f64, show_tenths: bool) -> String {
    format_millis(millis as i64, show_tenths)
}

// ---- Meta events ----

#[wasm_bindgen]
pub fn meta_accept(now: f64) -> Result<(), JsError> {
    Ok(with_runner(|r| {
        r.session_mut().meta_poll(now);
        r.session_mut().meta_accept()
    })??)
}

#[wasm_bindgen]
pub fn meta_decline(now: f64) -> Result<(), JsError> {
    Ok(with_runner(|r| {
        r.session_mut().meta_poll(now);
        r.session_mut().meta_decline()
    })??)
}

#[wasm_bindgen]
pub fn meta_request_abort() -> Result<(), JsError> {
    Ok(with_runner(|r| r.meta_request(false))??)
}

#[wasm_bindgen]
pub fn meta_request_adjudication() -> Result<(), JsError> {
    Ok(with_runner(|r| r.meta_request(true))??)
}

/// Milliseconds left on the open request, or -1 when none is open.
#[wasm_bindgen]
pub fn meta_remaining(now: f64) -> Result<f64, JsError> {
    with_runner(|r| r.session().meta().remaining(now).map_or(-1.0, |ms| ms as f64))
}

// ---- Output queues ----

#[wasm_bindgen]
pub fn drain_outbound_json() -> Result<String, JsError> {
    Ok(with_runner(|r| r.drain_outbound_json())??)
}

#[wasm_bindgen]
pub fn drain_notices_json() -> Result<String, JsError> {
    Ok(with_runner(|r| r.drain_notices_json())??)
}
