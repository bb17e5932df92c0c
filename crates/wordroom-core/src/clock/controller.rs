use serde::Serialize;

use super::format::{NEGATIVE_TENTHS_CUTOFF, POSITIVE_TENTHS_CUTOFF};
use crate::protocol::PlayState;

/// Clock snapshot for both players.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Times {
    /// Remaining main time (or bank time once `using_time_bank` is set).
    pub millis: [i64; 2],
    pub time_bank: [Option<i64>; 2],
    pub using_time_bank: [bool; 2],
    /// The player whose clock is running, if any.
    pub active: Option<usize>,
    /// Timestamp `millis[active]` was last valid at.
    pub last_update: f64,
}

/// Result of sampling the running clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    Stopped,
    Running {
        player: usize,
        millis: i64,
        /// Milliseconds until the displayed string next changes.
        next_delay: i64,
    },
    /// Main time, bank and overtime allowance are all used up. Reported
    /// once; the clock stops.
    TimedOut { player: usize },
}

/// Local countdown between server clock snapshots.
///
/// The server is authoritative: every snapshot replaces the local times
/// through [`ClockController::set_clock`]. The controller only counts down
/// the active player in between and moves them onto their time bank when
/// main time runs out.
#[derive(Debug, Clone, Default)]
pub struct ClockController {
    times: Times,
    max_overtime_minutes: u32,
}

impl ClockController {
    pub fn new(max_overtime_minutes: u32) -> Self {
        Self { times: Times::default(), max_overtime_minutes }
    }

    pub fn times(&self) -> &Times {
        &self.times
    }

    pub fn set_max_overtime(&mut self, minutes: u32) {
        self.max_overtime_minutes = minutes;
    }

    fn overtime_floor(&self) -> i64 {
        -(self.max_overtime_minutes as i64) * 60_000
    }

    /// Replace the clock with a server snapshot taken at `now`. The clock
    /// runs only while the game is not over; `delay_centis` holds the
    /// countdown back, e.g. for a move-transition animation.
    pub fn set_clock(&mut self, play_state: PlayState, times: Times, now: f64, delay_centis: i64) {
        let running = play_state != PlayState::GameOver;
        self.times = Times {
            active: if running { times.active } else { None },
            last_update: now + (delay_centis * 10) as f64,
            ..times
        };
    }

    /// Take a fresh snapshot for one player, leaving the other clock as it
    /// runs. Restarts the countdown only when `player` is the active one.
    pub fn set_player_time(&mut self, player: usize, millis: i64, time_bank: Option<i64>, now: f64) {
        if player >= self.times.millis.len() {
            return;
        }
        self.times.millis[player] = millis;
        self.times.time_bank[player] = time_bank;
        self.times.using_time_bank[player] = false;
        if self.times.active == Some(player) {
            self.times.last_update = now;
        }
    }

    /// Freeze the active clock at its current value. Returns the elapsed
    /// milliseconds, or `None` if nothing was running.
    pub fn stop_clock(&mut self, now: f64) -> Option<i64> {
        let p = self.times.active?;
        let elapsed = self.elapsed(now);
        self.times.millis[p] = (self.times.millis[p] - elapsed).max(self.overtime_floor());
        self.times.active = None;
        Some(elapsed)
    }

    fn elapsed(&self, now: f64) -> i64 {
        ((now - self.times.last_update).floor() as i64).max(self.overtime_floor())
    }

    /// Displayed remaining time of `player` at `now`, counting into the
    /// time bank when main time is exhausted.
    pub fn millis_of(&self, player: usize, now: f64) -> i64 {
        let Some(&stored) = self.times.millis.get(player) else {
            return 0;
        };
        if self.times.active != Some(player) {
            return stored;
        }
        let elapsed = self.elapsed(now);
        let millis = (stored - elapsed).max(self.overtime_floor());
        match self.times.time_bank[player] {
            Some(bank) if millis <= 0 && bank > 0 => {
                if self.times.using_time_bank[player] {
                    stored - elapsed
                } else {
                    bank + millis
                }
            }
            _ => millis,
        }
    }

    /// Sample the running clock, switching to the time bank when needed.
    pub fn tick(&mut self, now: f64) -> ClockTick {
        let Some(p) = self.times.active else {
            return ClockTick::Stopped;
        };
        let elapsed = self.elapsed(now);
        let floor = self.overtime_floor();
        let mut millis = (self.times.millis[p] - elapsed).max(floor);

        if self.times.using_time_bank[p] {
            millis = self.times.millis[p] - elapsed;
        } else if let Some(bank) = self.times.time_bank[p].filter(|b| *b > 0 && millis <= 0) {
            self.times.millis[p] = bank + millis;
            self.times.last_update = now;
            self.times.using_time_bank[p] = true;
            millis = self.times.millis[p];
            log::debug!("player {} is on their time bank", p);
        }

        if millis > floor {
            ClockTick::Running { player: p, millis, next_delay: next_tick_delay(millis) }
        } else {
            self.times.millis[p] = millis;
            self.times.active = None;
            ClockTick::TimedOut { player: p }
        }
    }
}

/// Milliseconds until [`super::format_millis`] would show something
/// different for a clock counting down from `millis`.
pub fn next_tick_delay(millis: i64) -> i64 {
    if millis.unsigned_abs() / 3_600_000 >= 24 {
        10_000
    } else if millis > POSITIVE_TENTHS_CUTOFF {
        ((millis + 999) % 1000 + 1).min(millis - POSITIVE_TENTHS_CUTOFF)
    } else if millis >= 0 {
        ((millis + 99) % 100 + 1).min(millis + 1)
    } else if millis > NEGATIVE_TENTHS_CUTOFF {
        (millis % 100 + 100).min(millis - NEGATIVE_TENTHS_CUTOFF)
    } else {
        millis % 1000 + 1000
    }
}
