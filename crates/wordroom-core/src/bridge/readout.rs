//! Packed clock state read by JavaScript straight out of wasm memory.
//!
//! Layout (all values `f64`, must stay in sync with the page's reader):
//! ```text
//! [0] version
//! [1] active player, -1 when no clock runs
//! [2] player 0 displayed millis
//! [3] player 1 displayed millis
//! [4] player 0 on time bank (0/1)
//! [5] player 1 on time bank (0/1)
//! [6] millis until the display next changes, 0 when stopped
//! [7] player whose clock just ran out, -1 otherwise
//! ```

use bytemuck::{Pod, Zeroable};

use crate::clock::{ClockTick, Times};

/// Readout layout version.
pub const READOUT_VERSION: f64 = 1.0;

/// Number of `f64` slots in a [`ClockReadout`].
pub const READOUT_FLOATS: usize = 8;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ClockReadout {
    pub version: f64,
    pub active: f64,
    pub millis: [f64; 2],
    pub using_time_bank: [f64; 2],
    pub next_delay: f64,
    pub timed_out: f64,
}

impl ClockReadout {
    /// Build a readout from one clock sample. `displayed` is what each
    /// player's clock should show right now.
    pub fn new(times: &Times, tick: ClockTick, displayed: [i64; 2]) -> Self {
        let (next_delay, timed_out) = match tick {
            ClockTick::Running { next_delay, .. } => (next_delay as f64, -1.0),
            ClockTick::TimedOut { player } => (0.0, player as f64),
            ClockTick::Stopped => (0.0, -1.0),
        };
        Self {
            version: READOUT_VERSION,
            active: times.active.map_or(-1.0, |p| p as f64),
            millis: [displayed[0] as f64, displayed[1] as f64],
            using_time_bank: times.using_time_bank.map(|b| if b { 1.0 } else { 0.0 }),
            next_delay,
            timed_out,
        }
    }

    pub fn as_floats(&self) -> &[f64] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_is_flat_f64s() {
        assert_eq!(std::mem::size_of::<ClockReadout>(), READOUT_FLOATS * 8);
    }

    #[test]
    fn running_clock_fills_every_slot() {
        let times = Times { active: Some(1), using_time_bank: [false, true], ..Default::default() };
        let tick = ClockTick::Running { player: 1, millis: 5_000, next_delay: 100 };
        let readout = ClockReadout::new(&times, tick, [60_000, 5_000]);
        assert_eq!(readout.as_floats(), &[1.0, 1.0, 60_000.0, 5_000.0, 0.0, 1.0, 100.0, -1.0]);
    }

    #[test]
    fn timeout_is_reported_with_the_player() {
        let readout = ClockReadout::new(&Times::default(), ClockTick::TimedOut { player: 0 }, [0, 0]);
        assert_eq!(readout.active, -1.0);
        assert_eq!(readout.timed_out, 0.0);
    }
}
