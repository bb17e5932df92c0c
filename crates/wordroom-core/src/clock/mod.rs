pub mod controller;
pub mod format;

pub use controller::{next_tick_delay, ClockController, ClockTick, Times};
pub use format::format_millis;

/// Remaining time to display for a clock last reported as `last_known` at
/// `snapshot_at`. A running clock counts down from the snapshot; the
/// result never goes below zero.
pub fn current_remaining(last_known: i64, snapshot_at: f64, running: bool, now: f64) -> i64 {
    let elapsed = if running { (now - snapshot_at).max(0.0).floor() as i64 } else { 0 };
    (last_known - elapsed).max(0)
}
