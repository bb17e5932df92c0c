pub mod readout;

pub use readout::{ClockReadout, READOUT_FLOATS, READOUT_VERSION};
