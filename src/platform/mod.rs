//! Platform layer
//!
//! Host implementations of the core hardware seams:
//!
//! - [`StdTime`]: monotonic clock backed by `std::time::Instant`
//! - [`SimulatedRobot`]: scripted line sensor plus recording drive, used
//!   by the demo binary and by tests in place of GPIO

pub mod sim;
pub mod time;

pub use sim::{DriveAction, SimulatedRobot, ACTION_HISTORY};
pub use time::StdTime;
