//! Hardware seams for the line rover.
//!
//! The follower logic depends only on these traits, so the firmware can
//! plug in GPIO-backed drivers and tests can plug in scripted mocks.
//!
//! - [`TimeSource`]: monotonic clock used for maneuver timing
//! - [`Actuation`]: the drive primitives the follower issues
//! - [`LineSensor`]: five-channel line sensor read

pub mod drive;
pub mod time;

pub use drive::{Actuation, LineSensor};
pub use time::{MockTime, TimeSource};
