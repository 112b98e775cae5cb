//! Rover control logic
//!
//! - `follower`: line-following state machine that walks a turn path

pub mod follower;

pub use follower::LineFollower;
