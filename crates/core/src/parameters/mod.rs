//! Tunable parameters
//!
//! Timing values for maneuvers are tuning parameters, not structure, so they
//! live here as named fields instead of inline constants.

pub mod error;
pub mod follower;

pub use error::ParameterError;
pub use follower::FollowerParams;
