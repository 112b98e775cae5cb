//! line_rover - Line-following robot firmware
//!
//! Host firmware built on [`line_rover_core`]. It owns the path follower
//! state machine, the newline-delimited JSON command channel, the UDP
//! telemetry channel and the cooperative control loop that ties them
//! together.
//!
//! # Modules
//!
//! - [`rover`]: Path follower state machine
//! - [`communication`]: Command dispatch, telemetry and transports
//! - [`platform`]: Clock and simulated robot backend
//! - [`runtime`]: One-cycle-at-a-time control loop
//! - [`config`]: Environment-driven robot configuration
//! - [`error`]: Firmware error types

pub mod logging;

pub mod communication;
pub mod config;
pub mod error;
pub mod platform;
pub mod rover;
pub mod runtime;

pub use config::RobotConfig;
pub use error::{Result, RoverError};
