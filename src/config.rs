//! Robot configuration
//!
//! Layered with the `config` crate: defaults, then an optional TOML file,
//! then `ROVER_*` environment variables. Nested keys use `__` in variable
//! names.
//!
//! # Variables
//!
//! - `ROVER_ROBOT_ID` - Identity carried in telemetry (default `R01`)
//! - `ROVER_SERVER_HOST` - Coordinator host (default `127.0.0.1`)
//! - `ROVER_COMMAND_PORT` - Coordinator TCP port (default 8000)
//! - `ROVER_TELEMETRY_PORT` - Coordinator UDP port (default 9000)
//! - `ROVER_TELEMETRY_HZ` - State reports per second, 0 disables (default 2)
//! - `ROVER_CYCLE_MS` - Control loop period (default 10)
//! - `ROVER_FOLLOWER__SETTLE_MS`, `ROVER_FOLLOWER__CLEAR_MS`,
//!   `ROVER_FOLLOWER__PIVOT_MS`, `ROVER_FOLLOWER__STRAIGHT_MS`,
//!   `ROVER_FOLLOWER__REACQUIRE_TIMEOUT_MS` - Follower timing
//! - `ROVER_POS_X`, `ROVER_POS_Y` - Reported position
//! - `ROVER_BATTERY` - Reported battery percentage, 0-100 (default 100)
//!
//! The same keys work in the file, with follower timing under
//! `[follower]`:
//!
//! ```toml
//! robot_id = "R07"
//! server_host = "192.168.0.10"
//!
//! [follower]
//! pivot_ms = 300
//! ```

use std::collections::HashMap;
use std::path::Path;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use line_rover_core::parameters::FollowerParams;
use serde::Deserialize;

use crate::error::{Result, RoverError};

const ENV_PREFIX: &str = "ROVER";
const ENV_SEPARATOR: &str = "__";

const DEFAULT_ROBOT_ID: &str = "R01";
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_COMMAND_PORT: u16 = 8000;
const DEFAULT_TELEMETRY_PORT: u16 = 9000;
const DEFAULT_TELEMETRY_HZ: u32 = 2;
const DEFAULT_CYCLE_MS: u64 = 10;
const DEFAULT_BATTERY: u8 = 100;

const MAX_ROBOT_ID_LEN: usize = line_rover_core::protocol::FIELD_LEN;
const MAX_TELEMETRY_HZ: u32 = 50;

/// Everything the firmware needs to come up
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub robot_id: String,
    pub server_host: String,
    pub command_port: u16,
    pub telemetry_port: u16,
    pub telemetry_hz: u32,
    pub cycle_ms: u64,
    pub follower: FollowerParams,
    pub pos_x: i32,
    pub pos_y: i32,
    pub battery: u8,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            robot_id: DEFAULT_ROBOT_ID.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            command_port: DEFAULT_COMMAND_PORT,
            telemetry_port: DEFAULT_TELEMETRY_PORT,
            telemetry_hz: DEFAULT_TELEMETRY_HZ,
            cycle_ms: DEFAULT_CYCLE_MS,
            follower: FollowerParams::default(),
            pos_x: 0,
            pos_y: 0,
            battery: DEFAULT_BATTERY,
        }
    }
}

impl RobotConfig {
    /// Load from the process environment only
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load from an optional TOML file overlaid by the process environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        Self::from_builder(builder.add_source(environment()))
    }

    /// Load from an explicit variable map instead of the process
    /// environment
    ///
    /// Keys are full variable names, e.g. `ROVER_COMMAND_PORT`.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::from_builder(config::Config::builder().add_source(environment().source(Some(vars))))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.robot_id.is_empty() || self.robot_id.len() > MAX_ROBOT_ID_LEN {
            return Err(RoverError::InvalidConfig(format!(
                "ROVER_ROBOT_ID must be 1-{} bytes",
                MAX_ROBOT_ID_LEN
            )));
        }
        if self.server_host.is_empty() {
            return Err(RoverError::InvalidConfig(
                "ROVER_SERVER_HOST must not be empty".into(),
            ));
        }
        if self.battery > 100 {
            return Err(RoverError::InvalidConfig(format!(
                "ROVER_BATTERY = {} is outside 0-100",
                self.battery
            )));
        }
        if self.telemetry_hz > MAX_TELEMETRY_HZ {
            return Err(RoverError::InvalidConfig(format!(
                "ROVER_TELEMETRY_HZ = {} exceeds {}",
                self.telemetry_hz, MAX_TELEMETRY_HZ
            )));
        }
        if self.cycle_ms == 0 {
            return Err(RoverError::InvalidConfig(
                "ROVER_CYCLE_MS must be at least 1".into(),
            ));
        }
        self.follower.validate()?;
        Ok(())
    }

    /// `host:port` of the command channel
    pub fn command_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.command_port)
    }

    /// `host:port` telemetry datagrams are sent to
    pub fn telemetry_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.telemetry_port)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .ignore_empty(true)
}
