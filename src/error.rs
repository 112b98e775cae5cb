//! Firmware error types

use line_rover_core::parameters::ParameterError;

use crate::communication::transport::TransportError;

/// Errors surfaced by firmware setup and the command channel
///
/// Protocol-level problems (bad JSON, missing fields, unknown commands)
/// never become a `RoverError`; they are answered with a FAIL response.
#[derive(Debug, thiserror::Error)]
pub enum RoverError {
    #[error("Connection to {addr} failed: {source}")]
    ConnectionFailed {
        addr: String,
        #[source]
        source: TransportError,
    },

    #[error("Not connected")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid follower parameter: {0}")]
    Parameter(ParameterError),

    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParameterError> for RoverError {
    fn from(err: ParameterError) -> Self {
        RoverError::Parameter(err)
    }
}

pub type Result<T> = std::result::Result<T, RoverError>;
