//! Inbound coordinator commands
//!
//! Decoding happens in two steps. The JSON line is first deserialized into
//! a [`RawCommand`] where every field is optional, so a well-formed line
//! never fails for lack of a field. [`Command::try_from`] then checks the
//! discriminator and the fields each command requires, producing a
//! [`CommandError`] that becomes a FAIL response.
//!
//! | `cmd`    | Fields                                    |
//! |----------|-------------------------------------------|
//! | `MOVE`   | `path` (digit code) or `target_node`      |
//! | `TASK`   | `action`, optional `count` (default 1)    |
//! | `MANUAL` | `device`, `state` (`ON`/`OFF`)            |

use core::fmt;

use heapless::String;
use serde::Deserialize;

use super::{bounded, de, Field};

/// Capacity of a path code on the wire
///
/// Larger than the path capacity so an over-long route still decodes and
/// can be rejected by length. Longer codes are cut to this capacity.
pub const PATH_CODE_LEN: usize = 128;

/// Path code as received on the wire
pub type PathCode = String<PATH_CODE_LEN>;

/// Command line with every field optional
///
/// Unknown fields are ignored, so coordinator extensions (e.g.
/// `actuator_id`) do not break decoding.
/// Text values longer than their capacity are truncated, and a `count`
/// that is not a non-negative integer is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawCommand {
    #[serde(default, deserialize_with = "de::bounded_text")]
    pub cmd: Option<Field>,
    #[serde(default, deserialize_with = "de::bounded_text")]
    pub path: Option<PathCode>,
    #[serde(default, deserialize_with = "de::bounded_text")]
    pub target_node: Option<Field>,
    #[serde(default, deserialize_with = "de::bounded_text")]
    pub action: Option<Field>,
    #[serde(default, deserialize_with = "de::lenient_count")]
    pub count: Option<u32>,
    #[serde(default, deserialize_with = "de::bounded_text")]
    pub device: Option<Field>,
    #[serde(default, deserialize_with = "de::bounded_text")]
    pub state: Option<Field>,
}

/// Requested state of an auxiliary device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    On,
    Off,
}

impl DeviceState {
    /// Parse `ON`/`OFF`, ignoring ASCII case
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("ON") {
            Some(Self::On)
        } else if text.eq_ignore_ascii_case("OFF") {
            Some(Self::Off)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

/// Validated coordinator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Follow a pre-computed path code
    MoveByPath { path: PathCode },
    /// Navigate to a node by id
    MoveToNode { target_node: Field },
    /// Run an actuator task `count` times
    Task { action: Field, count: u32 },
    /// Switch an auxiliary device
    Manual { device: Field, state: DeviceState },
}

impl Command {
    /// Wire name of the command type
    pub fn name(&self) -> &'static str {
        match self {
            Command::MoveByPath { .. } | Command::MoveToNode { .. } => "MOVE",
            Command::Task { .. } => "TASK",
            Command::Manual { .. } => "MANUAL",
        }
    }
}

/// Reasons a decoded line is not a valid command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// No `cmd` discriminator
    MissingCommand,
    /// `cmd` names a command this robot does not know
    UnknownCommand(Field),
    /// `MOVE` without `path` or `target_node`
    MissingPathOrTarget,
    /// A required field is absent
    MissingField(&'static str),
    /// `MANUAL` state other than ON/OFF
    InvalidDeviceState(Field),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MissingCommand => write!(f, "missing cmd field"),
            CommandError::UnknownCommand(name) => write!(f, "unknown command: {}", name),
            CommandError::MissingPathOrTarget => write!(f, "missing path or target field"),
            CommandError::MissingField(name) => write!(f, "missing {} field", name),
            CommandError::InvalidDeviceState(state) => {
                write!(f, "invalid device state: {}", state)
            }
        }
    }
}

impl TryFrom<RawCommand> for Command {
    type Error = CommandError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        let cmd = raw.cmd.ok_or(CommandError::MissingCommand)?;

        match cmd.as_str() {
            "MOVE" => {
                if let Some(path) = raw.path {
                    Ok(Command::MoveByPath { path })
                } else if let Some(target_node) = raw.target_node {
                    Ok(Command::MoveToNode { target_node })
                } else {
                    Err(CommandError::MissingPathOrTarget)
                }
            }
            "TASK" => {
                let action = raw.action.ok_or(CommandError::MissingField("action"))?;
                Ok(Command::Task {
                    action,
                    count: raw.count.unwrap_or(1),
                })
            }
            "MANUAL" => {
                let device = raw.device.ok_or(CommandError::MissingField("device"))?;
                let state = raw.state.ok_or(CommandError::MissingField("state"))?;
                let state = DeviceState::parse(&state)
                    .ok_or_else(|| CommandError::InvalidDeviceState(bounded(&state)))?;
                Ok(Command::Manual { device, state })
            }
            _ => Err(CommandError::UnknownCommand(cmd)),
        }
    }
}
