//! Robot state report carried by the datagram channel

use heapless::String;
use serde::Serialize;

use super::{bounded, Field};
use crate::follower::{FollowerStatus, NODE_LABEL_LEN};
use crate::sensors::CHANNEL_COUNT;

/// Highest battery percentage a report carries
pub const BATTERY_MAX: u8 = 100;

/// Report discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
    #[serde(rename = "ROBOT_STATE")]
    RobotState,
}

/// One telemetry datagram
///
/// Field order matches the wire layout:
/// `type, robot_id, pos_x, pos_y, battery, state, node, sensors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotStateReport {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub robot_id: Field,
    pub pos_x: i32,
    pub pos_y: i32,
    pub battery: u8,
    pub state: u8,
    pub node: String<NODE_LABEL_LEN>,
    pub sensors: [u8; CHANNEL_COUNT],
}

impl RobotStateReport {
    /// Package identity, pose and battery with the follower's status
    ///
    /// Battery readings above 100 are clamped.
    pub fn new(robot_id: &str, pos: (i32, i32), battery: u8, status: &FollowerStatus) -> Self {
        Self {
            kind: ReportKind::RobotState,
            robot_id: bounded(robot_id),
            pos_x: pos.0,
            pos_y: pos.1,
            battery: battery.min(BATTERY_MAX),
            state: status.state.code(),
            node: bounded(status.node.as_str()),
            sensors: status.sensors.levels(),
        }
    }
}
