//! Path follower state types
//!
//! Pure data types shared between the follower state machine (firmware
//! crate) and the telemetry layer.

use heapless::String;

use crate::sensors::SensorSnapshot;

/// Capacity of a node label ("arrived" is the longest fixed label)
pub const NODE_LABEL_LEN: usize = 8;

/// Follower state, derived from sensor pattern and maneuver phase
///
/// The discriminants are the state codes carried in telemetry and must not
/// be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FollowerState {
    #[default]
    Idle = 0,
    Forward = 1,
    SoftLeft = 2,
    SoftRight = 3,
    HardLeft = 4,
    HardRight = 5,
    IntersectionDetected = 6,
    ExecutingLeft = 7,
    ExecutingRight = 8,
    ExecutingUTurn = 9,
    PassingStraight = 10,
    Arrived = 11,
    LineLost = 12,
}

impl FollowerState {
    /// Telemetry state code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`code`](Self::code)
    pub fn from_code(code: u8) -> Option<Self> {
        let state = match code {
            0 => Self::Idle,
            1 => Self::Forward,
            2 => Self::SoftLeft,
            3 => Self::SoftRight,
            4 => Self::HardLeft,
            5 => Self::HardRight,
            6 => Self::IntersectionDetected,
            7 => Self::ExecutingLeft,
            8 => Self::ExecutingRight,
            9 => Self::ExecutingUTurn,
            10 => Self::PassingStraight,
            11 => Self::Arrived,
            12 => Self::LineLost,
            _ => return None,
        };
        Some(state)
    }

    /// True while a turn maneuver is waiting to re-acquire the line
    pub fn is_executing_turn(self) -> bool {
        matches!(
            self,
            Self::ExecutingLeft | Self::ExecutingRight | Self::ExecutingUTurn
        )
    }

    /// State name for logging
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Forward => "Forward",
            Self::SoftLeft => "SoftLeft",
            Self::SoftRight => "SoftRight",
            Self::HardLeft => "HardLeft",
            Self::HardRight => "HardRight",
            Self::IntersectionDetected => "IntersectionDetected",
            Self::ExecutingLeft => "ExecutingLeft",
            Self::ExecutingRight => "ExecutingRight",
            Self::ExecutingUTurn => "ExecutingUTurn",
            Self::PassingStraight => "PassingStraight",
            Self::Arrived => "Arrived",
            Self::LineLost => "LineLost",
        }
    }
}

/// Human-readable marker for the most recent intersection
///
/// Telemetry only; carries no control meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLabel(String<NODE_LABEL_LEN>);

impl NodeLabel {
    fn fixed(text: &str) -> Self {
        let mut label = String::new();
        let _ = label.push_str(text);
        Self(label)
    }

    /// Label before any run has started
    pub fn none() -> Self {
        Self::fixed("-")
    }

    /// Label at the start of a run
    pub fn start() -> Self {
        Self::fixed("start")
    }

    /// Label once the path is complete
    pub fn arrived() -> Self {
        Self::fixed("arrived")
    }

    /// Label for the intersection reached at progress index `step`
    ///
    /// Intersections are numbered from one: step 0 is "A1".
    pub fn intersection(step: usize) -> Self {
        use core::fmt::Write;

        let mut label = String::new();
        let _ = write!(label, "A{}", step + 1);
        Self(label)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for NodeLabel {
    fn default() -> Self {
        Self::none()
    }
}

/// Read-only view of the follower for telemetry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerStatus {
    pub state: FollowerState,
    pub node: NodeLabel,
    pub running: bool,
    pub step: usize,
    pub sensors: SensorSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_are_stable() {
        assert_eq!(FollowerState::Idle.code(), 0);
        assert_eq!(FollowerState::Forward.code(), 1);
        assert_eq!(FollowerState::IntersectionDetected.code(), 6);
        assert_eq!(FollowerState::ExecutingUTurn.code(), 9);
        assert_eq!(FollowerState::Arrived.code(), 11);
        assert_eq!(FollowerState::LineLost.code(), 12);
    }

    #[test]
    fn test_state_code_round_trip() {
        for code in 0..=12 {
            let state = FollowerState::from_code(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert_eq!(FollowerState::from_code(13), None);
    }

    #[test]
    fn test_executing_turn() {
        assert!(FollowerState::ExecutingLeft.is_executing_turn());
        assert!(FollowerState::ExecutingUTurn.is_executing_turn());
        assert!(!FollowerState::PassingStraight.is_executing_turn());
    }

    #[test]
    fn test_node_labels() {
        assert_eq!(NodeLabel::default().as_str(), "-");
        assert_eq!(NodeLabel::start().as_str(), "start");
        assert_eq!(NodeLabel::arrived().as_str(), "arrived");
        assert_eq!(NodeLabel::intersection(0).as_str(), "A1");
        assert_eq!(NodeLabel::intersection(63).as_str(), "A64");
    }
}
