//! Line sensor snapshot and pattern rules
//!
//! The robot carries five binary proximity sensors across its front,
//! numbered left to right:
//!
//! ```text
//!   s1          s2          s3          s4          s5
//! left-outer  left-inner  center   right-inner  right-outer
//! ```
//!
//! A [`SensorSnapshot`] is captured once per control cycle and every
//! decision in that cycle is made against the same snapshot.

pub mod array;

pub use array::{IrSensorArray, SensorPin};

/// Number of line sensor channels
pub const CHANNEL_COUNT: usize = 5;

/// One reading of all five sensors, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSnapshot {
    channels: [bool; CHANNEL_COUNT],
}

/// Line-centering decision for a snapshot without an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Line under the center sensor, drive straight
    Straight,
    /// Drifted right of the line, gentle left correction
    SoftLeft,
    /// Drifted left of the line, gentle right correction
    SoftRight,
    /// Line only under the far left sensor
    HardLeft,
    /// Line only under the far right sensor
    HardRight,
    /// Nothing usable under the array
    Lost,
}

impl SensorSnapshot {
    /// Build a snapshot from the five channels, left to right
    pub const fn new(s1: bool, s2: bool, s3: bool, s4: bool, s5: bool) -> Self {
        Self {
            channels: [s1, s2, s3, s4, s5],
        }
    }

    /// Build a snapshot from an array of channels, left to right
    pub const fn from_channels(channels: [bool; CHANNEL_COUNT]) -> Self {
        Self { channels }
    }

    /// Build a snapshot from the low five bits of `bits`
    ///
    /// Bit 4 is s1 (left-outer) and bit 0 is s5 (right-outer), so the
    /// binary literal reads the same way as the sensor bar:
    /// `0b00100` is the center sensor alone.
    pub const fn from_bits(bits: u8) -> Self {
        Self::new(
            bits & 0b10000 != 0,
            bits & 0b01000 != 0,
            bits & 0b00100 != 0,
            bits & 0b00010 != 0,
            bits & 0b00001 != 0,
        )
    }

    /// Parse a five-character pattern such as `"01110"`
    ///
    /// Returns `None` unless the pattern is exactly five `0`/`1` characters.
    pub fn from_pattern(pattern: &str) -> Option<Self> {
        let bytes = pattern.as_bytes();
        if bytes.len() != CHANNEL_COUNT {
            return None;
        }
        let mut channels = [false; CHANNEL_COUNT];
        for (slot, byte) in channels.iter_mut().zip(bytes) {
            *slot = match byte {
                b'0' => false,
                b'1' => true,
                _ => return None,
            };
        }
        Some(Self { channels })
    }

    pub fn left_outer(&self) -> bool {
        self.channels[0]
    }

    pub fn left_inner(&self) -> bool {
        self.channels[1]
    }

    pub fn center(&self) -> bool {
        self.channels[2]
    }

    pub fn right_inner(&self) -> bool {
        self.channels[3]
    }

    pub fn right_outer(&self) -> bool {
        self.channels[4]
    }

    /// Channels as booleans, left to right
    pub fn channels(&self) -> [bool; CHANNEL_COUNT] {
        self.channels
    }

    /// Channels as 0/1 levels for telemetry
    pub fn levels(&self) -> [u8; CHANNEL_COUNT] {
        self.channels.map(u8::from)
    }

    /// True when every channel reads inactive
    pub fn is_all_clear(&self) -> bool {
        self.channels.iter().all(|active| !active)
    }

    /// Intersection detection
    ///
    /// Either both outermost sensors are active (full-width marker), or both
    /// inner sensors are active with the center inactive (gap pattern).
    pub fn is_intersection(&self) -> bool {
        (self.left_outer() && self.right_outer())
            || (self.left_inner() && self.right_inner() && !self.center())
    }

    /// Line re-acquired after a turn: center plus at least one inner sensor
    pub fn is_line_acquired(&self) -> bool {
        self.center() && (self.left_inner() || self.right_inner())
    }

    /// First line crossing during a U-turn sweep: center or right-inner
    pub fn is_line_crossing(&self) -> bool {
        self.center() || self.right_inner()
    }

    /// Line-centering rule, first match wins
    ///
    /// Only meaningful when [`is_intersection`](Self::is_intersection) is
    /// false; the follower checks for intersections first.
    pub fn correction(&self) -> Correction {
        if self.center() && !self.left_outer() && !self.right_outer() {
            Correction::Straight
        } else if self.left_inner() && !self.left_outer() {
            Correction::SoftLeft
        } else if self.right_inner() && !self.right_outer() {
            Correction::SoftRight
        } else if self.left_outer() {
            Correction::HardLeft
        } else if self.right_outer() {
            Correction::HardRight
        } else {
            Correction::Lost
        }
    }
}
