//! Actuation and sensing interface
//!
//! The follower never touches motors or pins directly. It issues one of a
//! fixed set of drive primitives and reads the sensor bar through these
//! traits.

use crate::motor::MotorError;
use crate::sensors::SensorSnapshot;

/// Drive primitives used by the path follower
///
/// Each call replaces the previous actuation; there is no queuing.
pub trait Actuation {
    /// Both wheels forward at the cruise duty
    fn drive_forward(&mut self) -> Result<(), MotorError>;

    /// Sharp left turn used at intersections
    fn pivot_left(&mut self) -> Result<(), MotorError>;

    /// Sharp right turn used at intersections
    fn pivot_right(&mut self) -> Result<(), MotorError>;

    /// Spin in place clockwise for a U-turn
    fn pivot_uturn_right(&mut self) -> Result<(), MotorError>;

    /// Gentle left correction while following the line
    fn turn_left_soft(&mut self) -> Result<(), MotorError>;

    /// Gentle right correction while following the line
    fn turn_right_soft(&mut self) -> Result<(), MotorError>;

    /// Stop both motors
    fn halt(&mut self) -> Result<(), MotorError>;
}

/// Five-channel binary line sensor
pub trait LineSensor {
    /// Capture a fresh reading of all five channels
    fn read_five_channels(&mut self) -> SensorSnapshot;
}
