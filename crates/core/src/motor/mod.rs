//! Motor driver abstraction
//!
//! This module drives the two DC motors of the rover through an L298N-style
//! H-bridge: two direction inputs and one enable input carrying PWM per
//! motor. [`DifferentialDrive`] combines a left and right motor and
//! implements the [`Actuation`] primitives the follower issues.
//!
//! # Design
//!
//! This module is pure `no_std` with no feature gates. Pin implementations
//! wrap the platform HAL in the firmware crate.

use crate::traits::Actuation;

/// Motor control error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorError {
    /// Speed value outside [-1.0, +1.0] range
    InvalidSpeed,
    /// Pin or PWM hardware failed
    HardwareFault,
}

impl core::fmt::Display for MotorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MotorError::InvalidSpeed => write!(f, "motor speed out of range"),
            MotorError::HardwareFault => write!(f, "motor hardware fault"),
        }
    }
}

/// PWM output used for the H-bridge enable input
pub trait PwmPin {
    /// Set duty cycle as a fraction [0.0, 1.0]
    fn set_duty(&mut self, duty: f32) -> Result<(), MotorError>;
}

/// Digital output used for an H-bridge direction input
pub trait DirectionPin {
    fn set_high(&mut self) -> Result<(), MotorError>;
    fn set_low(&mut self) -> Result<(), MotorError>;
}

/// Motor control trait
///
/// Speed is normalized to [-1.0, +1.0]: positive forward, negative reverse,
/// zero stopped.
pub trait Motor {
    /// Set motor speed and direction
    ///
    /// # Errors
    ///
    /// Returns `MotorError::InvalidSpeed` if speed is outside [-1.0, +1.0].
    fn set_speed(&mut self, speed: f32) -> Result<(), MotorError>;

    /// Stop the motor (both direction inputs low, enable off)
    fn stop(&mut self) -> Result<(), MotorError>;
}

/// One channel of an L298N-style H-bridge
///
/// # Truth Table
///
/// | IN1 | IN2 | EN  | Motor State |
/// |-----|-----|-----|-------------|
/// | 1   | 0   | PWM | Forward     |
/// | 0   | 1   | PWM | Reverse     |
/// | 0   | 0   | 0   | Stopped     |
pub struct HBridgeMotor<IN1, IN2, EN>
where
    IN1: DirectionPin,
    IN2: DirectionPin,
    EN: PwmPin,
{
    in1: IN1,
    in2: IN2,
    enable: EN,
}

impl<IN1, IN2, EN> HBridgeMotor<IN1, IN2, EN>
where
    IN1: DirectionPin,
    IN2: DirectionPin,
    EN: PwmPin,
{
    /// Create a motor from its two direction pins and enable PWM
    pub fn new(in1: IN1, in2: IN2, enable: EN) -> Self {
        Self { in1, in2, enable }
    }

    /// Release the pins
    pub fn into_parts(self) -> (IN1, IN2, EN) {
        (self.in1, self.in2, self.enable)
    }
}

impl<IN1, IN2, EN> Motor for HBridgeMotor<IN1, IN2, EN>
where
    IN1: DirectionPin,
    IN2: DirectionPin,
    EN: PwmPin,
{
    #[inline]
    fn set_speed(&mut self, speed: f32) -> Result<(), MotorError> {
        if !(-1.0..=1.0).contains(&speed) {
            return Err(MotorError::InvalidSpeed);
        }

        if speed > 0.0 {
            self.in1.set_high()?;
            self.in2.set_low()?;
            self.enable.set_duty(speed)
        } else if speed < 0.0 {
            self.in1.set_low()?;
            self.in2.set_high()?;
            self.enable.set_duty(-speed)
        } else {
            self.stop()
        }
    }

    #[inline]
    fn stop(&mut self) -> Result<(), MotorError> {
        self.enable.set_duty(0.0)?;
        self.in1.set_low()?;
        self.in2.set_low()?;
        Ok(())
    }
}

/// Duty levels for each kind of drive command, on the 0-255 PWM scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedProfile {
    /// Straight driving
    pub forward: u8,
    /// Gentle line corrections
    pub soft: u8,
    /// Sharp corrections, pivots and U-turns
    pub hard: u8,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            forward: 200,
            soft: 200,
            hard: 255,
        }
    }
}

impl SpeedProfile {
    /// Build a profile, clamping each level to 0-255
    pub fn clamped(forward: i32, soft: i32, hard: i32) -> Self {
        let clamp = |v: i32| v.clamp(0, 255) as u8;
        Self {
            forward: clamp(forward),
            soft: clamp(soft),
            hard: clamp(hard),
        }
    }

    /// Convert a 0-255 level to a normalized speed
    pub fn normalized(level: u8) -> f32 {
        level as f32 / 255.0
    }
}

/// Two-wheel differential drive
///
/// Turns stop the inner wheel; the U-turn spins in place with the left
/// wheel forward and the right wheel reversed.
pub struct DifferentialDrive<L: Motor, R: Motor> {
    left: L,
    right: R,
    profile: SpeedProfile,
}

impl<L: Motor, R: Motor> DifferentialDrive<L, R> {
    /// Create a drive with the default speed profile
    pub fn new(left: L, right: R) -> Self {
        Self::with_profile(left, right, SpeedProfile::default())
    }

    pub fn with_profile(left: L, right: R, profile: SpeedProfile) -> Self {
        Self {
            left,
            right,
            profile,
        }
    }

    pub fn profile(&self) -> SpeedProfile {
        self.profile
    }

    /// Replace the speed profile; takes effect on the next drive command
    pub fn set_profile(&mut self, profile: SpeedProfile) {
        self.profile = profile;
    }

    pub fn left(&self) -> &L {
        &self.left
    }

    pub fn right(&self) -> &R {
        &self.right
    }

    fn drive(&mut self, left: f32, right: f32) -> Result<(), MotorError> {
        self.left.set_speed(left)?;
        self.right.set_speed(right)
    }
}

impl<L: Motor, R: Motor> Actuation for DifferentialDrive<L, R> {
    fn drive_forward(&mut self) -> Result<(), MotorError> {
        let v = SpeedProfile::normalized(self.profile.forward);
        self.drive(v, v)
    }

    fn pivot_left(&mut self) -> Result<(), MotorError> {
        let v = SpeedProfile::normalized(self.profile.hard);
        self.drive(0.0, v)
    }

    fn pivot_right(&mut self) -> Result<(), MotorError> {
        let v = SpeedProfile::normalized(self.profile.hard);
        self.drive(v, 0.0)
    }

    fn pivot_uturn_right(&mut self) -> Result<(), MotorError> {
        let v = SpeedProfile::normalized(self.profile.hard);
        self.drive(v, -v)
    }

    fn turn_left_soft(&mut self) -> Result<(), MotorError> {
        let v = SpeedProfile::normalized(self.profile.soft);
        self.drive(0.0, v)
    }

    fn turn_right_soft(&mut self) -> Result<(), MotorError> {
        let v = SpeedProfile::normalized(self.profile.soft);
        self.drive(v, 0.0)
    }

    fn halt(&mut self) -> Result<(), MotorError> {
        self.left.stop()?;
        self.right.stop()
    }
}
