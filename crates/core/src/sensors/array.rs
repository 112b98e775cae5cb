//! Five-channel IR sensor array
//!
//! Reads five digital sensor pins into a [`SensorSnapshot`]. Pin access is
//! abstracted by [`SensorPin`] so the firmware can wrap its HAL input type.

use super::{SensorSnapshot, CHANNEL_COUNT};
use crate::traits::LineSensor;

/// Digital input pin for one sensor channel
pub trait SensorPin {
    /// Returns `true` if the pin reads logic high
    fn is_high(&self) -> bool;
}

/// Five IR sensors wired left to right
///
/// Most reflective IR modules pull their output high over the dark line, so
/// the default polarity treats a high pin as "line detected". Use
/// [`active_low`](Self::active_low) for modules that invert.
pub struct IrSensorArray<P: SensorPin> {
    pins: [P; CHANNEL_COUNT],
    active_high: bool,
}

impl<P: SensorPin> IrSensorArray<P> {
    /// Create an array where a high pin means the line is detected
    pub fn new(pins: [P; CHANNEL_COUNT]) -> Self {
        Self {
            pins,
            active_high: true,
        }
    }

    /// Create an array where a low pin means the line is detected
    pub fn active_low(pins: [P; CHANNEL_COUNT]) -> Self {
        Self {
            pins,
            active_high: false,
        }
    }
}

impl<P: SensorPin> LineSensor for IrSensorArray<P> {
    fn read_five_channels(&mut self) -> SensorSnapshot {
        let mut channels = [false; CHANNEL_COUNT];
        for (slot, pin) in channels.iter_mut().zip(self.pins.iter()) {
            *slot = pin.is_high() == self.active_high;
        }
        SensorSnapshot::from_channels(channels)
    }
}
