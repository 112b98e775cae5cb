//! Path follower timing parameters
//!
//! # Parameters
//!
//! - `settle_ms` - Halt after detecting an intersection before acting
//! - `clear_ms` - Forward drive to carry the wheels over the intersection
//!   center before a turn
//! - `pivot_ms` - Blind pivot before watching for the line again
//! - `straight_ms` - Forward drive to pass an intersection straight through
//! - `reacquire_timeout_ms` - Give up re-acquiring the line after a turn
//!   (0 = wait forever)

use serde::Deserialize;

use super::error::ParameterError;

// --- Defaults ---

const DEFAULT_SETTLE_MS: u32 = 500;
const DEFAULT_CLEAR_MS: u32 = 150;
const DEFAULT_PIVOT_MS: u32 = 250;
const DEFAULT_STRAIGHT_MS: u32 = 300;
const DEFAULT_REACQUIRE_TIMEOUT_MS: u32 = 0;

// --- Ranges ---

const MAX_PHASE_MS: u32 = 10_000;
const MAX_REACQUIRE_TIMEOUT_MS: u32 = 120_000;

/// Follower maneuver timing
///
/// Deserializes with every missing field at its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FollowerParams {
    pub settle_ms: u32,
    pub clear_ms: u32,
    pub pivot_ms: u32,
    pub straight_ms: u32,
    pub reacquire_timeout_ms: u32,
}

impl Default for FollowerParams {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            clear_ms: DEFAULT_CLEAR_MS,
            pivot_ms: DEFAULT_PIVOT_MS,
            straight_ms: DEFAULT_STRAIGHT_MS,
            reacquire_timeout_ms: DEFAULT_REACQUIRE_TIMEOUT_MS,
        }
    }
}

impl FollowerParams {
    /// All timed phases complete immediately; useful for stepping the
    /// state machine in tests.
    pub const fn immediate() -> Self {
        Self {
            settle_ms: 0,
            clear_ms: 0,
            pivot_ms: 0,
            straight_ms: 0,
            reacquire_timeout_ms: 0,
        }
    }

    /// True if re-acquisition is bounded by a timeout
    pub fn has_reacquire_timeout(&self) -> bool {
        self.reacquire_timeout_ms > 0
    }

    /// Check every field against its range
    pub fn validate(&self) -> Result<(), ParameterError> {
        let phases = [
            ("settle_ms", self.settle_ms),
            ("clear_ms", self.clear_ms),
            ("pivot_ms", self.pivot_ms),
            ("straight_ms", self.straight_ms),
        ];
        for (name, value) in phases {
            check(name, value, MAX_PHASE_MS)?;
        }
        check(
            "reacquire_timeout_ms",
            self.reacquire_timeout_ms,
            MAX_REACQUIRE_TIMEOUT_MS,
        )
    }
}

fn check(name: &'static str, value: u32, max: u32) -> Result<(), ParameterError> {
    if value > max {
        Err(ParameterError::OutOfRange { name, value, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = FollowerParams::default();
        assert_eq!(params.settle_ms, 500);
        assert_eq!(params.clear_ms, 150);
        assert_eq!(params.pivot_ms, 250);
        assert_eq!(params.straight_ms, 300);
        assert!(!params.has_reacquire_timeout());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_immediate_is_valid() {
        assert!(FollowerParams::immediate().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_long_phase() {
        let params = FollowerParams {
            pivot_ms: 20_000,
            ..FollowerParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::OutOfRange {
                name: "pivot_ms",
                value: 20_000,
                max: 10_000
            })
        );
    }

    #[test]
    fn test_validate_rejects_long_timeout() {
        let params = FollowerParams {
            reacquire_timeout_ms: 500_000,
            ..FollowerParams::default()
        };
        assert!(params.validate().is_err());
    }
}
