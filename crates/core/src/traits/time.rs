//! Monotonic time abstraction.
//!
//! Maneuver timing (settle, clear, pivot, pass-straight) is measured against
//! a `TimeSource` instead of blocking delays, so the control loop keeps
//! servicing commands and telemetry while a maneuver is in progress.

use core::cell::Cell;

/// Monotonic clock for the control loop.
///
/// Implementations:
/// - `StdTime` (firmware crate) backed by `std::time::Instant`
/// - [`MockTime`] for host tests with manual advancement
///
/// # Example
///
/// ```
/// use line_rover_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let started = time.now_ms();
/// time.advance_ms(150);
/// assert_eq!(time.elapsed_ms_since(started), 150);
/// ```
pub trait TimeSource: Clone {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Microseconds since the same origin.
    fn now_us(&self) -> u64;

    /// Milliseconds elapsed since `reference_ms`, saturating at zero.
    fn elapsed_ms_since(&self, reference_ms: u64) -> u64 {
        self.now_ms().saturating_sub(reference_ms)
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Clones do not share the counter. Hand consumers a `&MockTime` (references
/// implement [`TimeSource`] too) so the test can keep advancing the original.
#[derive(Clone, Default, Debug)]
pub struct MockTime {
    current_us: Cell<u64>,
}

impl MockTime {
    /// Clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `us` microseconds.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advance by `us` microseconds.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Advance by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * 1000);
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

impl<T: TimeSource> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
