//! Host monotonic clock

use std::time::Instant;

use line_rover_core::traits::TimeSource;

/// Clock measuring from the moment it was created
///
/// Clones share the same origin.
#[derive(Debug, Clone, Copy)]
pub struct StdTime {
    origin: Instant,
}

impl StdTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for StdTime {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_monotonic() {
        let time = StdTime::new();
        let first = time.now_us();
        std::thread::sleep(Duration::from_millis(2));
        assert!(time.now_us() > first);
        assert!(time.elapsed_ms_since(0) >= 2);
    }

    #[test]
    fn test_clones_share_origin() {
        let time = StdTime::new();
        let copy = time;
        std::thread::sleep(Duration::from_millis(1));
        assert!(copy.now_ms().abs_diff(time.now_ms()) <= 1);
    }
}
