//! Monotonic time adapter.
//!
//! All domain code takes time as a `now_ms` parameter; this adapter is
//! the single place that owns the actual clock. Backed by
//! [`std::time::Instant`], so it never jumps backwards with wall-clock
//! adjustments.

use std::time::Instant;

/// Monotonic milliseconds-since-construction clock.
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since construction (monotonic).
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Seconds since construction (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}
