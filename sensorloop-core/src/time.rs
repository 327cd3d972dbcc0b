//! Time abstraction for the polling engine
//!
//! The engine never reads a clock behind the caller's back: `fetch_states`
//! takes the current timestamp as an argument, and the [`Clock`] trait exists
//! so the loop driving a set of controllers can be wired to whatever time
//! source the platform has:
//! - system clock (when `std` is available)
//! - a monotonic tick counter on bare metal
//! - a manually-advanced clock in tests and host simulations
//!
//! Telemetry sentences carry wall-clock epoch milliseconds, so a wall clock
//! should be preferred whenever one exists; a monotonic source still gives
//! correct debounce and scheduling behavior, just boot-relative stamps.

/// Timestamp in milliseconds since the Unix epoch (or device boot for
/// monotonic sources).
pub type Timestamp = u64;

/// Source of time for the polling loop.
pub trait Clock {
    /// Current timestamp in milliseconds.
    fn now(&self) -> Timestamp;

    /// Whether this source provides wall-clock time (vs monotonic).
    fn is_wall_clock(&self) -> bool;
}

/// System wall clock (requires `std`).
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Manually-driven clock for tests and host simulation.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Timestamp,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    pub const fn new(now: Timestamp) -> Self {
        Self { now }
    }

    /// Jump to an absolute timestamp.
    pub fn set(&mut self, now: Timestamp) {
        self.now = now;
    }

    /// Advance by `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let mut clock = ManualClock::new(1000);
        assert_eq!(clock.now(), 1000);

        clock.advance(500);
        assert_eq!(clock.now(), 1500);

        clock.set(10_000);
        assert_eq!(clock.now(), 10_000);
    }
}
