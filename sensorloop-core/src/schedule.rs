//! Read Scheduler
//!
//! One rule, applied identically after every successful fetch:
//!
//! ```text
//! next_read_on = now + max(read_interval, device_min_interval)
//! ```
//!
//! The caller's interval expresses intent; the device minimum comes from the
//! datasheet and wins whenever it is larger. Polling faster than a sensor's
//! conversion time reads stale or in-flight data, so the floor can only ever
//! be raised, never lowered.

use crate::time::Timestamp;

/// Caller-facing scheduling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleConfig {
    /// Desired milliseconds between reads.
    pub read_interval_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            read_interval_ms: 1_000,
        }
    }
}

/// Per-sensor read schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSchedule {
    read_interval_ms: u64,
    device_min_interval_ms: u64,
    next_read_on: Timestamp,
}

impl ReadSchedule {
    /// New schedule; the first read is due immediately.
    pub const fn new(read_interval_ms: u64) -> Self {
        Self {
            read_interval_ms,
            device_min_interval_ms: 0,
            next_read_on: 0,
        }
    }

    /// Build from caller configuration.
    pub const fn from_config(config: ScheduleConfig) -> Self {
        Self::new(config.read_interval_ms)
    }

    /// Whether a read is legal at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        now >= self.next_read_on
    }

    /// The interval actually applied: caller interval, floored by the device
    /// minimum.
    pub fn effective_interval_ms(&self) -> u64 {
        self.read_interval_ms.max(self.device_min_interval_ms)
    }

    /// Reschedule after a successful fetch.
    pub fn advance(&mut self, now: Timestamp) {
        self.next_read_on = now + self.effective_interval_ms();
    }

    /// Raise the device-mandated floor. Lower values are ignored.
    pub fn raise_device_floor(&mut self, min_interval_ms: u64) {
        if min_interval_ms > self.device_min_interval_ms {
            self.device_min_interval_ms = min_interval_ms;
        }
    }

    /// Earliest legal time for the next read.
    pub fn next_read_on(&self) -> Timestamp {
        self.next_read_on
    }

    /// Caller-configured interval.
    pub fn read_interval_ms(&self) -> u64 {
        self.read_interval_ms
    }

    /// Device-mandated minimum interval.
    pub fn device_min_interval_ms(&self) -> u64 {
        self.device_min_interval_ms
    }
}
