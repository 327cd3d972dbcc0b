//! Polled-sensor engine for edge telemetry
//!
//! Drives a fleet of bus-attached environmental sensors through a uniform
//! lifecycle: rate-limited polling, frame decode and checksum validation,
//! debounced typed attribute state, and checksummed telemetry sentences.
//!
//! Key constraints:
//! - `no_std` core (std only for the system clock and interrupt inputs)
//! - No heap allocation in the polling path; `heapless` buffers throughout
//! - Device quirks live in data tables, not in per-device control flow
//!
//! ```
//! use sensorloop_core::state::{AttributeSpec, AttributeState};
//!
//! let mut temp = AttributeState::new(AttributeSpec::temperature()).unwrap();
//!
//! assert!(temp.update(23.45, 1_000));      // first reading is a change
//! assert!(!temp.update(23.45, 2_000));     // identical reading is not
//! assert_eq!(temp.scaled(), Some(234));    // precision 1, half-to-even
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bus;
pub mod codec;
pub mod controller;
pub mod derived;
pub mod device;
pub mod errors;
pub mod notify;
pub mod schedule;
pub mod state;
#[cfg(feature = "std")]
pub mod switch;
pub mod telemetry;
pub mod time;

// Public API
pub use bus::{Edge, SensorBus};
pub use controller::{Phase, SensorController};
pub use device::{DeviceProfile, Readings};
pub use errors::{BusError, DeviceError, ProtocolError, ProtocolResult};
pub use notify::{ChangeEvent, ChangeQueue};
pub use schedule::{ReadSchedule, ScheduleConfig};
pub use state::{AttributeSpec, AttributeState};
pub use time::{Clock, Timestamp};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
