//! Device Profiles: the decode capability behind the generic controller
//!
//! ## Why a trait here
//!
//! Device libraries tend to re-implement nearly identical fetch/update/notify
//! logic once per sensor model. This engine inverts that: one generic
//! [`SensorController`](crate::controller::SensorController) drives any
//! device, and everything device-specific lives in a [`DeviceProfile`]:
//!
//! - a declarative attribute table (`ATTRIBUTES`) the controller turns into
//!   its state arena once, at construction;
//! - the poll/init command bytes, if the family needs any;
//! - the pure `decode` step from response buffer to `(slot, value)` pairs;
//! - optional `derive` for quantities computed from other readings.
//!
//! Device quirks (derived attributes, alternate response layouts, datasheet
//! minimum intervals) are configuration, not copied code.

use heapless::Vec;

use crate::errors::ProtocolResult;
use crate::state::AttributeSpec;

pub mod plantower;
pub mod sensirion;

pub use plantower::Plantower;
pub use sensirion::Sensirion5x;

/// Most attributes any single profile may declare.
pub const MAX_ATTRIBUTES: usize = 16;

/// Largest command a profile may emit.
pub const MAX_COMMAND: usize = 16;

/// Decoded readings: `(attribute slot, physical-unit value)` pairs.
///
/// Slots index into the profile's `ATTRIBUTES` table. A profile may omit
/// slots whose values the device marked unknown.
pub type Readings = Vec<(usize, f64), MAX_ATTRIBUTES>;

/// Command bytes written to the bus.
pub type CommandBuf = Vec<u8, MAX_COMMAND>;

/// Everything the controller needs to know about one device family.
pub trait DeviceProfile {
    /// Attribute table; slot order is fixed for the life of the profile.
    const ATTRIBUTES: &'static [AttributeSpec];

    /// Exact response size to read from the bus.
    fn response_len(&self) -> usize;

    /// Datasheet-mandated minimum milliseconds between measurements.
    fn min_interval_ms(&self) -> u64;

    /// Command written once during controller init (e.g. "start
    /// measurement"), if the family needs one.
    fn init_command(&self) -> Option<CommandBuf> {
        None
    }

    /// Command written immediately before each read, if the family needs
    /// one. Read-only devices return `None`.
    fn poll_command(&self) -> Option<CommandBuf> {
        None
    }

    /// Validate `response` and append `(slot, value)` readings to `out`.
    ///
    /// Must be all-or-nothing: on error, `out` must be left untouched.
    fn decode(&self, response: &[u8], out: &mut Readings) -> ProtocolResult<()>;

    /// Compute derived readings from this cycle's fresh readings.
    ///
    /// Called only with readings decoded in the current cycle, so a derived
    /// quantity is recomputed only when every source it needs was updated
    /// together.
    fn derive(&self, fresh: &Readings, out: &mut Readings) {
        let _ = (fresh, out);
    }
}

/// Fetch the value decoded for `slot` this cycle, if any.
pub(crate) fn reading_for(readings: &Readings, slot: usize) -> Option<f64> {
    readings
        .iter()
        .find(|(s, _)| *s == slot)
        .map(|(_, v)| *v)
}
