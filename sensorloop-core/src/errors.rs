//! Error Types for the Polled-Sensor Engine
//!
//! ## Design Philosophy
//!
//! The error system follows a few rules that matter on small devices:
//!
//! 1. **Small Size**: every variant carries a handful of scalars or a
//!    `&'static str`; no variant allocates.
//!
//! 2. **Copy Semantics**: errors are returned from hot decode paths and may be
//!    stored in queues, so all of them implement `Copy`.
//!
//! 3. **One Enum Per Concern**: wire-protocol validation, bus transport,
//!    controller-boundary faults, construction-time configuration, and
//!    telemetry encoding each get their own type. A caller matching on a
//!    `ProtocolError` never has to wade through transport variants.
//!
//! ## Propagation Policy
//!
//! Codec errors are returned as typed failures and are never partially
//! applied: validation happens before any attribute is touched. Bus and
//! protocol failures during a fetch are caught inside the controller,
//! recorded as its `last_error`, and converted into a `false` return; they
//! never escape to the polling loop. Configuration errors are the only ones
//! surfaced at construction time, where the caller can still do something
//! about them.

use thiserror_no_std::Error;

/// Result alias for codec operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Wire-protocol validation failures from the codecs.
///
/// Decode fails closed: none of these leave partially-decoded values behind.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame does not begin with the family's fixed magic bytes.
    #[error("bad frame magic: expected {expected:#06x}, found {found:#06x}")]
    BadMagic {
        /// Magic the codec was constructed with, big-endian packed.
        expected: u16,
        /// First two bytes actually present in the buffer.
        found: u16,
    },

    /// Frame or triplet checksum does not match the recomputed value.
    #[error("checksum mismatch: frame carries {expected:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Checksum carried by the frame (CRC-8 values widened to u16).
        expected: u16,
        /// Checksum recomputed over the received bytes.
        computed: u16,
    },

    /// Buffer is shorter than the frame it claims to contain.
    #[error("frame truncated: need {needed} bytes, have {have}")]
    Truncated {
        /// Bytes required to hold the declared frame.
        needed: usize,
        /// Bytes actually available.
        have: usize,
    },
}

/// Transport failure reported by a [`SensorBus`](crate::bus::SensorBus)
/// implementation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("bus fault: {reason}")]
pub struct BusError {
    /// Short description from the transport layer.
    pub reason: &'static str,
}

impl BusError {
    /// Convenience constructor.
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Failures at the controller boundary during a fetch cycle.
///
/// These are caught inside
/// [`SensorController::fetch_states`](crate::controller::SensorController::fetch_states),
/// recorded, and turned into a `false` return; a faulted read never halts
/// the polling loop.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// The bus transport failed while issuing the poll command or reading
    /// the response.
    #[error("bus I/O failed: {0}")]
    Bus(#[from] BusError),

    /// The response failed wire-protocol validation.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Construction-time validation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Device address outside the legal range of the bus.
    #[error("invalid device address {address:#04x}")]
    InvalidAddress {
        /// The offending address.
        address: u16,
    },

    /// Attribute precision beyond what scaled encoding supports.
    #[error("precision {precision} exceeds supported max {max}")]
    PrecisionOutOfRange {
        /// Requested decimal digits.
        precision: u8,
        /// Largest supported precision.
        max: u8,
    },

    /// Sensor or attribute identifier too long for inline storage.
    #[error("identifier length {len} exceeds max {max}")]
    IdTooLong {
        /// Length of the rejected identifier.
        len: usize,
        /// Largest inline identifier length.
        max: usize,
    },

    /// Device profile declares more attributes than an arena can hold.
    #[error("profile declares {count} attributes, max {max}")]
    TooManyAttributes {
        /// Declared attribute count.
        count: usize,
        /// Arena capacity.
        max: usize,
    },
}

/// Telemetry sentence encoding failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryError {
    /// The sentence buffer is too small for the snapshot.
    #[error("sentence overflow: capacity {capacity} bytes")]
    Overflow {
        /// Capacity of the rejected buffer.
        capacity: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ProtocolError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::BadMagic { expected, found } => {
                defmt::write!(fmt, "bad magic: expected {:#06x}, found {:#06x}", expected, found)
            }
            Self::ChecksumMismatch { expected, computed } => {
                defmt::write!(fmt, "checksum: frame {:#06x}, computed {:#06x}", expected, computed)
            }
            Self::Truncated { needed, have } => {
                defmt::write!(fmt, "truncated: need {}, have {}", needed, have)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Bus(e) => defmt::write!(fmt, "bus: {}", e.reason),
            Self::Protocol(e) => defmt::write!(fmt, "protocol: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_stay_small() {
        // Returned from hot paths; keep them register-sized.
        assert!(core::mem::size_of::<ProtocolError>() <= 24);
        assert!(core::mem::size_of::<DeviceError>() <= 32);
    }

    #[test]
    fn protocol_error_wraps_into_device_error() {
        let proto = ProtocolError::Truncated { needed: 32, have: 4 };
        let dev: DeviceError = proto.into();
        assert_eq!(dev, DeviceError::Protocol(proto));
    }
}
