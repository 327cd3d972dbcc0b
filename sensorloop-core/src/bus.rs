//! External Bus and GPIO Capabilities
//!
//! The engine never owns a transport. It consumes two abstract capabilities
//! the platform provides:
//!
//! - [`SensorBus`]: open a device at an address, then synchronous blocking
//!   reads and writes against its handle. I2C and SPI wrappers both fit this
//!   shape; so does a scripted mock in tests.
//! - [`EdgeSource`]: edge-callback registration, consumed only by the
//!   interrupt-driven digital-input attribute (`std` only; the callback is
//!   boxed).
//!
//! There is no cancellation primitive: a bus call that hangs blocks the
//! controller until it returns. Callers needing bounded latency wrap
//! controller calls with an external watchdog.

use crate::errors::BusError;

/// Synchronous, fallible bus transport.
///
/// A bus handle is typically not safely shared across threads; drive each
/// bus from one polling loop.
pub trait SensorBus {
    /// Opaque per-device handle.
    type Handle;

    /// Open the device at `address`.
    fn open(&mut self, address: u16) -> Result<Self::Handle, BusError>;

    /// Fill `buf` from the device.
    fn read(&mut self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write `bytes` to the device.
    fn write(&mut self, handle: &mut Self::Handle, bytes: &[u8]) -> Result<(), BusError>;
}

/// Which electrical transitions fire an edge callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low → high only.
    Rising,
    /// High → low only.
    Falling,
    /// Either transition.
    Both,
}

/// Edge-interrupt registration capability.
///
/// The callback receives the new electrical level (`true` = high). It runs
/// on provider infrastructure's thread: enqueue work, never execute it
/// inline.
#[cfg(feature = "std")]
pub trait EdgeSource {
    /// Register `callback` for `edge` transitions on `pin`.
    fn register_edge_callback(
        &mut self,
        pin: u8,
        edge: Edge,
        callback: Box<dyn FnMut(bool) + Send>,
    ) -> Result<(), BusError>;
}
