//! Sensor Controller: one read cycle per invocation
//!
//! ## Overview
//!
//! A [`SensorController`] owns a bus, a device address, and a fixed arena of
//! [`AttributeState`]s built once from its profile's attribute table. The
//! caller drives it from a polling loop:
//!
//! ```text
//! loop {
//!     let now = clock.now();
//!     for controller in &mut controllers {
//!         if controller.fetch_states(now) {
//!             // at least one attribute actually changed
//!         }
//!     }
//! }
//! ```
//!
//! ## State Machine
//!
//! ```text
//! Uninitialized → Initializing → { Enabled, Faulted }
//! ```
//!
//! `init` opens the device and writes the profile's init command; any failure
//! lands in `Faulted` with `last_error` set, and the controller does not
//! auto-retry initialization.
//!
//! ## Fault Isolation
//!
//! Bus and protocol failures during a fetch are caught here, recorded, and
//! turned into a `false` return. The controller stays `Enabled` and is
//! usable on the next cycle without reset; nothing propagates to the polling
//! loop, so one faulted sensor never halts the others.

use core::fmt::Write as _;

use heapless::String;

use crate::bus::SensorBus;
use crate::device::{DeviceProfile, Readings, MAX_ATTRIBUTES};
use crate::errors::{ConfigError, DeviceError};
use crate::notify::{ChangeEvent, ChangeQueue};
use crate::schedule::{ReadSchedule, ScheduleConfig};
use crate::state::{AttributeState, InlineString, MAX_INLINE_ID};
use crate::telemetry;
use crate::time::Timestamp;

/// Read buffer size; every supported response fits.
pub const MAX_READ: usize = 48;

/// Capacity of the stored `last_error` message.
pub const MAX_ERROR: usize = 96;

/// Controller lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed; `init` not yet called.
    Uninitialized,
    /// `init` in progress.
    Initializing,
    /// Open and polling.
    Enabled,
    /// `init` failed; see `last_error`. No auto-retry.
    Faulted,
}

/// Generic controller for one polled device.
pub struct SensorController<B: SensorBus, D: DeviceProfile> {
    bus: B,
    handle: Option<B::Handle>,
    address: u16,
    sensor_id: InlineString,
    profile: D,
    attributes: heapless::Vec<AttributeState, MAX_ATTRIBUTES>,
    schedule: ReadSchedule,
    phase: Phase,
    last_error: Option<String<MAX_ERROR>>,
}

impl<B: SensorBus, D: DeviceProfile> SensorController<B, D> {
    /// Build a controller. The attribute arena is created here, once, from
    /// the profile's table; attributes are never added or removed afterward.
    pub fn new(
        bus: B,
        address: u16,
        sensor_id: &str,
        profile: D,
        config: ScheduleConfig,
    ) -> Result<Self, ConfigError> {
        // 7-bit bus addressing; 0 is the general-call address.
        if address == 0 || address > 0x7F {
            return Err(ConfigError::InvalidAddress { address });
        }
        let sensor_id = InlineString::new(sensor_id).ok_or(ConfigError::IdTooLong {
            len: sensor_id.len(),
            max: MAX_INLINE_ID,
        })?;

        let mut attributes = heapless::Vec::new();
        for spec in D::ATTRIBUTES {
            let state = AttributeState::new(*spec)?;
            attributes
                .push(state)
                .map_err(|_| ConfigError::TooManyAttributes {
                    count: D::ATTRIBUTES.len(),
                    max: MAX_ATTRIBUTES,
                })?;
        }

        Ok(Self {
            bus,
            handle: None,
            address,
            sensor_id,
            profile,
            attributes,
            schedule: ReadSchedule::from_config(config),
            phase: Phase::Uninitialized,
            last_error: None,
        })
    }

    /// Open the device and configure sampling.
    ///
    /// On success the schedule's floor is raised to the profile's minimum
    /// interval and the controller becomes `Enabled`. On failure it becomes
    /// `Faulted` and stays there; the caller decides whether to rebuild it.
    pub fn init(&mut self) {
        self.phase = Phase::Initializing;

        let mut handle = match self.bus.open(self.address) {
            Ok(handle) => handle,
            Err(e) => {
                self.fault(DeviceError::Bus(e));
                return;
            }
        };

        if let Some(cmd) = self.profile.init_command() {
            if let Err(e) = self.bus.write(&mut handle, &cmd) {
                self.fault(DeviceError::Bus(e));
                return;
            }
        }

        self.handle = Some(handle);
        self.schedule.raise_device_floor(self.profile.min_interval_ms());
        self.phase = Phase::Enabled;

        #[cfg(feature = "log")]
        log::debug!(
            "{}: enabled at {:#04x}, effective interval {} ms",
            self.sensor_id,
            self.address,
            self.schedule.effective_interval_ms()
        );
    }

    /// Execute one read cycle. Returns `true` iff at least one attribute
    /// actually changed.
    ///
    /// Returns `false` without touching the bus when the schedule says the
    /// read would be too early, and whenever the controller is not
    /// `Enabled`. I/O and protocol failures are recorded in `last_error` and
    /// also return `false`; the controller remains usable.
    pub fn fetch_states(&mut self, now: Timestamp) -> bool {
        self.fetch_and_apply(now, |_, _| {})
    }

    /// Like [`fetch_states`](Self::fetch_states), pushing a [`ChangeEvent`]
    /// per real change onto `queue`.
    pub fn fetch_states_notify<const N: usize>(
        &mut self,
        now: Timestamp,
        queue: &ChangeQueue<N>,
    ) -> bool {
        let sensor_id = self.sensor_id;
        self.fetch_and_apply(now, |state, now| {
            let Some(key) = InlineString::new(state.key()) else {
                return;
            };
            let Some(value) = state.value() else { return };
            let Some(scaled) = state.scaled() else { return };
            queue.push(ChangeEvent {
                sensor_id,
                key,
                value,
                scaled,
                previous: state.last_value(),
                held_ms: state.last_held_ms(),
                timestamp: now,
            });
        })
    }

    fn fetch_and_apply<F>(&mut self, now: Timestamp, mut on_change: F) -> bool
    where
        F: FnMut(&AttributeState, Timestamp),
    {
        let Some(readings) = self.fetch_cycle(now) else {
            return false;
        };

        let mut any_changed = false;
        for (slot, value) in readings {
            let Some(state) = self.attributes.get_mut(slot) else {
                continue;
            };
            if state.update(value, now) {
                any_changed = true;
                on_change(state, now);
            }
        }

        self.schedule.advance(now);
        any_changed
    }

    /// The bus-facing half of a cycle: gate, poll, read, decode, derive.
    fn fetch_cycle(&mut self, now: Timestamp) -> Option<Readings> {
        if !self.schedule.is_due(now) {
            return None;
        }
        if self.phase != Phase::Enabled {
            return None;
        }
        let handle = self.handle.as_mut()?;

        if let Some(cmd) = self.profile.poll_command() {
            if let Err(e) = self.bus.write(handle, &cmd) {
                return record_error(&mut self.last_error, &self.sensor_id, DeviceError::Bus(e));
            }
        }

        let mut buf = [0u8; MAX_READ];
        let len = self.profile.response_len().min(MAX_READ);
        if let Err(e) = self.bus.read(handle, &mut buf[..len]) {
            return record_error(&mut self.last_error, &self.sensor_id, DeviceError::Bus(e));
        }

        let mut readings = Readings::new();
        if let Err(e) = self.profile.decode(&buf[..len], &mut readings) {
            return record_error(
                &mut self.last_error,
                &self.sensor_id,
                DeviceError::Protocol(e),
            );
        }

        let mut derived = Readings::new();
        self.profile.derive(&readings, &mut derived);
        for reading in derived {
            let _ = readings.push(reading);
        }

        self.last_error = None;
        Some(readings)
    }

    /// Encode the telemetry sentence for the fetch cycle stamped `snapshot`.
    ///
    /// Only enabled attributes touched in that exact cycle are included.
    pub fn telemetry_sentence<const N: usize>(
        &self,
        snapshot: Timestamp,
    ) -> Result<String<N>, crate::errors::TelemetryError> {
        telemetry::encode_sentence(self.sensor_id.as_str(), snapshot, &self.attributes)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the controller is open and polling.
    pub fn is_enabled(&self) -> bool {
        self.phase == Phase::Enabled
    }

    /// Sensor identifier used in telemetry and notifications.
    pub fn sensor_id(&self) -> &str {
        self.sensor_id.as_str()
    }

    /// The attribute arena, in profile slot order.
    pub fn attributes(&self) -> &[AttributeState] {
        &self.attributes
    }

    /// Look up an attribute by telemetry key.
    pub fn attribute(&self, key: &str) -> Option<&AttributeState> {
        self.attributes.iter().find(|a| a.key() == key)
    }

    /// Enable or disable one attribute by telemetry key.
    pub fn set_attribute_enabled(&mut self, key: &str, enabled: bool) {
        if let Some(state) = self.attributes.iter_mut().find(|a| a.key() == key) {
            state.set_enabled(enabled);
        }
    }

    /// Message from the most recent failure, if the last operation failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Earliest legal time for the next read.
    pub fn next_read_on(&self) -> Timestamp {
        self.schedule.next_read_on()
    }

    /// The read schedule (intervals and floor).
    pub fn schedule(&self) -> &ReadSchedule {
        &self.schedule
    }

    /// Init-time failure: record and park the controller.
    fn fault(&mut self, error: DeviceError) {
        record_error::<()>(&mut self.last_error, &self.sensor_id, error);
        self.phase = Phase::Faulted;
    }
}

/// Store a rendered error message; always yields `None` so call sites can
/// `return record_error(...)`.
fn record_error<T>(
    slot: &mut Option<String<MAX_ERROR>>,
    sensor_id: &InlineString,
    error: DeviceError,
) -> Option<T> {
    let mut message: String<MAX_ERROR> = String::new();
    // Truncation on overflow is acceptable for a diagnostic string.
    let _ = write!(message, "{}", error);
    *slot = Some(message);

    #[cfg(feature = "log")]
    log::warn!("{}: {}", sensor_id, error);
    #[cfg(not(feature = "log"))]
    let _ = sensor_id;

    None
}
