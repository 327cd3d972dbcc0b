//! Interrupt-Capable Digital Input Attribute
//!
//! Simple two-state sensors (door contacts, motion detectors, break-glass
//! loops) are read two ways at once: polled like everything else, and
//! updated from an edge interrupt delivered on provider infrastructure's
//! thread. Both paths go through the same mutex-guarded
//! [`AttributeState`], so the `(value, state_changed_on)` pair is updated
//! atomically and never observed torn.
//!
//! ## Fault Polarity
//!
//! One convention, applied uniformly: a sample is **faulted** iff the
//! electrical level equals the polarity's active level. A normally-open
//! switch behind a pull-up resistor is `ActiveLow`: the line resting high
//! is normal, pulled low is fault. There is no other sign logic anywhere.
//!
//! The attribute value encodes 0.0 = normal, 1.0 = faulted, precision 0.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::bus::{Edge, EdgeSource};
use crate::errors::{BusError, ConfigError};
use crate::state::{AttributeSpec, AttributeState, InlineString, MAX_INLINE_ID};
use crate::time::{Clock, Timestamp};

/// Which electrical level means "faulted".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolarity {
    /// High level is the fault state.
    ActiveHigh,
    /// Low level is the fault state (normally-open switch on a pull-up).
    ActiveLow,
}

impl FaultPolarity {
    /// Apply the convention to a sampled level (`true` = high).
    pub fn is_faulted(self, level_high: bool) -> bool {
        match self {
            Self::ActiveHigh => level_high,
            Self::ActiveLow => !level_high,
        }
    }
}

/// A two-state sensor whose attribute may be updated from both the polling
/// loop and an edge callback.
pub struct DigitalInput {
    sensor_id: InlineString,
    polarity: FaultPolarity,
    normal_label: &'static str,
    fault_label: &'static str,
    state: Arc<Mutex<AttributeState>>,
}

impl DigitalInput {
    /// Build from an attribute descriptor (usually [`AttributeSpec::switch`]).
    pub fn new(
        sensor_id: &str,
        spec: AttributeSpec,
        polarity: FaultPolarity,
    ) -> Result<Self, ConfigError> {
        let sensor_id = InlineString::new(sensor_id).ok_or(ConfigError::IdTooLong {
            len: sensor_id.len(),
            max: MAX_INLINE_ID,
        })?;

        Ok(Self {
            sensor_id,
            polarity,
            normal_label: "Off",
            fault_label: "On",
            state: Arc::new(Mutex::new(AttributeState::new(spec)?)),
        })
    }

    /// Override the display labels ("Closed"/"Open", "Clear"/"Motion", …).
    pub fn with_labels(mut self, normal: &'static str, fault: &'static str) -> Self {
        self.normal_label = normal;
        self.fault_label = fault;
        self
    }

    /// Apply a polled level sample. Returns `true` on a real change.
    pub fn sample(&self, level_high: bool, now: Timestamp) -> bool {
        let faulted = self.polarity.is_faulted(level_high);
        self.lock().update(if faulted { 1.0 } else { 0.0 }, now)
    }

    /// Register the interrupt path on `gpio`.
    ///
    /// The callback goes through the same mutex as [`sample`](Self::sample)
    /// and does nothing else; listeners wanting to react should drain a
    /// change queue, not run inline.
    pub fn attach<E, C>(&self, gpio: &mut E, pin: u8, clock: C) -> Result<(), BusError>
    where
        E: EdgeSource,
        C: Clock + Send + 'static,
    {
        let shared = Arc::clone(&self.state);
        let polarity = self.polarity;

        gpio.register_edge_callback(
            pin,
            Edge::Both,
            Box::new(move |level_high| {
                let now = clock.now();
                let faulted = polarity.is_faulted(level_high);
                let mut state = match shared.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                state.update(if faulted { 1.0 } else { 0.0 }, now);
            }),
        )
    }

    /// Whether the last observed level was the fault state.
    pub fn is_faulted(&self) -> bool {
        self.lock().value() == Some(1.0)
    }

    /// Display label for the current state.
    pub fn state_label(&self) -> &'static str {
        if self.is_faulted() {
            self.fault_label
        } else {
            self.normal_label
        }
    }

    /// Sensor identifier.
    pub fn sensor_id(&self) -> &str {
        self.sensor_id.as_str()
    }

    /// Copy of the attribute for telemetry snapshots.
    pub fn snapshot(&self) -> AttributeState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, AttributeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            // A poisoned attribute is still just a value cell; keep going.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
