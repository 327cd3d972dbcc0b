//! Attribute State: a typed, debounced cell for one measured quantity
//!
//! ## Overview
//!
//! Every measured quantity a sensor exposes (temperature, humidity, a
//! particle count, a distance) is tracked by one [`AttributeState`]. The cell
//! separates two timestamps that are easy to conflate:
//!
//! - `updated_on` advances on *every* successful fetch, whether or not the
//!   value moved;
//! - `state_changed_on` advances only when the value actually differs from
//!   the prior one (debounce: equal readings never produce a change event).
//!
//! A disabled attribute is immutable: [`AttributeState::update`] is a
//! complete no-op, touching neither timestamp.
//!
//! ## Scaled Encoding
//!
//! Telemetry carries integers, not floats: `scaled = rint(value × 10^p)`
//! where `p` is the attribute's precision. Rounding is round-half-to-even
//! (banker's rounding) via `libm::rint`, the same rule everywhere, for every
//! attribute type, so there is no systematic bias and no per-type surprises.
//! Typical precisions: temperature 1, humidity 1, CO₂/particle counts 0,
//! distance 2–3 depending on unit system.

use core::fmt;

use crate::errors::ConfigError;
use crate::time::Timestamp;

/// Maximum inline identifier length (sensor ids and attribute keys).
pub const MAX_INLINE_ID: usize = 15;

/// Largest supported precision for scaled encoding.
pub const MAX_PRECISION: u8 = 6;

/// Powers of ten for scaled encoding, indexed by precision.
const POW10: [f64; MAX_PRECISION as usize + 1] =
    [1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6];

/// Fixed-capacity inline string for identifiers.
///
/// Avoids heap allocation for the short ids and telemetry keys this engine
/// deals in.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineString {
    len: u8,
    data: [u8; MAX_INLINE_ID],
}

impl InlineString {
    /// Create from a string slice; `None` if it does not fit inline.
    pub fn new(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_INLINE_ID {
            return None;
        }

        let mut data = [0u8; MAX_INLINE_ID];
        data[..bytes.len()].copy_from_slice(bytes);

        Some(Self {
            len: bytes.len() as u8,
            data,
        })
    }

    /// View as a string slice.
    pub fn as_str(&self) -> &str {
        // Only whole &str values are stored, so this is always valid UTF-8.
        core::str::from_utf8(&self.data[..self.len as usize]).unwrap_or("")
    }
}

impl fmt::Debug for InlineString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for InlineString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative descriptor for one attribute of a device profile.
///
/// Device quirks live here as data: what a device measures is a `'static`
/// table of specs, not a copied fetch routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttributeSpec {
    /// Display name ("Temperature").
    pub id: &'static str,
    /// Short telemetry token ("t").
    pub key: &'static str,
    /// Unit symbol for display ("°C").
    pub unit: &'static str,
    /// Decimal digits retained by scaled encoding.
    pub precision: u8,
    /// Whether the attribute participates in updates and telemetry.
    pub enabled: bool,
}

impl AttributeSpec {
    /// New enabled attribute.
    pub const fn new(
        id: &'static str,
        key: &'static str,
        unit: &'static str,
        precision: u8,
    ) -> Self {
        Self {
            id,
            key,
            unit,
            precision,
            enabled: true,
        }
    }

    /// Same spec, created disabled.
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Temperature in °C, one decimal (78.3 → 783 in telemetry).
    pub const fn temperature() -> Self {
        Self::new("Temperature", "t", "°C", 1)
    }

    /// Relative humidity in percent, one decimal.
    pub const fn humidity() -> Self {
        Self::new("Humidity", "h", "%", 1)
    }

    /// CO₂ concentration in ppm, whole numbers.
    pub const fn co2() -> Self {
        Self::new("CO2", "co2", "ppm", 0)
    }

    /// Particle count per 0.1 L of air, whole numbers.
    pub const fn particle_count(id: &'static str, key: &'static str) -> Self {
        Self::new(id, key, "/0.1L", 0)
    }

    /// Mass concentration in µg/m³.
    pub const fn mass_concentration(id: &'static str, key: &'static str, precision: u8) -> Self {
        Self::new(id, key, "µg/m³", precision)
    }

    /// Distance in millimetres, two decimals.
    pub const fn distance_mm() -> Self {
        Self::new("Distance", "dist", "mm", 2)
    }

    /// Distance in inches, three decimals.
    pub const fn distance_in() -> Self {
        Self::new("Distance", "dist", "in", 3)
    }

    /// Unitless index (VOC, NOx, AQI), whole numbers.
    pub const fn index(id: &'static str, key: &'static str) -> Self {
        Self::new(id, key, "", 0)
    }

    /// Two-state switch attribute (0 = normal, 1 = faulted).
    pub const fn switch(id: &'static str, key: &'static str) -> Self {
        Self::new(id, key, "", 0)
    }
}

/// Debounced state cell for one measured quantity.
#[derive(Debug, Clone)]
pub struct AttributeState {
    spec: AttributeSpec,
    value: Option<f64>,
    last_value: Option<f64>,
    state_changed_on: Option<Timestamp>,
    updated_on: Option<Timestamp>,
    last_held_ms: u64,
}

impl AttributeState {
    /// Build from a descriptor, validating precision and key length.
    pub fn new(spec: AttributeSpec) -> Result<Self, ConfigError> {
        if spec.precision > MAX_PRECISION {
            return Err(ConfigError::PrecisionOutOfRange {
                precision: spec.precision,
                max: MAX_PRECISION,
            });
        }
        if spec.key.len() > MAX_INLINE_ID {
            return Err(ConfigError::IdTooLong {
                len: spec.key.len(),
                max: MAX_INLINE_ID,
            });
        }

        Ok(Self {
            spec,
            value: None,
            last_value: None,
            state_changed_on: None,
            updated_on: None,
            last_held_ms: 0,
        })
    }

    /// Display name.
    pub fn id(&self) -> &'static str {
        self.spec.id
    }

    /// Short telemetry token.
    pub fn key(&self) -> &'static str {
        self.spec.key
    }

    /// Unit symbol.
    pub fn unit(&self) -> &'static str {
        self.spec.unit
    }

    /// Decimal digits retained by scaled encoding.
    pub fn precision(&self) -> u8 {
        self.spec.precision
    }

    /// Whether updates and telemetry apply to this attribute.
    pub fn is_enabled(&self) -> bool {
        self.spec.enabled
    }

    /// Enable or disable the attribute. Disabling freezes every field.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.spec.enabled = enabled;
    }

    /// Current value in physical units, if one has ever been read.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Value held before the most recent change.
    pub fn last_value(&self) -> Option<f64> {
        self.last_value
    }

    /// Timestamp of the last fetch that touched this attribute.
    pub fn updated_on(&self) -> Option<Timestamp> {
        self.updated_on
    }

    /// Timestamp of the last actual value change.
    pub fn state_changed_on(&self) -> Option<Timestamp> {
        self.state_changed_on
    }

    /// How long the previous value was held before the last change.
    pub fn last_held_ms(&self) -> u64 {
        self.last_held_ms
    }

    /// Apply a freshly-read value. Returns `true` on a real change.
    ///
    /// Semantics, in order:
    /// 1. disabled → complete no-op, `false`;
    /// 2. non-finite → complete no-op, `false` (a NaN or infinity is not a
    ///    reading, so it does not count as a fetch and leaves `updated_on`
    ///    alone);
    /// 3. `updated_on = now`;
    /// 4. equal to the current value (exact compare) → `false`;
    /// 5. otherwise roll `last_value`, record how long it was held, store the
    ///    new value, stamp `state_changed_on`, return `true`.
    ///
    /// The first reading an attribute ever sees counts as a change.
    pub fn update(&mut self, value: f64, now: Timestamp) -> bool {
        if !self.spec.enabled {
            return false;
        }
        if !value.is_finite() {
            return false;
        }

        self.updated_on = Some(now);

        if self.value == Some(value) {
            return false;
        }

        if let (Some(prev), Some(changed_on)) = (self.value, self.state_changed_on) {
            self.last_value = Some(prev);
            self.last_held_ms = now.saturating_sub(changed_on);
        }
        self.value = Some(value);
        self.state_changed_on = Some(now);
        true
    }

    /// Integer telemetry encoding: `rint(value × 10^precision)`.
    ///
    /// Round-half-to-even is the canonical rule for every attribute type;
    /// `libm::rint` implements it under the default rounding mode.
    pub fn scaled(&self) -> Option<i64> {
        let value = self.value?;
        let factor = POW10[self.spec.precision as usize];
        Some(libm::rint(value * factor) as i64)
    }
}

impl fmt::Display for AttributeState {
    /// Renders `value unit` at the attribute's precision, or `-` before the
    /// first reading.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => {
                write!(f, "{:.*}", self.spec.precision as usize, v)?;
                if !self.spec.unit.is_empty() {
                    write!(f, " {}", self.spec.unit)?;
                }
                Ok(())
            }
            None => f.write_str("-"),
        }
    }
}
