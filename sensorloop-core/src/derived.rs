//! Derived Environmental Quantities
//!
//! Dew point and heat index are not measured; they are computed from a
//! temperature/humidity pair read in the same fetch cycle. Both formulas are
//! evaluated directly with libm; at a polling cadence of seconds there is
//! nothing to gain from lookup tables.
//!
//! ## Dew Point (Magnus-Tetens)
//!
//! ```text
//! γ(T,RH) = ln(RH/100) + (a·T)/(b + T)
//! Td      = (b·γ)/(a − γ)        a = 17.27, b = 237.7
//! ```
//!
//! Accurate to ~0.4 °C over 0–60 °C, which is far inside the noise floor of
//! the sensors feeding it.
//!
//! ## Heat Index (Rothfusz regression)
//!
//! The NWS regression is defined in °F and only meaningful for warm air, so
//! below 80 °F the apparent temperature is simply the air temperature.

const MAGNUS_A: f64 = 17.27;
const MAGNUS_B: f64 = 237.7;

/// Dew point in °C from air temperature (°C) and relative humidity (%).
pub fn dew_point_c(temp_c: f64, rh_pct: f64) -> f64 {
    // ln(0) is -inf; clamp humidity to a sliver above zero.
    let rh = (rh_pct / 100.0).clamp(0.001, 1.0);

    let gamma = libm::log(rh) + MAGNUS_A * temp_c / (MAGNUS_B + temp_c);
    MAGNUS_B * gamma / (MAGNUS_A - gamma)
}

/// Heat index (apparent temperature) in °C from air temperature (°C) and
/// relative humidity (%).
pub fn heat_index_c(temp_c: f64, rh_pct: f64) -> f64 {
    let t = temp_c * 9.0 / 5.0 + 32.0;
    if t < 80.0 {
        // Regression not valid below 80 °F.
        return temp_c;
    }
    let rh = rh_pct;

    let hi = -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh;

    (hi - 32.0) * 5.0 / 9.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() <= tolerance
    }

    #[test]
    fn dew_point_reference_points() {
        // 20 °C / 50 % RH → ~9.3 °C (psychrometric chart value).
        assert!(close(dew_point_c(20.0, 50.0), 9.3, 0.3));
        // Saturated air: dew point equals air temperature.
        assert!(close(dew_point_c(25.0, 100.0), 25.0, 0.1));
    }

    #[test]
    fn dew_point_survives_zero_humidity() {
        assert!(dew_point_c(20.0, 0.0).is_finite());
    }

    #[test]
    fn heat_index_reference_point() {
        // NWS chart: 90 °F (32.2 °C) at 60 % RH → ~100 °F (37.8 °C).
        assert!(close(heat_index_c(32.2, 60.0), 37.8, 1.0));
    }

    #[test]
    fn heat_index_passthrough_when_cool() {
        assert_eq!(heat_index_c(21.0, 50.0), 21.0);
    }
}
