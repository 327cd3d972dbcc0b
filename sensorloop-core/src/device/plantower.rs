//! Plantower PMSx003-family particulate profile
//!
//! 32-byte response over the sum-checksum framing: magic `0x42 0x4D`,
//! declared length 28, thirteen big-endian body words, the last of which
//! packs firmware version and error code and is not a measurement.
//!
//! Word map (body word index → attribute):
//!
//! ```text
//!  0  PM1.0  standard      6  particles > 0.3 µm
//!  1  PM2.5  standard      7  particles > 0.5 µm
//!  2  PM10   standard      8  particles > 1.0 µm
//!  3  PM1.0  atmospheric   9  particles > 2.5 µm
//!  4  PM2.5  atmospheric  10  particles > 5.0 µm
//!  5  PM10   atmospheric  11  particles > 10 µm
//! ```
//!
//! Every word maps to its own attribute slot. Counts are per 0.1 L of air;
//! concentrations are µg/m³.
//!
//! The sensor needs ~2.3 s between stable readings (its fan-driven sampling
//! interval), so the profile floors the read schedule there.

use crate::codec::sum_frame::{be_word, SumFrameCodec};
use crate::errors::ProtocolResult;
use crate::state::AttributeSpec;

use super::{DeviceProfile, Readings};

/// Frame magic fixed by the manufacturer.
pub const MAGIC: [u8; 2] = [0x42, 0x4D];

/// Full response size on the wire.
pub const RESPONSE_LEN: usize = 32;

/// Stable-mode sampling interval.
pub const MIN_INTERVAL_MS: u64 = 2_300;

/// Measurement words per response (word 12 is version/error, not data).
const DATA_WORDS: usize = 12;

/// PMSx003-family profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plantower;

impl Plantower {
    const CODEC: SumFrameCodec = SumFrameCodec::new(MAGIC);
}

impl DeviceProfile for Plantower {
    const ATTRIBUTES: &'static [AttributeSpec] = &[
        AttributeSpec::mass_concentration("PM1.0", "pm1", 0),
        AttributeSpec::mass_concentration("PM2.5", "pm25", 0),
        AttributeSpec::mass_concentration("PM10", "pm10", 0),
        AttributeSpec::mass_concentration("PM1.0 ambient", "epm1", 0),
        AttributeSpec::mass_concentration("PM2.5 ambient", "epm25", 0),
        AttributeSpec::mass_concentration("PM10 ambient", "epm10", 0),
        AttributeSpec::particle_count("Particles >0.3um", "p03"),
        AttributeSpec::particle_count("Particles >0.5um", "p05"),
        AttributeSpec::particle_count("Particles >1.0um", "p10"),
        AttributeSpec::particle_count("Particles >2.5um", "p25"),
        AttributeSpec::particle_count("Particles >5.0um", "p50"),
        AttributeSpec::particle_count("Particles >10um", "p100"),
    ];

    fn response_len(&self) -> usize {
        RESPONSE_LEN
    }

    fn min_interval_ms(&self) -> u64 {
        MIN_INTERVAL_MS
    }

    fn decode(&self, response: &[u8], out: &mut Readings) -> ProtocolResult<()> {
        let body = Self::CODEC.decode(response)?;

        for slot in 0..DATA_WORDS {
            if let Some(word) = be_word(body, slot) {
                let _ = out.push((slot, word as f64));
            }
        }
        Ok(())
    }
}
