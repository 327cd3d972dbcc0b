//! Sensirion SEN5x-family environmental profile
//!
//! Command/response over the per-word CRC-8 framing. The controller writes
//! the "read measured values" opcode (`0x03C4`), waits out the bus
//! turnaround, and reads back 24 bytes: eight data words, each trailed by
//! its CRC.
//!
//! Word map and datasheet scale divisors:
//!
//! ```text
//!  0  PM1.0          u16 / 10   µg/m³
//!  1  PM2.5          u16 / 10   µg/m³
//!  2  PM4.0          u16 / 10   µg/m³
//!  3  PM10           u16 / 10   µg/m³
//!  4  humidity       i16 / 100  %RH
//!  5  temperature    i16 / 200  °C
//!  6  VOC index      i16 / 10
//!  7  NOx index      i16 / 10
//! ```
//!
//! Unknown values are sentinels on the wire (0xFFFF unsigned, 0x7FFF
//! signed); those slots are simply omitted from the cycle's readings.
//!
//! Dew point and heat index are derived, recomputed only in cycles where
//! temperature and humidity both arrived.

use crate::codec::word_crc::{decode_words, encode_command};
use crate::derived::{dew_point_c, heat_index_c};
use crate::errors::ProtocolResult;
use crate::state::AttributeSpec;

use super::{reading_for, CommandBuf, DeviceProfile, Readings};

/// "Read measured values" opcode.
pub const CMD_READ_MEASUREMENT: u16 = 0x03C4;

/// "Start measurement" opcode, written once at init.
pub const CMD_START_MEASUREMENT: u16 = 0x0021;

/// Response size: eight words, CRC byte per word.
pub const RESPONSE_LEN: usize = 24;

/// New measurement values are produced once per second.
pub const MIN_INTERVAL_MS: u64 = 1_000;

/// Slot indices used by `derive`.
const SLOT_HUMIDITY: usize = 4;
const SLOT_TEMPERATURE: usize = 5;
const SLOT_DEW_POINT: usize = 8;
const SLOT_HEAT_INDEX: usize = 9;

/// SEN5x-family profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sensirion5x;

impl DeviceProfile for Sensirion5x {
    const ATTRIBUTES: &'static [AttributeSpec] = &[
        AttributeSpec::mass_concentration("PM1.0", "pm1", 1),
        AttributeSpec::mass_concentration("PM2.5", "pm25", 1),
        AttributeSpec::mass_concentration("PM4.0", "pm4", 1),
        AttributeSpec::mass_concentration("PM10", "pm10", 1),
        AttributeSpec::humidity(),
        AttributeSpec::temperature(),
        AttributeSpec::index("VOC index", "voc"),
        AttributeSpec::index("NOx index", "nox"),
        AttributeSpec::new("Dew point", "dew", "°C", 1),
        AttributeSpec::new("Heat index", "hidx", "°C", 1),
    ];

    fn response_len(&self) -> usize {
        RESPONSE_LEN
    }

    fn min_interval_ms(&self) -> u64 {
        MIN_INTERVAL_MS
    }

    fn init_command(&self) -> Option<CommandBuf> {
        encode_command(CMD_START_MEASUREMENT, &[]).ok()
    }

    fn poll_command(&self) -> Option<CommandBuf> {
        encode_command(CMD_READ_MEASUREMENT, &[]).ok()
    }

    fn decode(&self, response: &[u8], out: &mut Readings) -> ProtocolResult<()> {
        let words = decode_words::<8>(response)?;

        for (slot, &word) in words.iter().enumerate() {
            let value = match slot {
                0..=3 => {
                    if word == 0xFFFF {
                        continue;
                    }
                    word as f64 / 10.0
                }
                4 => {
                    if word == 0x7FFF {
                        continue;
                    }
                    word as i16 as f64 / 100.0
                }
                5 => {
                    if word == 0x7FFF {
                        continue;
                    }
                    word as i16 as f64 / 200.0
                }
                _ => {
                    if word == 0x7FFF {
                        continue;
                    }
                    word as i16 as f64 / 10.0
                }
            };
            let _ = out.push((slot, value));
        }
        Ok(())
    }

    fn derive(&self, fresh: &Readings, out: &mut Readings) {
        let (Some(temp), Some(rh)) = (
            reading_for(fresh, SLOT_TEMPERATURE),
            reading_for(fresh, SLOT_HUMIDITY),
        ) else {
            return;
        };

        let _ = out.push((SLOT_DEW_POINT, dew_point_c(temp, rh)));
        let _ = out.push((SLOT_HEAT_INDEX, heat_index_c(temp, rh)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::word_crc::crc8;

    /// Build a valid 24-byte response from eight raw words.
    fn response(words: [u16; 8]) -> [u8; RESPONSE_LEN] {
        let mut out = [0u8; RESPONSE_LEN];
        for (i, word) in words.iter().enumerate() {
            let bytes = word.to_be_bytes();
            out[i * 3] = bytes[0];
            out[i * 3 + 1] = bytes[1];
            out[i * 3 + 2] = crc8(&bytes);
        }
        out
    }

    #[test]
    fn applies_datasheet_scaling() {
        // 12.3 µg/m³, 61.2 %RH, 23.4 °C, VOC 100.
        let raw = response([123, 0, 0, 0, 6120, 4680, 1000, 0]);

        let mut readings = Readings::new();
        Sensirion5x.decode(&raw, &mut readings).unwrap();

        assert_eq!(reading_for(&readings, 0), Some(12.3));
        assert_eq!(reading_for(&readings, SLOT_HUMIDITY), Some(61.2));
        assert_eq!(reading_for(&readings, SLOT_TEMPERATURE), Some(23.4));
        assert_eq!(reading_for(&readings, 6), Some(100.0));
    }

    #[test]
    fn unknown_sentinels_omitted() {
        let raw = response([0xFFFF, 123, 0, 0, 0x7FFF, 4680, 0, 0]);

        let mut readings = Readings::new();
        Sensirion5x.decode(&raw, &mut readings).unwrap();

        assert_eq!(reading_for(&readings, 0), None);
        assert_eq!(reading_for(&readings, SLOT_HUMIDITY), None);
        assert_eq!(reading_for(&readings, 1), Some(12.3));
    }

    #[test]
    fn derives_only_with_both_sources() {
        let mut fresh = Readings::new();
        fresh.push((SLOT_TEMPERATURE, 25.0)).unwrap();

        let mut derived = Readings::new();
        Sensirion5x.derive(&fresh, &mut derived);
        assert!(derived.is_empty());

        fresh.push((SLOT_HUMIDITY, 60.0)).unwrap();
        Sensirion5x.derive(&fresh, &mut derived);
        assert_eq!(derived.len(), 2);
        assert!(reading_for(&derived, SLOT_DEW_POINT).is_some());
        assert!(reading_for(&derived, SLOT_HEAT_INDEX).is_some());
    }

    #[test]
    fn poll_and_init_commands() {
        assert_eq!(
            Sensirion5x.poll_command().unwrap().as_slice(),
            &[0x03, 0xC4]
        );
        assert_eq!(
            Sensirion5x.init_command().unwrap().as_slice(),
            &[0x00, 0x21]
        );
    }
}
