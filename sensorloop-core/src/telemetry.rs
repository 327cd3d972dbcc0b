//! Telemetry Sentence Encoder
//!
//! The engine's primary external artifact: a compact, checksummed, delimited
//! sentence built from one sensor's fetch-cycle snapshot.
//!
//! ```text
//! $<epochMs>|<sentenceId>|<key1>:<scaled1>|<key2>:<scaled2>…*<XX>
//! ```
//!
//! Inclusion rule: an attribute is emitted only if it is enabled *and* its
//! `updated_on` equals the snapshot timestamp, meaning it was actually touched in
//! the triggering cycle. A stale attribute is omitted, not zero-filled.
//!
//! The checksum is the XOR of every byte strictly between `$` and `*`,
//! rendered as two uppercase hex digits (the NMEA sentence rule). It
//! protects the telemetry transport; it is deliberately simpler than, and
//! unrelated to, the device-protocol checksums in [`crate::codec`].

use core::fmt::Write as _;

use heapless::String;

use crate::errors::TelemetryError;
use crate::state::AttributeState;
use crate::time::Timestamp;

/// Encode the sentence for `snapshot` from a sensor's attribute arena.
///
/// `N` bounds the sentence; a snapshot that does not fit fails with
/// [`TelemetryError::Overflow`] rather than emitting a torn sentence.
pub fn encode_sentence<const N: usize>(
    sensor_id: &str,
    snapshot: Timestamp,
    attributes: &[AttributeState],
) -> Result<String<N>, TelemetryError> {
    let overflow = TelemetryError::Overflow { capacity: N };

    let mut sentence: String<N> = String::new();
    write!(sentence, "${}|{}", snapshot, sensor_id).map_err(|_| overflow)?;

    for attribute in attributes {
        if !attribute.is_enabled() {
            continue;
        }
        if attribute.updated_on() != Some(snapshot) {
            continue;
        }
        let Some(scaled) = attribute.scaled() else {
            continue;
        };
        write!(sentence, "|{}:{}", attribute.key(), scaled).map_err(|_| overflow)?;
    }

    let checksum = xor_bytes(&sentence.as_bytes()[1..]);
    write!(sentence, "*{:02X}", checksum).map_err(|_| overflow)?;
    Ok(sentence)
}

/// Checksum of a framed sentence: XOR of every byte strictly between the
/// `$` and the `*`. `None` if either delimiter is missing.
pub fn sentence_checksum(sentence: &str) -> Option<u8> {
    let start = sentence.find('$')?;
    let end = sentence[start..].find('*')? + start;
    Some(xor_bytes(&sentence.as_bytes()[start + 1..end]))
}

/// Whether a sentence's trailing two hex digits match its content.
pub fn verify_sentence(sentence: &str) -> bool {
    let Some(computed) = sentence_checksum(sentence) else {
        return false;
    };
    let Some(star) = sentence.rfind('*') else {
        return false;
    };
    let carried = &sentence[star + 1..];
    carried.len() == 2 && u8::from_str_radix(carried, 16) == Ok(computed)
}

fn xor_bytes(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AttributeSpec;

    fn arena() -> [AttributeState; 2] {
        [
            AttributeState::new(AttributeSpec::temperature()).unwrap(),
            AttributeState::new(AttributeSpec::humidity()).unwrap(),
        ]
    }

    #[test]
    fn renders_expected_sentence() {
        // "bme" with t:234 and h:612 at epoch 1000.
        let mut attrs = arena();
        attrs[0].update(23.45, 1_000);
        attrs[1].update(61.2, 1_000);

        let sentence: String<64> = encode_sentence("bme", 1_000, &attrs).unwrap();

        let expected_sum = xor_bytes("1000|bme|t:234|h:612".as_bytes());
        let mut expected: String<64> = String::new();
        write!(expected, "$1000|bme|t:234|h:612*{:02X}", expected_sum).unwrap();
        assert_eq!(sentence, expected);
        assert!(verify_sentence(&sentence));
    }

    #[test]
    fn omits_attributes_not_touched_this_cycle() {
        let mut attrs = arena();
        attrs[0].update(23.45, 1_000);
        attrs[1].update(61.2, 900); // stale

        let sentence: String<64> = encode_sentence("bme", 1_000, &attrs).unwrap();
        assert!(sentence.starts_with("$1000|bme|t:234*"));
    }

    #[test]
    fn omits_disabled_attributes() {
        let mut attrs = arena();
        attrs[0].update(23.45, 1_000);
        attrs[1].update(61.2, 1_000);
        attrs[1].set_enabled(false);

        let sentence: String<64> = encode_sentence("bme", 1_000, &attrs).unwrap();
        assert!(!sentence.contains("h:"));
    }

    #[test]
    fn empty_snapshot_still_frames() {
        let attrs = arena();
        let sentence: String<64> = encode_sentence("bme", 1_000, &attrs).unwrap();
        assert!(sentence.starts_with("$1000|bme*"));
        assert!(verify_sentence(&sentence));
    }

    #[test]
    fn overflow_reported_not_truncated() {
        let mut attrs = arena();
        attrs[0].update(23.45, 1_000);

        let result: Result<String<8>, _> = encode_sentence("bme", 1_000, &attrs);
        assert_eq!(result, Err(TelemetryError::Overflow { capacity: 8 }));
    }

    #[test]
    fn checksum_helper_matches_encoder() {
        let mut attrs = arena();
        attrs[0].update(-5.0, 42);

        let sentence: String<64> = encode_sentence("probe", 42, &attrs).unwrap();
        let star = sentence.rfind('*').unwrap();
        let carried = u8::from_str_radix(&sentence[star + 1..], 16).unwrap();
        assert_eq!(sentence_checksum(&sentence), Some(carried));
    }

    #[test]
    fn tampered_sentence_fails_verification() {
        let mut attrs = arena();
        attrs[0].update(23.45, 1_000);
        let sentence: String<64> = encode_sentence("bme", 1_000, &attrs).unwrap();

        let mut bytes: heapless::Vec<u8, 64> =
            heapless::Vec::from_slice(sentence.as_bytes()).unwrap();
        let colon = sentence.find(':').unwrap();
        bytes[colon + 1] ^= 0x01; // first value digit, still a digit
        let tampered = core::str::from_utf8(&bytes).unwrap();
        assert!(!verify_sentence(tampered));
    }
}
