//! Per-word CRC-8 framing (Sensirion command/response family)
//!
//! Responses interleave a CRC-8 byte after every big-endian data word:
//!
//! ```text
//! ┌──────┬──────┬─────┬──────┬──────┬─────┬───
//! │ hi₀  │ lo₀  │ crc₀│ hi₁  │ lo₁  │ crc₁│ …
//! └──────┴──────┴─────┴──────┴──────┴─────┴───
//! ```
//!
//! Each CRC covers exactly its two preceding bytes. Every triplet is
//! validated independently, but a single bad triplet invalidates the whole
//! response: the caller either gets every word or none.
//!
//! Commands are symmetric: a big-endian 16-bit opcode, optionally followed by
//! payload words with their CRC bytes interleaved under the same rule. The
//! opcode itself carries no CRC.
//!
//! CRC-8 parameters (as on SHT4x/SCD4x/SEN5x parts): polynomial 0x31,
//! initial value 0xFF, no reflection, no final XOR.

use heapless::Vec;

use crate::errors::{ProtocolError, ProtocolResult};

/// CRC-8 generator polynomial.
pub const CRC8_POLY: u8 = 0x31;

/// CRC-8 initial value.
pub const CRC8_INIT: u8 = 0xFF;

/// CRC-8 over `data` with the family parameters.
///
/// Bitwise rather than table-driven: responses are a handful of bytes at a
/// polling cadence of seconds, so 256 bytes of table buys nothing here.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Validate every triplet of `buf` and return the data words.
///
/// Fails with [`ProtocolError::Truncated`] when the buffer is not a whole
/// number of triplets (or holds more words than `N`), and with
/// [`ProtocolError::ChecksumMismatch`] on the first bad CRC.
pub fn decode_words<const N: usize>(buf: &[u8]) -> ProtocolResult<Vec<u16, N>> {
    if buf.len() % 3 != 0 {
        return Err(ProtocolError::Truncated {
            needed: buf.len() + (3 - buf.len() % 3),
            have: buf.len(),
        });
    }
    if buf.len() / 3 > N {
        return Err(ProtocolError::Truncated {
            needed: buf.len(),
            have: N * 3,
        });
    }

    // Validate everything before surfacing anything.
    for triplet in buf.chunks_exact(3) {
        let computed = crc8(&triplet[..2]);
        if computed != triplet[2] {
            return Err(ProtocolError::ChecksumMismatch {
                expected: triplet[2] as u16,
                computed: computed as u16,
            });
        }
    }

    let mut words: Vec<u16, N> = Vec::new();
    for triplet in buf.chunks_exact(3) {
        // Count checked above.
        let _ = words.push(u16::from_be_bytes([triplet[0], triplet[1]]));
    }
    Ok(words)
}

/// Encode a command: big-endian opcode, then payload words with interleaved
/// CRC bytes.
pub fn encode_command<const N: usize>(opcode: u16, words: &[u16]) -> ProtocolResult<Vec<u8, N>> {
    let needed = 2 + words.len() * 3;
    if needed > N {
        return Err(ProtocolError::Truncated { needed, have: N });
    }

    let mut out: Vec<u8, N> = Vec::new();
    let _ = out.extend_from_slice(&opcode.to_be_bytes());
    for &word in words {
        let bytes = word.to_be_bytes();
        let _ = out.extend_from_slice(&bytes);
        let _ = out.push(crc8(&bytes));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc8_known_vector() {
        // Canonical check value from the Sensirion datasheets.
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn decode_valid_response() {
        let buf = [0xBE, 0xEF, 0x92, 0x00, 0x00, crc8(&[0x00, 0x00])];
        let words: Vec<u16, 4> = decode_words(&buf).unwrap();
        assert_eq!(words.as_slice(), &[0xBEEF, 0x0000]);
    }

    #[test]
    fn one_bad_triplet_fails_whole_response() {
        let mut buf = [0xBE, 0xEF, 0x92, 0x12, 0x34, crc8(&[0x12, 0x34])];
        buf[3] ^= 0x40; // corrupt the second word, first stays valid
        let result: ProtocolResult<Vec<u16, 4>> = decode_words(&buf);
        assert!(matches!(
            result,
            Err(ProtocolError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn ragged_length_rejected() {
        let result: ProtocolResult<Vec<u16, 4>> = decode_words(&[0xBE, 0xEF]);
        assert_eq!(
            result,
            Err(ProtocolError::Truncated { needed: 3, have: 2 })
        );
    }

    #[test]
    fn encode_bare_opcode() {
        let cmd: Vec<u8, 8> = encode_command(0x03C4, &[]).unwrap();
        assert_eq!(cmd.as_slice(), &[0x03, 0xC4]);
    }

    #[test]
    fn encode_interleaves_crc() {
        let cmd: Vec<u8, 8> = encode_command(0x2400, &[0xBEEF]).unwrap();
        assert_eq!(cmd.as_slice(), &[0x24, 0x00, 0xBE, 0xEF, 0x92]);
    }

    #[test]
    fn command_round_trips_through_decode() {
        // Payload portion of an encoded command is itself valid triplets.
        let cmd: Vec<u8, 16> = encode_command(0x2400, &[0x1234, 0xABCD]).unwrap();
        let words: Vec<u16, 4> = decode_words(&cmd[2..]).unwrap();
        assert_eq!(words.as_slice(), &[0x1234, 0xABCD]);
    }
}
