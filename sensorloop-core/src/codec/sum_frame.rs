//! Fixed-magic, sum-checksum framing (Plantower PMSx003 family)
//!
//! Frame layout, all multi-byte fields big-endian:
//!
//! ```text
//! ┌───────┬───────┬──────────┬───────────────┬────────────┐
//! │ magic │ magic │ length   │ body          │ checksum   │
//! │ byte0 │ byte1 │ u16 BE   │ length-2 bytes│ u16 BE     │
//! └───────┴───────┴──────────┴───────────────┴────────────┘
//! ```
//!
//! The length field counts everything after itself, checksum included, so a
//! 32-byte particulate frame declares 28. The checksum is the arithmetic sum
//! (mod 65536) of every byte preceding it, magic and length field included.
//!
//! Validation order is magic, then declared length against the buffer, then
//! checksum. The body slice is only handed out once the whole frame checks
//! out; no field is ever applied from a frame that failed validation.

use heapless::Vec;

use crate::errors::{ProtocolError, ProtocolResult};

/// Largest frame either direction of this family can carry.
pub const MAX_FRAME: usize = 64;

/// Smallest possible frame: magic (2) + length (2) + checksum (2).
const MIN_FRAME: usize = 6;

/// Codec for one magic pair.
///
/// Stateless; a single instance can validate frames from any number of
/// devices of the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumFrameCodec {
    magic: [u8; 2],
}

impl SumFrameCodec {
    /// Codec for frames starting with `magic`.
    pub const fn new(magic: [u8; 2]) -> Self {
        Self { magic }
    }

    /// The magic pair this codec expects, packed big-endian.
    pub const fn magic_word(&self) -> u16 {
        u16::from_be_bytes(self.magic)
    }

    /// Validate `buf` and return the body slice (checksum excluded).
    ///
    /// Trailing bytes beyond the declared frame are ignored, so a fixed-size
    /// bus read larger than the frame is fine.
    pub fn decode<'a>(&self, buf: &'a [u8]) -> ProtocolResult<&'a [u8]> {
        if buf.len() < MIN_FRAME {
            return Err(ProtocolError::Truncated {
                needed: MIN_FRAME,
                have: buf.len(),
            });
        }

        if buf[0] != self.magic[0] || buf[1] != self.magic[1] {
            return Err(ProtocolError::BadMagic {
                expected: self.magic_word(),
                found: u16::from_be_bytes([buf[0], buf[1]]),
            });
        }

        let declared = u16::from_be_bytes([buf[2], buf[3]]) as usize;
        let total = 4 + declared;
        if declared < 2 || buf.len() < total {
            return Err(ProtocolError::Truncated {
                needed: total.max(MIN_FRAME),
                have: buf.len(),
            });
        }

        let expected = u16::from_be_bytes([buf[total - 2], buf[total - 1]]);
        let computed = sum16(&buf[..total - 2]);
        if computed != expected {
            return Err(ProtocolError::ChecksumMismatch {
                expected,
                computed,
            });
        }

        Ok(&buf[4..total - 2])
    }

    /// Frame `body` with magic, length, and checksum.
    ///
    /// Fails with [`ProtocolError::Truncated`] if the framed result would not
    /// fit [`MAX_FRAME`]; encode and decode share one bounded-buffer
    /// discipline.
    pub fn encode(&self, body: &[u8]) -> ProtocolResult<Vec<u8, MAX_FRAME>> {
        let total = 4 + body.len() + 2;
        if total > MAX_FRAME {
            return Err(ProtocolError::Truncated {
                needed: total,
                have: MAX_FRAME,
            });
        }

        let mut frame: Vec<u8, MAX_FRAME> = Vec::new();
        // Capacity checked above; these pushes cannot fail.
        let _ = frame.extend_from_slice(&self.magic);
        let _ = frame.extend_from_slice(&((body.len() + 2) as u16).to_be_bytes());
        let _ = frame.extend_from_slice(body);
        let checksum = sum16(&frame);
        let _ = frame.extend_from_slice(&checksum.to_be_bytes());

        Ok(frame)
    }
}

/// Arithmetic sum of `bytes`, mod 65536.
fn sum16(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16))
}

/// Big-endian 16-bit word at word index `index` of a decoded body.
pub fn be_word(body: &[u8], index: usize) -> Option<u16> {
    let offset = index * 2;
    let bytes = body.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGIC: [u8; 2] = [0x42, 0x4D];

    fn codec() -> SumFrameCodec {
        SumFrameCodec::new(MAGIC)
    }

    fn particulate_frame() -> Vec<u8, MAX_FRAME> {
        // 13 body words, as a PMSx003 sends: declared length 28, 32 total.
        let mut body = [0u8; 26];
        for (i, chunk) in body.chunks_exact_mut(2).enumerate() {
            chunk.copy_from_slice(&(i as u16 * 7).to_be_bytes());
        }
        codec().encode(&body).unwrap()
    }

    #[test]
    fn round_trip() {
        let body = [0x01, 0x02, 0xFF, 0x00];
        let frame = codec().encode(&body).unwrap();
        assert_eq!(codec().decode(&frame).unwrap(), &body);
    }

    #[test]
    fn declared_length_counts_checksum() {
        let frame = particulate_frame();
        assert_eq!(frame.len(), 32);
        assert_eq!(u16::from_be_bytes([frame[2], frame[3]]), 28);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut frame = particulate_frame();
        frame[0] = 0x16;
        assert_eq!(
            codec().decode(&frame),
            Err(ProtocolError::BadMagic {
                expected: 0x424D,
                found: 0x164D,
            })
        );
    }

    #[test]
    fn short_buffer_rejected() {
        let frame = particulate_frame();
        let err = codec().decode(&frame[..20]).unwrap_err();
        assert_eq!(err, ProtocolError::Truncated { needed: 32, have: 20 });
    }

    #[test]
    fn corrupt_checksum_field_rejected() {
        // Declared length 28, 30-byte sum region, only the
        // trailing checksum mutated.
        let mut frame = particulate_frame();
        let last = frame.len() - 1;
        frame[last] = frame[last].wrapping_add(1);
        assert!(matches!(
            codec().decode(&frame),
            Err(ProtocolError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn corrupt_body_byte_rejected() {
        let mut frame = particulate_frame();
        frame[10] ^= 0x01;
        assert!(matches!(
            codec().decode(&frame),
            Err(ProtocolError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn trailing_garbage_ignored() {
        let mut frame = particulate_frame();
        frame.extend_from_slice(&[0xAA, 0xBB]).unwrap();
        assert_eq!(codec().decode(&frame).unwrap().len(), 26);
    }

    #[test]
    fn body_words_are_big_endian() {
        let frame = particulate_frame();
        let body = codec().decode(&frame).unwrap();
        assert_eq!(be_word(body, 0), Some(0));
        assert_eq!(be_word(body, 3), Some(21));
        assert_eq!(be_word(body, 13), None);
    }

    #[test]
    fn oversized_body_rejected() {
        let body = [0u8; MAX_FRAME];
        assert!(matches!(
            codec().encode(&body),
            Err(ProtocolError::Truncated { .. })
        ));
    }
}
