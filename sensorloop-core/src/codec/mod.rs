//! Wire-Protocol Codecs
//!
//! ## Overview
//!
//! Two framing families cover every device the engine polls:
//!
//! - [`sum_frame`]: fixed two-byte magic, big-endian length field, and a
//!   trailing 16-bit arithmetic-sum checksum. Used by particulate sensors in
//!   the Plantower PMSx003 mold.
//! - [`word_crc`]: command/response exchanges where every big-endian data
//!   word is followed by a CRC-8 byte over those two bytes. Used by
//!   Sensirion-style environmental sensors.
//!
//! ## Design Rules
//!
//! Both codecs are pure functions of their input buffer: no side effects, no
//! retained state. That keeps them independently testable without hardware
//! and safe to call from any context.
//!
//! Decoding is all-or-nothing. Nothing is handed to the caller until the
//! whole frame (or every triplet of the response) has validated; a single bad
//! byte fails the entire decode with a typed
//! [`ProtocolError`](crate::errors::ProtocolError).

pub mod sum_frame;
pub mod word_crc;

pub use sum_frame::SumFrameCodec;
pub use word_crc::{crc8, decode_words, encode_command};
