//! Property tests for the wire codecs.

use proptest::prelude::*;

use sensorloop_core::codec::sum_frame::{SumFrameCodec, MAX_FRAME};
use sensorloop_core::codec::word_crc::{crc8, decode_words, encode_command};
use sensorloop_core::errors::ProtocolError;

const CODEC: SumFrameCodec = SumFrameCodec::new([0x42, 0x4D]);

proptest! {
    /// Any body that fits a frame survives encode → decode unchanged.
    #[test]
    fn sum_frame_round_trips(body in proptest::collection::vec(any::<u8>(), 0..=MAX_FRAME - 6)) {
        let frame = CODEC.encode(&body).unwrap();
        let decoded = CODEC.decode(&frame).unwrap();
        prop_assert_eq!(decoded, &body[..]);
    }

    /// Flipping any bit of any body byte is always caught by the checksum.
    #[test]
    fn sum_frame_detects_body_tamper(
        body in proptest::collection::vec(any::<u8>(), 1..=MAX_FRAME - 6),
        index in any::<proptest::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut frame = CODEC.encode(&body).unwrap();
        let victim = 4 + index.index(body.len());
        frame[victim] ^= 1 << bit;

        let caught = matches!(
            CODEC.decode(&frame),
            Err(ProtocolError::ChecksumMismatch { .. })
        );
        prop_assert!(caught, "tamper at byte {} bit {} not caught", victim, bit);
    }

    /// Word payloads survive encode_command → decode_words.
    #[test]
    fn word_crc_round_trips(words in proptest::collection::vec(any::<u16>(), 0..=4)) {
        let cmd = encode_command::<16>(0x03C4, &words).unwrap();
        // Strip the two opcode bytes; the rest is a valid word stream.
        let decoded = decode_words::<4>(&cmd[2..]).unwrap();
        prop_assert_eq!(&decoded[..], &words[..]);
    }

    /// Corrupting one CRC byte rejects the whole stream.
    #[test]
    fn word_crc_detects_crc_tamper(
        words in proptest::collection::vec(any::<u16>(), 1..=4),
        which in any::<proptest::sample::Index>(),
    ) {
        let mut stream = Vec::new();
        for word in &words {
            let be = word.to_be_bytes();
            stream.extend_from_slice(&be);
            stream.push(crc8(&be));
        }
        let victim = which.index(words.len()) * 3 + 2;
        stream[victim] ^= 0x01;

        let caught = matches!(
            decode_words::<4>(&stream),
            Err(ProtocolError::ChecksumMismatch { .. })
        );
        prop_assert!(caught, "corrupt crc at byte {} not caught", victim);
    }
}
