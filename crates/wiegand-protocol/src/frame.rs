//! Frame classification and the polled frame decoder.
//!
//! The decoder never touches the interrupt-shared accumulator directly. The
//! caller hands it a [`BitSnapshot`] taken in one critical section, and the
//! returned [`DecodeStep`] says whether the caller must clear the
//! accumulator.
//!
//! # Classification
//!
//! On every poll the snapshot is classified, in this order:
//!
//! 1. **Keypad entry**: the bit count is a positive multiple of 4 and the last
//!    nibble is the `#` terminator (11). The terminator is shifted out and the
//!    remaining nibbles are the keys.
//! 2. **Data frame**: the bit count equals the configured frame width. The
//!    trailing parity bit is shifted out and the value is masked to
//!    `width - 2` bits, dropping the leading parity bit.
//! 3. **Partial**: anything else. The decoder counts consecutive partial polls
//!    and gives up on the frame once the count exceeds the timeout limit.
//!
//! # Examples
//!
//! ```
//! use wiegand_protocol::{BitSnapshot, DecodeStep, FrameDecoder, FrameKind};
//!
//! let mut decoder = FrameDecoder::new(26, 10);
//!
//! // Keys 1, 2 followed by '#'
//! let snapshot = BitSnapshot::new(0x12B, 12);
//! match decoder.decode(snapshot) {
//!     DecodeStep::Complete(frame) => {
//!         assert_eq!(frame.kind, FrameKind::Keypad);
//!         assert_eq!(frame.value, 0x12);
//!     }
//!     other => panic!("unexpected step: {other:?}"),
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use wiegand_core::WiegandConfig;
use wiegand_core::constants::{DEFAULT_TIMEOUT_LIMIT, KEYPAD_NIBBLE_BITS, KEYPAD_TERMINATOR};

use crate::hex::cast_hex_as_dec;
use crate::parity::{low_mask, verify};

/// Consistent copy of the accumulator taken by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitSnapshot {
    /// Accumulated bits, newest bit in bit 0.
    pub bits: u64,
    /// Number of meaningful low bits in `bits`.
    pub count: u8,
}

impl BitSnapshot {
    #[must_use]
    pub const fn new(bits: u64, count: u8) -> Self {
        Self { bits, count }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl fmt::Display for BitSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x} ({} bits)", self.bits, self.count)
    }
}

/// Kind of a completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// Card data frame with both parity bits stripped.
    Data,
    /// Keypad digits terminated by `#`.
    Keypad,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Data => write!(f, "Tag"),
            FrameKind::Keypad => write!(f, "Keypad"),
        }
    }
}

/// Result of classifying a snapshot against a frame width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Keypad digits with the terminator removed.
    Keypad { value: u64 },
    /// Data frame payload and the mask that extracted it.
    Data { value: u64, mask: u64 },
    /// Not (yet) a complete frame.
    Partial,
}

/// Classify `snapshot` as a keypad entry, a data frame or a partial frame.
#[must_use]
pub fn classify(snapshot: BitSnapshot, frame_width: u8) -> Classification {
    let BitSnapshot { bits, count } = snapshot;

    if count > 0 && count % KEYPAD_NIBBLE_BITS == 0 && bits & 0xF == KEYPAD_TERMINATOR {
        return Classification::Keypad {
            value: bits >> KEYPAD_NIBBLE_BITS,
        };
    }

    if count == frame_width {
        let mask = low_mask(u32::from(frame_width.saturating_sub(2)));
        return Classification::Data {
            value: (bits >> 1) & mask,
            mask,
        };
    }

    Classification::Partial
}

/// A frame decoded by [`FrameDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Decoded value, after the optional hex-as-decimal transform.
    pub value: u64,
    pub kind: FrameKind,
    /// Bits that made up the frame, including parity or terminator.
    pub bit_count: u8,
    /// Mask applied to a data frame (zero for keypad entries).
    pub mask: u64,
}

/// Outcome of one decoder poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStep {
    /// No bits accumulated.
    Idle,
    /// Partial frame, still within the timeout limit.
    Pending { timeouts: u8 },
    /// Partial frame abandoned after exceeding the timeout limit. The caller
    /// must clear the accumulator.
    Stale { bit_count: u8 },
    /// Data frame whose parity bits did not verify. The caller must clear the
    /// accumulator.
    ParityError { raw: u64, bit_count: u8 },
    /// Completed frame. The caller must clear the accumulator.
    Complete(DecodedFrame),
}

impl DecodeStep {
    /// Whether the caller must clear the accumulator after this step.
    #[must_use]
    pub fn clears_accumulator(&self) -> bool {
        matches!(
            self,
            DecodeStep::Stale { .. } | DecodeStep::ParityError { .. } | DecodeStep::Complete(_)
        )
    }
}

/// Polled frame decoder holding the timeout counter between polls.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    frame_width: u8,
    timeout_limit: u8,
    hex_as_dec: bool,
    verify_parity: bool,
    timeouts: u8,
}

impl FrameDecoder {
    /// Create a decoder for `frame_width`-bit data frames.
    #[must_use]
    pub fn new(frame_width: u8, timeout_limit: u8) -> Self {
        Self {
            frame_width,
            timeout_limit,
            hex_as_dec: false,
            verify_parity: false,
            timeouts: 0,
        }
    }

    /// Create a decoder from a validated configuration.
    #[must_use]
    pub fn from_config(config: &WiegandConfig) -> Self {
        Self::new(config.frame_width, config.timeout_limit)
            .with_hex_as_dec(config.hex_as_dec)
            .with_parity_check(config.verify_parity)
    }

    #[must_use]
    pub fn with_hex_as_dec(mut self, enabled: bool) -> Self {
        self.hex_as_dec = enabled;
        self
    }

    #[must_use]
    pub fn with_parity_check(mut self, enabled: bool) -> Self {
        self.verify_parity = enabled;
        self
    }

    #[must_use]
    pub fn frame_width(&self) -> u8 {
        self.frame_width
    }

    /// Consecutive partial polls seen so far.
    #[must_use]
    pub fn timeouts(&self) -> u8 {
        self.timeouts
    }

    /// Forget the partial-poll count.
    pub fn reset(&mut self) {
        self.timeouts = 0;
    }

    /// Decode one poll's snapshot.
    pub fn decode(&mut self, snapshot: BitSnapshot) -> DecodeStep {
        if snapshot.is_empty() {
            return DecodeStep::Idle;
        }

        let (kind, value, mask) = match classify(snapshot, self.frame_width) {
            Classification::Keypad { value } => (FrameKind::Keypad, value, 0),
            Classification::Data { value, mask } => {
                if self.verify_parity && !verify(snapshot.bits, self.frame_width) {
                    self.timeouts = 0;
                    return DecodeStep::ParityError {
                        raw: snapshot.bits,
                        bit_count: snapshot.count,
                    };
                }
                (FrameKind::Data, value, mask)
            }
            Classification::Partial => {
                self.timeouts = self.timeouts.saturating_add(1);
                if self.timeouts > self.timeout_limit {
                    self.timeouts = 0;
                    return DecodeStep::Stale {
                        bit_count: snapshot.count,
                    };
                }
                return DecodeStep::Pending {
                    timeouts: self.timeouts,
                };
            }
        };

        self.timeouts = 0;
        let value = if self.hex_as_dec {
            cast_hex_as_dec(value)
        } else {
            value
        };

        DecodeStep::Complete(DecodedFrame {
            value,
            kind,
            bit_count: snapshot.count,
            mask,
        })
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(WiegandConfig::default().frame_width, DEFAULT_TIMEOUT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parity::Wiegand26;
    use rstest::rstest;
    use wiegand_core::Payload24;

    #[test]
    fn test_empty_snapshot_is_idle() {
        let mut decoder = FrameDecoder::default();
        assert_eq!(decoder.decode(BitSnapshot::default()), DecodeStep::Idle);
        assert_eq!(decoder.timeouts(), 0);
    }

    #[test]
    fn test_data_frame_strips_parity() {
        let frame = Wiegand26::new(Payload24::new(0x12_3456).unwrap());
        let mut decoder = FrameDecoder::new(26, 10);

        let step = decoder.decode(BitSnapshot::new(frame.raw(), 26));
        let DecodeStep::Complete(decoded) = step else {
            panic!("expected complete frame, got {step:?}");
        };
        assert_eq!(decoded.value, 0x12_3456);
        assert_eq!(decoded.kind, FrameKind::Data);
        assert_eq!(decoded.mask, 0xFF_FFFF);
        assert_eq!(decoded.bit_count, 26);
        assert!(step.clears_accumulator());
    }

    #[test]
    fn test_data_frame_masks_leading_parity() {
        let mut decoder = FrameDecoder::new(26, 10);
        let all_ones = (1u64 << 26) - 1;
        let DecodeStep::Complete(decoded) = decoder.decode(BitSnapshot::new(all_ones, 26)) else {
            panic!("expected complete frame");
        };
        assert_eq!(decoded.value, 0xFF_FFFF);
    }

    #[rstest]
    #[case(0x1B, 8, 0x1)]
    #[case(0x12B, 12, 0x12)]
    #[case(0x1234B, 20, 0x1234)]
    #[case(0xB, 4, 0x0)]
    fn test_keypad_terminator(#[case] bits: u64, #[case] count: u8, #[case] expected: u64) {
        let mut decoder = FrameDecoder::new(26, 10);
        let DecodeStep::Complete(decoded) = decoder.decode(BitSnapshot::new(bits, count)) else {
            panic!("expected keypad entry");
        };
        assert_eq!(decoded.kind, FrameKind::Keypad);
        assert_eq!(decoded.value, expected);
        assert_eq!(decoded.mask, 0);
    }

    #[test]
    fn test_keypad_checked_before_data_frame() {
        // A 32-bit frame ending in 0xB reads as a keypad entry.
        let mut decoder = FrameDecoder::new(32, 10);
        let DecodeStep::Complete(decoded) = decoder.decode(BitSnapshot::new(0x1234_567B, 32))
        else {
            panic!("expected keypad entry");
        };
        assert_eq!(decoded.kind, FrameKind::Keypad);
        assert_eq!(decoded.value, 0x123_4567);
    }

    #[test]
    fn test_terminator_needs_whole_nibbles() {
        assert_eq!(classify(BitSnapshot::new(0x1B, 6), 26), Classification::Partial);
    }

    #[test]
    fn test_hex_as_dec_applied_to_keypad() {
        let mut decoder = FrameDecoder::new(26, 10).with_hex_as_dec(true);
        let DecodeStep::Complete(decoded) = decoder.decode(BitSnapshot::new(0x1234B, 20)) else {
            panic!("expected keypad entry");
        };
        assert_eq!(decoded.value, 1234);
    }

    #[test]
    fn test_partial_frame_times_out_after_limit() {
        let mut decoder = FrameDecoder::new(26, 10);
        let partial = BitSnapshot::new(0b101, 3);

        for poll in 1..=10 {
            assert_eq!(
                decoder.decode(partial),
                DecodeStep::Pending { timeouts: poll }
            );
        }

        let step = decoder.decode(partial);
        assert_eq!(step, DecodeStep::Stale { bit_count: 3 });
        assert!(step.clears_accumulator());
        assert_eq!(decoder.timeouts(), 0);
    }

    #[test]
    fn test_completion_resets_timeouts() {
        let mut decoder = FrameDecoder::new(26, 10);
        decoder.decode(BitSnapshot::new(0b1, 1));
        decoder.decode(BitSnapshot::new(0b1, 1));
        assert_eq!(decoder.timeouts(), 2);

        decoder.decode(BitSnapshot::new(0xB, 4));
        assert_eq!(decoder.timeouts(), 0);
    }

    #[test]
    fn test_parity_check_rejects_corrupt_frame() {
        let frame = Wiegand26::new(Payload24::new(42).unwrap());
        let mut decoder = FrameDecoder::new(26, 10).with_parity_check(true);

        let corrupt = frame.raw() ^ 0b10;
        assert_eq!(
            decoder.decode(BitSnapshot::new(corrupt, 26)),
            DecodeStep::ParityError {
                raw: corrupt,
                bit_count: 26
            }
        );

        let DecodeStep::Complete(decoded) = decoder.decode(BitSnapshot::new(frame.raw(), 26))
        else {
            panic!("expected complete frame");
        };
        assert_eq!(decoded.value, 42);
    }

    #[test]
    fn test_parity_check_off_accepts_corrupt_frame() {
        let frame = Wiegand26::new(Payload24::new(42).unwrap());
        let mut decoder = FrameDecoder::new(26, 10);
        let step = decoder.decode(BitSnapshot::new(frame.raw() ^ 1, 26));
        assert!(matches!(step, DecodeStep::Complete(_)));
    }

    #[test]
    fn test_full_width_mask() {
        let mut decoder = FrameDecoder::new(64, 10);
        let DecodeStep::Complete(decoded) = decoder.decode(BitSnapshot::new(u64::MAX, 64)) else {
            panic!("expected complete frame");
        };
        assert_eq!(decoded.mask, (1u64 << 62) - 1);
        assert_eq!(decoded.value, (1u64 << 62) - 1);
    }
}
