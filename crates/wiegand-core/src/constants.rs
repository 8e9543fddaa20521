//! Core constants for the Wiegand reader and writer.
//!
//! This module defines the protocol-level constants used throughout the
//! workspace: frame geometry, keypad framing, decoder timeouts and the pulse
//! timing used when writing a frame onto the wire.
//!
//! # Frame Structure
//!
//! A standard 26-bit Wiegand frame looks like this on the wire:
//!
//! ```text
//! | E | F F F F F F F F F F F F | C C C C C C C C C C C C | O |
//!   ^   first half (12 bits)      second half (12 bits)     ^
//!   even parity over first half                 odd parity over second half
//! ```
//!
//! Wider formats keep the same layout: one leading even parity bit, the data
//! bits, one trailing odd parity bit.
//!
//! # Usage
//!
//! ```
//! use wiegand_core::constants::*;
//!
//! assert_eq!(DEFAULT_FRAME_WIDTH - 2, WIEGAND26_PAYLOAD_BITS);
//! assert!(MAX_FRAME_WIDTH as u32 <= u64::BITS);
//! ```

// ============================================================================
// Frame Geometry
// ============================================================================

/// Width in bits of the accumulator shift register.
///
/// Edges that would push the bit count past this width force a reset of the
/// accumulator before the new bit is stored.
pub const BUFFER_BITS: u8 = 64;

/// Default data frame width (classic 26-bit format).
pub const DEFAULT_FRAME_WIDTH: u8 = 26;

/// Smallest frame width accepted by the configuration.
///
/// Two parity bits plus at least two data bits, so the parity halves are
/// never empty.
pub const MIN_FRAME_WIDTH: u8 = 4;

/// Largest frame width accepted by the configuration.
pub const MAX_FRAME_WIDTH: u8 = BUFFER_BITS;

/// Number of parity bits framing every data frame.
pub const PARITY_BITS: u8 = 2;

/// Payload width of a 26-bit frame.
pub const WIEGAND26_PAYLOAD_BITS: u8 = 24;

/// Largest value that fits in a 26-bit frame payload.
pub const WIEGAND26_MAX_PAYLOAD: u32 = (1 << WIEGAND26_PAYLOAD_BITS) - 1;

/// Number of payload bits covered by each parity bit in a 26-bit frame.
pub const WIEGAND26_PARITY_GROUP: u8 = 12;

// ============================================================================
// Keypad Framing
// ============================================================================

/// Bits per keypad key (one nibble per key press).
pub const KEYPAD_NIBBLE_BITS: u8 = 4;

/// Nibble sent by a keypad for the `#` key, terminating an entry.
pub const KEYPAD_TERMINATOR: u64 = 11;

// ============================================================================
// Decoder Timing
// ============================================================================

/// Default number of consecutive incomplete polls tolerated before the
/// partial frame is dropped.
///
/// The frame is dropped on the first poll that *exceeds* this count, so with
/// the default one-second poll a stuck frame lives for about 11 seconds.
pub const DEFAULT_TIMEOUT_LIMIT: u8 = 10;

/// Default decoder poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

// ============================================================================
// Card Removal
// ============================================================================

/// Shortest delay used when arming the card-present timeout.
pub const MIN_REMOVE_DELAY_MS: u64 = 250;

/// Default card-present timeout.
pub const DEFAULT_REMOVE_DELAY_MS: u64 = 1000;

// ============================================================================
// Transmit Timing
// ============================================================================

/// Time a data line is held low for one bit, in microseconds.
pub const PULSE_WIDTH_US: u32 = 50;

/// Idle time after each pulse before the next bit, in microseconds.
pub const PULSE_INTERVAL_US: u32 = 250;

/// Number of polls between two writes of the sample transmit schedule.
pub const DEFAULT_TRANSMIT_EVERY_POLLS: u32 = 11;

/// Base of the sample payload range written by the transmit schedule.
pub const SAMPLE_PAYLOAD_BASE: u32 = 10_000_001;

/// Number of distinct payloads in the sample range (offsets 1..=500).
pub const SAMPLE_PAYLOAD_SPAN: u32 = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_geometry_consistent() {
        assert_eq!(DEFAULT_FRAME_WIDTH, WIEGAND26_PAYLOAD_BITS + PARITY_BITS);
        assert_eq!(WIEGAND26_PARITY_GROUP * 2, WIEGAND26_PAYLOAD_BITS);
        assert_eq!(WIEGAND26_MAX_PAYLOAD, 0xFF_FFFF);
    }

    #[test]
    fn test_sample_payload_range_fits_26_bits() {
        assert!(SAMPLE_PAYLOAD_BASE + SAMPLE_PAYLOAD_SPAN <= WIEGAND26_MAX_PAYLOAD);
    }
}
