//! Parity computation and 26-bit frame encoding.
//!
//! A Wiegand data frame carries a leading even parity bit over the first half
//! of the data bits and a trailing odd parity bit over the second half:
//!
//! ```text
//! bit:   25 | 24 ........ 13 | 12 ......... 1 | 0
//!        E  | first half      | second half    | O
//! ```
//!
//! [`Wiegand26`] encodes a [`Payload24`] into that layout and yields the bits
//! in wire order (most significant first). [`verify`] checks both parity bits
//! of a received frame of any supported width.

use wiegand_core::constants::{WIEGAND26_PARITY_GROUP, WIEGAND26_PAYLOAD_BITS};
use wiegand_core::{Bit, Payload24};

/// Parity bits of a 26-bit frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parity {
    /// Leading bit: even parity over payload bits 12-23.
    pub even: Bit,
    /// Trailing bit: odd parity over payload bits 0-11.
    pub odd: Bit,
}

impl Parity {
    /// Compute the parity bits of a 24-bit payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::{Bit, Payload24};
    /// use wiegand_protocol::Parity;
    ///
    /// let parity = Parity::of(Payload24::new(1).unwrap());
    /// assert_eq!(parity.even, Bit::Zero);
    /// assert_eq!(parity.odd, Bit::Zero);
    /// ```
    #[must_use]
    pub fn of(payload: Payload24) -> Self {
        let mut rest = u64::from(payload.as_u32());

        let mut odd = 1u64;
        for _ in 0..WIEGAND26_PARITY_GROUP {
            odd ^= rest & 1;
            rest >>= 1;
        }

        let mut even = 0u64;
        for _ in WIEGAND26_PARITY_GROUP..WIEGAND26_PAYLOAD_BITS {
            even ^= rest & 1;
            rest >>= 1;
        }

        Self {
            even: Bit::from_lsb(even),
            odd: Bit::from_lsb(odd),
        }
    }
}

/// A payload framed as a 26-bit Wiegand transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wiegand26 {
    payload: Payload24,
    parity: Parity,
}

impl Wiegand26 {
    /// Number of bits on the wire.
    pub const BITS: u8 = WIEGAND26_PAYLOAD_BITS + 2;

    #[must_use]
    pub fn new(payload: Payload24) -> Self {
        Self {
            payload,
            parity: Parity::of(payload),
        }
    }

    #[must_use]
    pub fn payload(&self) -> Payload24 {
        self.payload
    }

    #[must_use]
    pub fn parity(&self) -> Parity {
        self.parity
    }

    /// The frame as one integer, oldest wire bit in bit 25.
    #[must_use]
    pub fn raw(&self) -> u64 {
        (self.parity.even.as_u64() << 25)
            | (u64::from(self.payload.as_u32()) << 1)
            | self.parity.odd.as_u64()
    }

    /// Bits in transmission order: even parity, payload MSB first, odd parity.
    pub fn bits(&self) -> impl Iterator<Item = Bit> + '_ {
        let raw = self.raw();
        (0..Self::BITS)
            .rev()
            .map(move |shift| Bit::from_lsb(raw >> shift))
    }
}

/// Check the leading even and trailing odd parity bits of a received frame.
///
/// `raw` holds `width` bits with the first wire bit in the highest position.
/// The data bits are split into a first half of `ceil(n / 2)` bits covered by
/// the leading bit and a second half of `floor(n / 2)` bits covered by the
/// trailing bit. Widths below 4 never verify.
#[must_use]
pub fn verify(raw: u64, width: u8) -> bool {
    if !(4..=64).contains(&width) {
        return false;
    }

    let data_bits = u32::from(width - 2);
    let second_half = data_bits / 2;
    let first_half = data_bits - second_half;

    let leading = (raw >> (width - 1)) & 1;
    let trailing = raw & 1;
    let data = (raw >> 1) & low_mask(data_bits);

    let first = (data >> second_half) & low_mask(first_half);
    let second = data & low_mask(second_half);

    let even_ok = (first.count_ones() + leading as u32) % 2 == 0;
    let odd_ok = (second.count_ones() + trailing as u32) % 2 == 1;
    even_ok && odd_ok
}

/// Mask with the low `bits` bits set (all ones for 64).
#[must_use]
pub fn low_mask(bits: u32) -> u64 {
    1u64.checked_shl(bits).map_or(u64::MAX, |bit| bit - 1)
}
