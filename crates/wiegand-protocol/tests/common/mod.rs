//! Shared helpers for protocol integration tests.

#![allow(dead_code)]

use wiegand_core::Bit;
use wiegand_protocol::BitSnapshot;

/// Accumulate bits the way the edge handlers do: shift left, append at bit 0.
pub fn accumulate(bits: impl IntoIterator<Item = Bit>) -> BitSnapshot {
    bits.into_iter()
        .fold(BitSnapshot::default(), |acc, bit| BitSnapshot {
            bits: (acc.bits << 1) | bit.as_u64(),
            count: acc.count + 1,
        })
}

/// Bits of a keypad entry: one nibble per key, then the `#` terminator.
pub fn keypad_entry(keys: &[u8]) -> Vec<Bit> {
    keys.iter()
        .copied()
        .chain(std::iter::once(11))
        .flat_map(|nibble| (0..4).rev().map(move |shift| Bit::from_lsb(u64::from(nibble >> shift))))
        .collect()
}
