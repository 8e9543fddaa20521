//! Interrupt-shared bit accumulator.
//!
//! The accumulator is the only state shared between the edge interrupts and
//! the polled decoder. The bit register and the bit count live together in a
//! [`critical_section::Mutex`], so an edge handler's shift-and-increment and
//! the poller's snapshot can never observe each other half done.
//!
//! ```text
//!  D1 edge ──► push(1) ─┐
//!                       ├──► [ bits | count ] ──► snapshot() ──► FrameDecoder
//!  D0 edge ──► push(0) ─┘           ▲
//!                                   └──────────── consume(snapshot)
//! ```
//!
//! The register is 64 bits wide. An edge arriving while the register is
//! already full resets it before storing the new bit, and the reset is
//! counted so the poller can report it.

use core::cell::Cell;

use critical_section::Mutex;
use wiegand_core::Bit;
use wiegand_core::constants::BUFFER_BITS;
use wiegand_protocol::BitSnapshot;
use wiegand_protocol::parity::low_mask;

#[derive(Debug, Clone, Copy, Default)]
struct Register {
    bits: u64,
    count: u8,
    overflows: u32,
}

/// Shift register plus bit counter for one physical reader.
#[derive(Debug)]
pub struct BitAccumulator {
    register: Mutex<Cell<Register>>,
}

impl BitAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            register: Mutex::new(Cell::new(Register {
                bits: 0,
                count: 0,
                overflows: 0,
            })),
        }
    }

    /// Append one bit at the low end of the register.
    ///
    /// Called from interrupt context: no allocation, no logging, bounded time.
    #[inline]
    pub fn push(&self, bit: Bit) {
        critical_section::with(|cs| {
            let cell = self.register.borrow(cs);
            let mut reg = cell.get();
            if reg.count >= BUFFER_BITS {
                reg.bits = 0;
                reg.count = 0;
                reg.overflows = reg.overflows.wrapping_add(1);
            }
            reg.bits = (reg.bits << 1) | bit.as_u64();
            reg.count += 1;
            cell.set(reg);
        });
    }

    /// Consistent copy of the bits and count.
    #[must_use]
    pub fn snapshot(&self) -> BitSnapshot {
        critical_section::with(|cs| {
            let reg = self.register.borrow(cs).get();
            BitSnapshot::new(reg.bits, reg.count)
        })
    }

    /// Snapshot and clear in one critical section.
    pub fn take(&self) -> BitSnapshot {
        critical_section::with(|cs| {
            let cell = self.register.borrow(cs);
            let reg = cell.get();
            cell.set(Register {
                bits: 0,
                count: 0,
                overflows: reg.overflows,
            });
            BitSnapshot::new(reg.bits, reg.count)
        })
    }

    /// Drop the bits covered by `snapshot`, keeping any that arrived after it.
    ///
    /// The newest `count - snapshot.count` bits stay in the register. If the
    /// register holds fewer bits than the snapshot, it was reset by an
    /// overflow since the snapshot was taken and everything in it is newer,
    /// so nothing is dropped.
    pub fn consume(&self, snapshot: BitSnapshot) {
        critical_section::with(|cs| {
            let cell = self.register.borrow(cs);
            let mut reg = cell.get();
            if reg.count >= snapshot.count {
                reg.count -= snapshot.count;
                reg.bits &= low_mask(u32::from(reg.count));
                cell.set(reg);
            }
        });
    }

    /// Drop all accumulated bits.
    pub fn clear(&self) {
        self.take();
    }

    /// Number of overflow resets since the last call, then zero it.
    pub fn take_overflows(&self) -> u32 {
        critical_section::with(|cs| {
            let cell = self.register.borrow(cs);
            let mut reg = cell.get();
            let overflows = reg.overflows;
            reg.overflows = 0;
            cell.set(reg);
            overflows
        })
    }
}

impl Default for BitAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_push_shifts_left() {
        let acc = BitAccumulator::new();
        acc.push(Bit::One);
        acc.push(Bit::Zero);
        acc.push(Bit::One);
        acc.push(Bit::One);

        assert_eq!(acc.snapshot(), BitSnapshot::new(0b1011, 4));
    }

    #[test]
    fn test_take_clears() {
        let acc = BitAccumulator::new();
        acc.push(Bit::One);
        assert_eq!(acc.take(), BitSnapshot::new(1, 1));
        assert!(acc.snapshot().is_empty());
        assert_eq!(acc.snapshot().bits, 0);
    }

    #[test]
    fn test_overflow_resets_before_append() {
        let acc = BitAccumulator::new();
        for _ in 0..64 {
            acc.push(Bit::One);
        }
        assert_eq!(acc.snapshot(), BitSnapshot::new(u64::MAX, 64));

        acc.push(Bit::Zero);
        assert_eq!(acc.snapshot(), BitSnapshot::new(0, 1));
        assert_eq!(acc.take_overflows(), 1);
        assert_eq!(acc.take_overflows(), 0);
    }

    #[test]
    fn test_consume_keeps_late_bits() {
        let acc = BitAccumulator::new();
        for _ in 0..26 {
            acc.push(Bit::One);
        }
        let snapshot = acc.snapshot();

        // edges landing while the poller decodes
        acc.push(Bit::Zero);
        acc.push(Bit::One);

        acc.consume(snapshot);
        assert_eq!(acc.snapshot(), BitSnapshot::new(0b01, 2));
    }

    #[test]
    fn test_consume_whole_register() {
        let acc = BitAccumulator::new();
        acc.push(Bit::One);
        acc.push(Bit::One);
        acc.consume(acc.snapshot());
        assert_eq!(acc.snapshot(), BitSnapshot::new(0, 0));
    }

    #[test]
    fn test_consume_after_overflow_reset_keeps_new_bits() {
        let acc = BitAccumulator::new();
        for _ in 0..64 {
            acc.push(Bit::Zero);
        }
        let snapshot = acc.snapshot();
        acc.push(Bit::One);

        acc.consume(snapshot);
        assert_eq!(acc.snapshot(), BitSnapshot::new(1, 1));
        assert_eq!(acc.take_overflows(), 1);
    }

    #[test]
    fn test_clear_keeps_overflow_count() {
        let acc = BitAccumulator::new();
        for _ in 0..65 {
            acc.push(Bit::One);
        }
        acc.clear();
        assert_eq!(acc.take_overflows(), 1);
    }

    #[test]
    fn test_concurrent_pushes_are_not_lost() {
        let acc = Arc::new(BitAccumulator::new());

        let handles: Vec<_> = [Bit::One, Bit::Zero]
            .into_iter()
            .map(|bit| {
                let acc = Arc::clone(&acc);
                thread::spawn(move || {
                    for _ in 0..16 {
                        acc.push(bit);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.count, 32);
        assert_eq!(snapshot.bits.count_ones(), 16);
    }
}
