//! Busy-wait delay for hosts without a hardware timer.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] that spins on the monotonic clock.
///
/// Sleeping is too coarse for 50 us pulses on most hosts, so this burns the
/// calling thread instead. Use it only on a blocking worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        let deadline = Instant::now() + Duration::from_nanos(u64::from(ns));
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}
