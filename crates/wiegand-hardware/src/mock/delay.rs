//! Delay provider that records instead of waiting.

use embedded_hal::delay::DelayNs;

/// Zero-time [`DelayNs`] keeping every requested delay in nanoseconds.
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    calls: Vec<u64>,
}

impl RecordingDelay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested delays, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[u64] {
        &self.calls
    }

    /// Sum of all requested delays.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.calls.iter().sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.calls.push(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(u64::from(ms) * 1_000_000);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_nanoseconds() {
        let mut delay = RecordingDelay::new();
        delay.delay_ns(10);
        delay.delay_us(50);
        delay.delay_ms(2);

        assert_eq!(delay.calls(), [10u64, 50_000, 2_000_000]);
        assert_eq!(delay.total_ns(), 2_050_010);
    }
}
