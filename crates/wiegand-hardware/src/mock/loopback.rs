//! Output pin wired to a mock interrupt line.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use wiegand_core::LineId;

use super::interrupts::MockInterrupts;

/// Output pin whose high-to-low transitions fire an edge on `line`.
///
/// The pin starts high, matching an idle Wiegand line. Driving it low while
/// already low does not fire again.
#[derive(Debug, Clone)]
pub struct LoopbackPin {
    interrupts: MockInterrupts,
    line: LineId,
    high: bool,
    edges: usize,
}

impl LoopbackPin {
    #[must_use]
    pub fn new(interrupts: MockInterrupts, line: LineId) -> Self {
        Self {
            interrupts,
            line,
            high: true,
            edges: 0,
        }
    }

    #[must_use]
    pub fn line(&self) -> LineId {
        self.line
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Falling edges produced so far.
    #[must_use]
    pub fn edges(&self) -> usize {
        self.edges
    }
}

impl ErrorType for LoopbackPin {
    type Error = Infallible;
}

impl OutputPin for LoopbackPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.high {
            self.high = false;
            self.edges += 1;
            self.interrupts.fire(self.line);
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::BitAccumulator;
    use crate::edge::EdgeHandler;
    use crate::traits::EdgeInterrupts;
    use std::sync::Arc;
    use wiegand_core::Bit;

    #[test]
    fn test_only_falling_edges_fire() {
        let acc = Arc::new(BitAccumulator::new());
        let mut irq = MockInterrupts::new();
        irq.attach_falling(LineId::new(4), EdgeHandler::new(Arc::clone(&acc), Bit::One))
            .unwrap();

        let mut pin = LoopbackPin::new(irq, LineId::new(4));
        pin.set_high().unwrap();
        pin.set_low().unwrap();
        pin.set_low().unwrap();
        pin.set_high().unwrap();
        pin.set_low().unwrap();

        assert_eq!(pin.edges(), 2);
        assert!(!pin.is_high());
        assert_eq!(acc.snapshot().count, 2);
        assert_eq!(acc.snapshot().bits, 0b11);
    }

    #[test]
    fn test_unattached_line_counts_edges_only() {
        let mut pin = LoopbackPin::new(MockInterrupts::new(), LineId::new(12));
        pin.set_low().unwrap();
        assert_eq!(pin.edges(), 1);
        assert_eq!(pin.line(), LineId::new(12));
    }
}
