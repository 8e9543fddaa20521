//! Falling-edge handlers and line bindings.
//!
//! Each reader owns two [`EdgeHandler`] values, one per input line. A handler
//! is just the bit it appends plus a shared reference to the reader's
//! [`BitAccumulator`]; the interrupt controller calls
//! [`on_falling_edge`](EdgeHandler::on_falling_edge) and nothing else.
//!
//! Which line appends which bit depends on the configured
//! [`CompatibilityMode`](wiegand_core::CompatibilityMode); [`bindings`]
//! resolves that once at init.

use std::sync::Arc;

use wiegand_core::{Bit, InputLine, LineId, WiegandConfig};

use crate::accumulator::BitAccumulator;

/// Interrupt callback appending a fixed bit to one accumulator.
#[derive(Debug, Clone)]
pub struct EdgeHandler {
    accumulator: Arc<BitAccumulator>,
    bit: Bit,
}

impl EdgeHandler {
    #[must_use]
    pub fn new(accumulator: Arc<BitAccumulator>, bit: Bit) -> Self {
        Self { accumulator, bit }
    }

    /// The bit this handler appends.
    #[must_use]
    pub fn bit(&self) -> Bit {
        self.bit
    }

    /// Interrupt entry point.
    #[inline]
    pub fn on_falling_edge(&self) {
        self.accumulator.push(self.bit);
    }
}

/// A handler bound to the physical line it listens on.
#[derive(Debug, Clone)]
pub struct LineBinding {
    pub line: LineId,
    pub handler: EdgeHandler,
}

/// Bind both input lines of `config` to handlers on `accumulator`.
#[must_use]
pub fn bindings(config: &WiegandConfig, accumulator: &Arc<BitAccumulator>) -> [LineBinding; 2] {
    let bind = |line: LineId, input: InputLine| LineBinding {
        line,
        handler: EdgeHandler::new(
            Arc::clone(accumulator),
            config.compatibility.bit_for(input),
        ),
    };

    [
        bind(config.input_pin1, InputLine::Pin1),
        bind(config.input_pin2, InputLine::Pin2),
    ]
}

/// Input line that carries `bit` under the configured compatibility mode.
#[must_use]
pub fn input_line_for(config: &WiegandConfig, bit: Bit) -> LineId {
    if config.compatibility.bit_for(InputLine::Pin1) == bit {
        config.input_pin1
    } else {
        config.input_pin2
    }
}
