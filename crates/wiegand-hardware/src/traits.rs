//! Hardware seams consumed by the reader and the writer.
//!
//! These traits establish the contract between the Wiegand engine and the
//! host platform. [`EdgeInterrupts`] is how a reader gets its bits;
//! [`FrameWriter`] is how the runtime emits a frame without knowing the pin
//! and delay types of the concrete transmitter.

use wiegand_core::{LineId, Payload24};

use crate::edge::EdgeHandler;
use crate::error::Result;

/// Edge-triggered interrupt controller.
///
/// Implementations call [`EdgeHandler::on_falling_edge`] from interrupt
/// context whenever the attached line goes from high to low.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wiegand_core::{Bit, LineId};
/// use wiegand_hardware::mock::MockInterrupts;
/// use wiegand_hardware::{BitAccumulator, EdgeHandler, EdgeInterrupts};
///
/// let accumulator = Arc::new(BitAccumulator::new());
/// let mut interrupts = MockInterrupts::new();
/// interrupts
///     .attach_falling(LineId::new(4), EdgeHandler::new(accumulator.clone(), Bit::One))
///     .unwrap();
///
/// interrupts.fire(LineId::new(4));
/// assert_eq!(accumulator.snapshot().count, 1);
/// ```
pub trait EdgeInterrupts {
    /// Call `handler` on every falling edge of `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot take an interrupt (invalid pin,
    /// already in use).
    fn attach_falling(&mut self, line: LineId, handler: EdgeHandler) -> Result<()>;

    /// Stop delivering edges of `line`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses to detach the line.
    fn detach(&mut self, line: LineId) -> Result<()>;
}

/// Blocking writer of Wiegand frames.
pub trait FrameWriter {
    /// Drive both output lines to their idle (high) level.
    ///
    /// # Errors
    ///
    /// Returns an error if an output pin cannot be driven.
    fn set_idle(&mut self) -> Result<()>;

    /// Emit one frame carrying `payload`, blocking until the last pulse ends.
    ///
    /// # Errors
    ///
    /// Returns an error if an output pin cannot be driven. The lines may be
    /// left mid-frame in that case.
    fn write(&mut self, payload: Payload24) -> Result<()>;
}
