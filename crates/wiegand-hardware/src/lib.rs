//! Hardware layer of the Wiegand engine.
//!
//! This crate connects the pure frame logic in `wiegand-protocol` to pins and
//! interrupts:
//!
//! - [`BitAccumulator`] is the register shared between interrupt context and
//!   the poller. All access goes through a critical section.
//! - [`EdgeHandler`] is the falling-edge callback for one input line, and
//!   [`bindings`] decides which line appends which bit.
//! - [`WiegandTransmitter`] writes 26-bit frames on two `embedded-hal` output
//!   pins with microsecond pulse timing.
//!
//! Platform access is behind two traits, [`EdgeInterrupts`] and
//! [`FrameWriter`]. The [`mock`] module implements them in memory so a
//! transmitter can be looped back into a reader on a development host.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wiegand_core::{Bit, LineId, Payload24};
//! use wiegand_hardware::mock::{LoopbackPin, MockInterrupts, RecordingDelay};
//! use wiegand_hardware::{BitAccumulator, EdgeHandler, EdgeInterrupts, WiegandTransmitter};
//!
//! let accumulator = Arc::new(BitAccumulator::new());
//! let mut interrupts = MockInterrupts::new();
//! interrupts.attach_falling(LineId::new(4), EdgeHandler::new(accumulator.clone(), Bit::Zero))?;
//! interrupts.attach_falling(LineId::new(5), EdgeHandler::new(accumulator.clone(), Bit::One))?;
//!
//! let d0 = LoopbackPin::new(interrupts.clone(), LineId::new(4));
//! let d1 = LoopbackPin::new(interrupts.clone(), LineId::new(5));
//! let mut tx = WiegandTransmitter::new(d0, d1, RecordingDelay::new());
//! let frame = tx.transmit(Payload24::new(1234)?)?;
//!
//! let snapshot = accumulator.snapshot();
//! assert_eq!(snapshot.count, 26);
//! assert_eq!(snapshot.bits, frame.raw());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accumulator;
pub mod delay;
pub mod edge;
pub mod error;
pub mod mock;
pub mod traits;
pub mod transmitter;

pub use accumulator::BitAccumulator;
pub use delay::SpinDelay;
pub use edge::{EdgeHandler, LineBinding, bindings, input_line_for};
pub use error::{HardwareError, Result};
pub use traits::{EdgeInterrupts, FrameWriter};
pub use transmitter::{PulseTiming, WiegandTransmitter};
