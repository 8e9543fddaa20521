//! Wiegand reader emulation on top of the hardware layer.
//!
//! This crate contains the reader plugin and the pieces that drive it:
//!
//! - [`WiegandReader`]: init / poll / timer / teardown entry points around the
//!   accumulator and the frame decoder.
//! - [`CardPresence`]: the card-present removal timeout.
//! - [`ValueStore`], [`EventSink`], [`TimerScheduler`]: the host services a
//!   reader consumes, with [`MemoryHost`] as an in-memory implementation.
//! - [`ReaderRuntime`]: a tokio driver acting as the host, with an optional
//!   periodic transmitter.
//!
//! # Examples
//!
//! ```
//! use wiegand_core::{Payload24, TaskIndex, WiegandConfig};
//! use wiegand_emulator::{MemoryHost, PollOutcome, WiegandReader};
//! use wiegand_hardware::mock::MockInterrupts;
//! use wiegand_protocol::Wiegand26;
//!
//! let mut reader = WiegandReader::new(TaskIndex::new(0), WiegandConfig::default(), MockInterrupts::new())?;
//! reader.init()?;
//!
//! for bit in Wiegand26::new(Payload24::new(1234)?).bits() {
//!     reader.accumulator().push(bit);
//! }
//!
//! let mut host = MemoryHost::new();
//! assert!(matches!(
//!     reader.poll(&mut host),
//!     PollOutcome::Completed { value: 1234, is_new: true, .. }
//! ));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod host;
pub mod presence;
pub mod reader;
pub mod runtime;

pub use host::{EventSink, MemoryHost, ReaderEvent, ReaderHost, TimerScheduler, ValueStore};
pub use presence::{CardPresence, RemovalAction};
pub use reader::{PollOutcome, WiegandReader};
pub use runtime::{
    EVENT_CHANNEL_CAPACITY, PayloadSource, ReaderHandle, ReaderRuntime, SamplePayloads,
    TransmitSchedule,
};
