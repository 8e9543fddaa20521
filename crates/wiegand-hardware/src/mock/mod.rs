//! Simulated hardware for tests and host-side demos.
//!
//! [`MockInterrupts`] stands in for the GPIO interrupt controller,
//! [`LoopbackPin`] is an output pin wired straight to one of its lines, and
//! [`RecordingDelay`] returns immediately while remembering what was asked of
//! it. Together they let a transmitter drive a reader with no hardware.

pub mod delay;
pub mod interrupts;
pub mod loopback;

pub use delay::RecordingDelay;
pub use interrupts::MockInterrupts;
pub use loopback::LoopbackPin;
