//! Wiegand framing rules.
//!
//! This crate holds the pure parts of the Wiegand engine: classifying and
//! decoding accumulated bits, the parity convention, 26-bit frame encoding and
//! the hex-as-decimal value transform. It has no I/O and no shared state, so
//! every function here can be tested without hardware.

pub mod frame;
pub mod hex;
pub mod parity;

pub use frame::{BitSnapshot, Classification, DecodeStep, DecodedFrame, FrameDecoder, FrameKind, classify};
pub use hex::cast_hex_as_dec;
pub use parity::{Parity, Wiegand26, verify};
