use crate::{Result, constants::WIEGAND26_MAX_PAYLOAD, constants::WIEGAND26_PAYLOAD_BITS, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single logical Wiegand bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit {
    Zero = 0,
    One = 1,
}

impl Bit {
    /// Bit from the lowest bit of `value`.
    #[must_use]
    pub fn from_lsb(value: u64) -> Self {
        if value & 1 == 1 { Bit::One } else { Bit::Zero }
    }

    #[must_use]
    pub fn as_u64(self) -> u64 {
        self as u64
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value { Bit::One } else { Bit::Zero }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Host GPIO line identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(u8);

impl LineId {
    #[must_use]
    pub const fn new(pin: u8) -> Self {
        LineId(pin)
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Identity of the host task that owns a reader (value slot, timers, events).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskIndex(u8);

impl TaskIndex {
    #[must_use]
    pub const fn new(index: u8) -> Self {
        TaskIndex(index)
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TaskIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Payload of a 26-bit Wiegand frame (24 data bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Payload24(u32);

impl Payload24 {
    /// Create a payload with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidPayload` if the value needs more than 24 bits.
    pub fn new(value: u32) -> Result<Self> {
        if value > WIEGAND26_MAX_PAYLOAD {
            return Err(Error::InvalidPayload {
                value: u64::from(value),
                bits: WIEGAND26_PAYLOAD_BITS,
            });
        }
        Ok(Payload24(value))
    }

    /// Keep only the low 24 bits of `value`.
    #[must_use]
    pub fn truncating(value: u32) -> Self {
        Payload24(value & WIEGAND26_MAX_PAYLOAD)
    }

    #[must_use]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Payload24 {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Payload24::new(value)
    }
}

impl From<Payload24> for u32 {
    fn from(payload: Payload24) -> Self {
        payload.0
    }
}

impl fmt::Display for Payload24 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Payload24 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid payload: {s}")))?;
        Payload24::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, Bit::Zero)]
    #[case(1, Bit::One)]
    #[case(0b10, Bit::Zero)]
    #[case(0b11, Bit::One)]
    fn test_bit_from_lsb(#[case] value: u64, #[case] expected: Bit) {
        assert_eq!(Bit::from_lsb(value), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(10_000_001)]
    #[case(0xFF_FFFF)]
    fn test_payload_valid(#[case] value: u32) {
        assert_eq!(Payload24::new(value).unwrap().as_u32(), value);
    }

    #[rstest]
    #[case(0x100_0000)]
    #[case(u32::MAX)]
    fn test_payload_invalid(#[case] value: u32) {
        let err = Payload24::new(value).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload { bits: 24, .. }));
    }

    #[test]
    fn test_payload_truncating() {
        assert_eq!(Payload24::truncating(0x1FF_FFFF).as_u32(), 0xFF_FFFF);
    }

    #[test]
    fn test_payload_from_str() {
        let payload: Payload24 = " 1234 ".parse().unwrap();
        assert_eq!(payload.as_u32(), 1234);
        assert!("16777216".parse::<Payload24>().is_err());
        assert!("abc".parse::<Payload24>().is_err());
    }

    #[test]
    fn test_payload_serde_rejects_wide_value() {
        assert!(serde_json::from_str::<Payload24>("16777216").is_err());
        let payload: Payload24 = serde_json::from_str("42").unwrap();
        assert_eq!(payload.as_u32(), 42);
    }

    #[test]
    fn test_line_display() {
        assert_eq!(LineId::new(4).to_string(), "GPIO4");
        assert_eq!(TaskIndex::new(2).to_string(), "task#2");
    }
}
