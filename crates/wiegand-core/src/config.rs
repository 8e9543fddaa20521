//! Reader and writer configuration.
//!
//! [`WiegandConfig`] replaces the host's per-task setting slots with one
//! explicit struct. It is deserialized with serde (every field has a default)
//! and validated once with [`WiegandConfig::validate`]; every constructor in
//! the workspace that accepts a config calls it.
//!
//! # Auto-removal flag
//!
//! The serialized `auto_remove` flag keeps the host's historical inverted
//! meaning: `false`/`0` means the card-present timeout **does** reset the
//! value. Internally the field is named [`auto_remove_disabled`] and
//! [`auto_remove_active`] gives the straight reading.
//!
//! [`auto_remove_disabled`]: WiegandConfig::auto_remove_disabled
//! [`auto_remove_active`]: WiegandConfig::auto_remove_active
//!
//! # Examples
//!
//! ```
//! use wiegand_core::WiegandConfig;
//!
//! let config = WiegandConfig::from_json(r#"{ "frame_width": 34, "hex_as_dec": true }"#).unwrap();
//! assert_eq!(config.frame_width, 34);
//! assert!(config.auto_remove_active());
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FRAME_WIDTH, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REMOVE_DELAY_MS, DEFAULT_TIMEOUT_LIMIT,
    MAX_FRAME_WIDTH, MIN_FRAME_WIDTH, MIN_REMOVE_DELAY_MS,
};
use crate::types::{Bit, LineId};
use crate::{Error, Result};

/// Physical input line of a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputLine {
    /// First configured input pin.
    Pin1,
    /// Second configured input pin.
    Pin2,
}

/// Which physical line carries logical ones.
///
/// Serialized as `0` (legacy) or `1` (swapped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CompatibilityMode {
    /// Pin 1 pulses for 1, pin 2 pulses for 0.
    #[default]
    Legacy,
    /// Pin 1 pulses for 0, pin 2 pulses for 1.
    Swapped,
}

impl CompatibilityMode {
    /// Logical bit produced by a falling edge on `line`.
    #[must_use]
    pub fn bit_for(self, line: InputLine) -> Bit {
        match (self, line) {
            (CompatibilityMode::Legacy, InputLine::Pin1)
            | (CompatibilityMode::Swapped, InputLine::Pin2) => Bit::One,
            (CompatibilityMode::Legacy, InputLine::Pin2)
            | (CompatibilityMode::Swapped, InputLine::Pin1) => Bit::Zero,
        }
    }
}

impl TryFrom<u8> for CompatibilityMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CompatibilityMode::Legacy),
            1 => Ok(CompatibilityMode::Swapped),
            other => Err(Error::InvalidCompatibilityMode(other)),
        }
    }
}

impl From<CompatibilityMode> for u8 {
    fn from(mode: CompatibilityMode) -> Self {
        match mode {
            CompatibilityMode::Legacy => 0,
            CompatibilityMode::Swapped => 1,
        }
    }
}

/// Complete configuration for one reader/writer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiegandConfig {
    /// Data frame width including both parity bits.
    pub frame_width: u8,

    /// Line-to-bit mapping.
    pub compatibility: CompatibilityMode,

    /// Reinterpret the decoded value's hex digits as decimal.
    pub hex_as_dec: bool,

    /// Inverted flag: `false` means the removal timeout resets the value.
    #[serde(rename = "auto_remove")]
    pub auto_remove_disabled: bool,

    /// Card-present timeout in milliseconds (floored when armed).
    pub remove_delay_ms: u64,

    /// Value stored when the card-present timeout fires.
    pub remove_value: u64,

    /// Publish an event when the card-present timeout fires.
    pub remove_event: bool,

    /// Check both parity bits before accepting a data frame.
    pub verify_parity: bool,

    /// Incomplete polls tolerated before dropping a partial frame.
    pub timeout_limit: u8,

    /// Decoder poll period in milliseconds.
    pub poll_interval_ms: u64,

    /// First input line.
    pub input_pin1: LineId,

    /// Second input line.
    pub input_pin2: LineId,

    /// Output line pulsed for a 0 bit.
    pub output_d0: LineId,

    /// Output line pulsed for a 1 bit.
    pub output_d1: LineId,
}

impl Default for WiegandConfig {
    fn default() -> Self {
        Self {
            frame_width: DEFAULT_FRAME_WIDTH,
            compatibility: CompatibilityMode::Legacy,
            hex_as_dec: false,
            auto_remove_disabled: false,
            remove_delay_ms: DEFAULT_REMOVE_DELAY_MS,
            remove_value: 0,
            remove_event: false,
            verify_parity: false,
            timeout_limit: DEFAULT_TIMEOUT_LIMIT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            input_pin1: LineId::new(4),
            input_pin2: LineId::new(5),
            output_d0: LineId::new(12),
            output_d1: LineId::new(13),
        }
    }
}

impl WiegandConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// Returns `Error::Json` on malformed input and the validation errors of
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: WiegandConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the errors of
    /// [`from_json`](Self::from_json).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the configuration for values the engine cannot run with.
    ///
    /// # Errors
    /// - `Error::InvalidFrameWidth` if the width is outside 4-64 bits
    /// - `Error::InvalidTimeoutLimit` if the limit is zero
    /// - `Error::InvalidPollInterval` if the poll interval is zero
    /// - `Error::DuplicatePin` if two roles share a line
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FRAME_WIDTH..=MAX_FRAME_WIDTH).contains(&self.frame_width) {
            return Err(Error::InvalidFrameWidth {
                width: self.frame_width,
                min: MIN_FRAME_WIDTH,
                max: MAX_FRAME_WIDTH,
            });
        }

        if self.timeout_limit == 0 {
            return Err(Error::InvalidTimeoutLimit(self.timeout_limit));
        }

        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidPollInterval(self.poll_interval_ms));
        }

        let pins = [
            ("input_pin1", self.input_pin1),
            ("input_pin2", self.input_pin2),
            ("output_d0", self.output_d0),
            ("output_d1", self.output_d1),
        ];
        for (i, (first, pin)) in pins.iter().enumerate() {
            if let Some((second, _)) = pins[i + 1..].iter().find(|(_, other)| other == pin) {
                return Err(Error::DuplicatePin {
                    pin: pin.as_u8(),
                    first: *first,
                    second: *second,
                });
            }
        }

        Ok(())
    }

    /// Whether the card-present timeout resets the stored value.
    #[must_use]
    pub fn auto_remove_active(&self) -> bool {
        !self.auto_remove_disabled
    }

    /// Delay used when arming the card-present timeout.
    #[must_use]
    pub fn remove_delay(&self) -> Duration {
        Duration::from_millis(self.remove_delay_ms.max(MIN_REMOVE_DELAY_MS))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Payload width of a data frame (frame width minus both parity bits).
    #[must_use]
    pub fn payload_bits(&self) -> u8 {
        self.frame_width.saturating_sub(2)
    }

    /// Output line pulsed to send `bit`.
    #[must_use]
    pub fn output_line(&self, bit: Bit) -> LineId {
        match bit {
            Bit::Zero => self.output_d0,
            Bit::One => self.output_d1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_output_line_per_bit() {
        let config = WiegandConfig {
            output_d0: LineId::new(21),
            output_d1: LineId::new(22),
            ..Default::default()
        };
        assert_eq!(config.output_line(Bit::Zero), LineId::new(21));
        assert_eq!(config.output_line(Bit::One), LineId::new(22));
    }

    #[test]
    fn test_default_is_valid() {
        let config = WiegandConfig::default();
        config.validate().unwrap();
        assert_eq!(config.frame_width, 26);
        assert_eq!(config.payload_bits(), 24);
        assert!(config.auto_remove_active());
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(65)]
    fn test_invalid_frame_width(#[case] width: u8) {
        let config = WiegandConfig {
            frame_width: width,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidFrameWidth { .. })
        ));
    }

    #[rstest]
    #[case(4)]
    #[case(26)]
    #[case(34)]
    #[case(64)]
    fn test_valid_frame_width(#[case] width: u8) {
        let config = WiegandConfig {
            frame_width: width,
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_timeout_limit_rejected() {
        let config = WiegandConfig {
            timeout_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidTimeoutLimit(0))
        ));
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let config = WiegandConfig {
            output_d1: LineId::new(4),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Pin 4 assigned to both input_pin1 and output_d1"
        );
    }

    #[rstest]
    #[case(0, 250)]
    #[case(100, 250)]
    #[case(250, 250)]
    #[case(1500, 1500)]
    fn test_remove_delay_floor(#[case] configured: u64, #[case] expected_ms: u64) {
        let config = WiegandConfig {
            remove_delay_ms: configured,
            ..Default::default()
        };
        assert_eq!(config.remove_delay(), Duration::from_millis(expected_ms));
    }

    #[test]
    fn test_auto_remove_flag_is_inverted() {
        let config = WiegandConfig::from_json(r#"{ "auto_remove": true }"#).unwrap();
        assert!(config.auto_remove_disabled);
        assert!(!config.auto_remove_active());

        let config = WiegandConfig::from_json(r#"{ "auto_remove": false }"#).unwrap();
        assert!(config.auto_remove_active());
    }

    #[test]
    fn test_compatibility_from_json() {
        let config = WiegandConfig::from_json(r#"{ "compatibility": 1 }"#).unwrap();
        assert_eq!(config.compatibility, CompatibilityMode::Swapped);

        assert!(WiegandConfig::from_json(r#"{ "compatibility": 2 }"#).is_err());
    }

    #[test]
    fn test_compatibility_swaps_lines() {
        let legacy = CompatibilityMode::Legacy;
        let swapped = CompatibilityMode::Swapped;

        assert_eq!(legacy.bit_for(InputLine::Pin1), Bit::One);
        assert_eq!(legacy.bit_for(InputLine::Pin2), Bit::Zero);
        assert_eq!(
            swapped.bit_for(InputLine::Pin1),
            legacy.bit_for(InputLine::Pin2)
        );
        assert_eq!(
            swapped.bit_for(InputLine::Pin2),
            legacy.bit_for(InputLine::Pin1)
        );
    }

    #[test]
    fn test_serialize_roundtrip_keeps_field_names() {
        let config = WiegandConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["auto_remove"], false);
        assert_eq!(json["compatibility"], 0);
        assert_eq!(json["input_pin1"], 4);

        let back: WiegandConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
