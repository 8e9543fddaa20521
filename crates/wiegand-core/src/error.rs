use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid frame width: {width} (must be {min}-{max} bits)")]
    InvalidFrameWidth { width: u8, min: u8, max: u8 },

    #[error("Invalid timeout limit: {0} (must be at least 1 poll)")]
    InvalidTimeoutLimit(u8),

    #[error("Invalid poll interval: {0}ms")]
    InvalidPollInterval(u64),

    #[error("Pin {pin} assigned to both {first} and {second}")]
    DuplicatePin {
        pin: u8,
        first: &'static str,
        second: &'static str,
    },

    #[error("Invalid compatibility mode: {0} (expected 0 or 1)")]
    InvalidCompatibilityMode(u8),

    #[error("Configuration error: {0}")]
    Config(String),

    // Payload errors
    #[error("Invalid payload: {value:#x} does not fit in {bits} bits")]
    InvalidPayload { value: u64, bits: u8 },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
