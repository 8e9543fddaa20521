//! Error types for hardware operations.
//!
//! This module defines error types for the reader and writer hardware paths:
//! interrupt wiring, output pin failures, and the core validation errors
//! surfaced through them.

use wiegand_core::LineId;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Attaching an edge interrupt failed.
    #[error("Interrupt attach failed on {line}: {message}")]
    InterruptAttach { line: LineId, message: String },

    /// Detaching an edge interrupt failed.
    #[error("Interrupt detach failed on {line}: {message}")]
    InterruptDetach { line: LineId, message: String },

    /// Driving an output pin failed.
    #[error("Pin error: {message}")]
    Pin { message: String },

    /// Configuration or payload rejected by the core crate.
    #[error(transparent)]
    Core(#[from] wiegand_core::Error),

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Background task panicked or was cancelled.
    #[error("Background task failed: {message}")]
    Task { message: String },
}

impl HardwareError {
    /// Create a new interrupt attach error.
    pub fn attach(line: LineId, message: impl Into<String>) -> Self {
        Self::InterruptAttach {
            line,
            message: message.into(),
        }
    }

    /// Create a new interrupt detach error.
    pub fn detach(line: LineId, message: impl Into<String>) -> Self {
        Self::InterruptDetach {
            line,
            message: message.into(),
        }
    }

    /// Create a new pin error.
    pub fn pin(message: impl Into<String>) -> Self {
        Self::Pin {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a new background task error.
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }
}
