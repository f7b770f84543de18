//! # Error Types
//!
//! Custom error types for LANC Zoom using `thiserror`.
//!
//! Only the background side of the system can fail. The tick and capture
//! handlers are infallible: a timing miss corrupts a byte silently and there is
//! nowhere to report it from interrupt context.

use thiserror::Error;

/// Main error type for LANC Zoom
#[derive(Debug, Error)]
pub enum LancError {
    /// Timer setup cannot produce the requested bit period
    #[error("Timer configuration error: {0}")]
    Timer(String),

    /// Speed table is malformed
    #[error("Speed table error: {0}")]
    SpeedTable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Telemetry serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for LANC Zoom
pub type Result<T> = std::result::Result<T, LancError>;
