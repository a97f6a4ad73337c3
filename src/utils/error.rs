//! Error types and handling
//!
//! Common error types used across the console. Every variant is recoverable;
//! none of them should take the process down.

use crate::capture::CaptureError;
use crate::store::StoreError;
use crate::transport::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Console-wide error type
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("No supported recording format (tried: {0})")]
    NoSupportedFormat(String),

    #[error("Playback bind failed: {0}")]
    PlaybackBindFailure(String),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("Unknown library item: {0}")]
    UnknownItem(u32),
}

impl From<CaptureError> for ConsoleError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::DeviceUnavailable(msg) | CaptureError::PermissionDenied(msg) => {
                ConsoleError::DeviceUnavailable(msg)
            }
            CaptureError::NoSupportedFormat(tried) => {
                ConsoleError::NoSupportedFormat(tried.join(", "))
            }
            CaptureError::Io(e) => ConsoleError::Io(e),
            other => ConsoleError::Recording(other.to_string()),
        }
    }
}

impl From<TransportError> for ConsoleError {
    fn from(error: TransportError) -> Self {
        ConsoleError::PlaybackBindFailure(error.to_string())
    }
}

impl From<StoreError> for ConsoleError {
    fn from(error: StoreError) -> Self {
        ConsoleError::PersistenceUnavailable(error.to_string())
    }
}

/// Error notice for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&ConsoleError> for ErrorResponse {
    fn from(error: &ConsoleError) -> Self {
        let code = match error {
            ConsoleError::Io(_) => "IO_ERROR",
            ConsoleError::Serialization(_) => "SERIALIZATION_ERROR",
            ConsoleError::DeviceUnavailable(_) => "DEVICE_UNAVAILABLE",
            ConsoleError::NoSupportedFormat(_) => "NO_SUPPORTED_FORMAT",
            ConsoleError::PlaybackBindFailure(_) => "PLAYBACK_BIND_FAILURE",
            ConsoleError::PersistenceUnavailable(_) => "PERSISTENCE_UNAVAILABLE",
            ConsoleError::Recording(_) => "RECORDING_ERROR",
            ConsoleError::UnknownItem(_) => "UNKNOWN_ITEM",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

impl From<ConsoleError> for ErrorResponse {
    fn from(error: ConsoleError) -> Self {
        ErrorResponse::from(&error)
    }
}

/// Result type alias using ConsoleError
pub type ConsoleResult<T> = Result<T, ConsoleError>;
