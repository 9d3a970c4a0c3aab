//! Error types for tracking and detection.

use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur in the detection path.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Frame source closed: {0}")]
    SourceClosed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VisionError {
    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for failures the frame loop recovers from by skipping the frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VisionError::DetectionFailed(_))
    }
}
