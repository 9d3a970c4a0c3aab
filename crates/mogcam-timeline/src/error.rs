//! Error types for the timeline.

use mogcam_models::TimelineStep;
use thiserror::Error;

/// Result type for timeline operations.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors that can occur while driving the timeline.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// The transition table has no successor for this step.
    #[error("No transition defined from step {0}")]
    InvalidTransition(TimelineStep),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Timeline driver stopped")]
    DriverStopped,
}

impl TimelineError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
