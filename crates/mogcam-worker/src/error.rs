//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Vision error: {0}")]
    Vision(#[from] mogcam_vision::VisionError),

    #[error("Timeline error: {0}")]
    Timeline(#[from] mogcam_timeline::TimelineError),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<tokio::task::JoinError> for WorkerError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::TaskFailed(e.to_string())
    }
}
