use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by an inference backend or its loader.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("failed to fetch model '{model}' from hub: {reason}")]
    DownloadFailed { model: String, reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("backend returned {actual} outputs for {expected} inputs")]
    OutputCountMismatch { expected: usize, actual: usize },

    #[error("invalid model configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for BackendError {
    fn from(err: candle_core::Error) -> Self {
        BackendError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
