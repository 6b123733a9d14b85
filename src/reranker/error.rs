use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum RerankerError {
    #[error("invalid reranker configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The backend could not be instantiated. Never retried.
    #[error("failed to instantiate scoring backend for '{model}': {source}")]
    Configuration {
        model: String,
        #[source]
        source: BackendError,
    },

    /// A chunk failed after the batch-halving retry, or at batch size 1.
    #[error("scoring failed at batch size {batch_size}: {source}")]
    Scoring {
        batch_size: usize,
        #[source]
        source: BackendError,
    },

    /// Logged during construction; never returned.
    #[error("model warm-up failed: {reason}")]
    WarmUp { reason: String },
}

impl RerankerError {
    /// The backend failure behind this error, if any.
    pub fn backend_cause(&self) -> Option<&BackendError> {
        match self {
            RerankerError::Configuration { source, .. } | RerankerError::Scoring { source, .. } => {
                Some(source)
            }
            RerankerError::InvalidConfig { .. } | RerankerError::WarmUp { .. } => None,
        }
    }
}
