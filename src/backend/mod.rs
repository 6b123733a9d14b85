//! Inference backends consumed by the rerankers.
//!
//! - [`CrossEncoderBackend`] scores (query, document) pairs jointly.
//! - [`EmbeddingBackend`] encodes texts independently into vectors.
//!
//! Backends are built by a loader ([`CrossEncoderLoader`] / [`EmbeddingLoader`]) so the
//! reranker can bind them to its resolved [`DeviceProfile`] and surface load failures
//! as configuration errors.
//!
//! Implementations:
//! - [`candle_backend`]: BERT-family models via candle (local directory or hub id).
//! - [`stub`]: deterministic scoring without model files.
//! - `mock` (tests / `mock` feature): scripted failures and call recording.

/// BERT classifier / encoder wrappers.
pub mod bert;
/// Candle-backed cross-encoder and embedder.
pub mod candle_backend;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Model file resolution and tokenizer loading.
pub mod source;
/// Deterministic stand-ins for running without weights.
pub mod stub;

#[cfg(test)]
mod tests;

pub use error::BackendError;
pub use source::{ModelFiles, ModelSource};

use crate::device::DeviceProfile;

/// Jointly scores (query, document) pairs.
pub trait CrossEncoderBackend {
    /// Returns one score per pair, in input order.
    ///
    /// `batch_size` bounds how many pairs go through the model at once.
    fn predict(&self, pairs: &[(&str, &str)], batch_size: usize)
    -> Result<Vec<f32>, BackendError>;

    /// `true` if the model was compiled ahead of inference.
    fn is_compiled(&self) -> bool {
        false
    }
}

/// Encodes texts into fixed-length vectors.
pub trait EmbeddingBackend {
    /// Returns one vector per text, in input order.
    fn encode(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Vec<f32>>, BackendError>;
}

/// Everything a loader needs to instantiate a backend.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub model: String,
    pub profile: DeviceProfile,
    pub max_seq_len: usize,
    pub compile: bool,
}

impl LoadRequest {
    pub fn new(model: impl Into<String>, profile: DeviceProfile, max_seq_len: usize) -> Self {
        Self {
            model: model.into(),
            profile,
            max_seq_len,
            compile: false,
        }
    }

    pub fn with_compile(mut self, compile: bool) -> Self {
        self.compile = compile;
        self
    }
}

/// Instantiates cross-encoder backends.
pub trait CrossEncoderLoader {
    type Backend: CrossEncoderBackend;

    fn load(&self, request: &LoadRequest) -> Result<Self::Backend, BackendError>;
}

/// Instantiates embedding backends.
pub trait EmbeddingLoader {
    type Backend: EmbeddingBackend;

    fn load(&self, request: &LoadRequest) -> Result<Self::Backend, BackendError>;
}

impl<B: CrossEncoderBackend + ?Sized> CrossEncoderBackend for Box<B> {
    fn predict(
        &self,
        pairs: &[(&str, &str)],
        batch_size: usize,
    ) -> Result<Vec<f32>, BackendError> {
        (**self).predict(pairs, batch_size)
    }

    fn is_compiled(&self) -> bool {
        (**self).is_compiled()
    }
}

impl<E: EmbeddingBackend + ?Sized> EmbeddingBackend for Box<E> {
    fn encode(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Vec<f32>>, BackendError> {
        (**self).encode(texts, batch_size)
    }
}
