//! Scripted backends for tests.
//!
//! Clones share call logs, so a test can keep a handle after moving the backend into a
//! reranker and inspect every `predict` / `encode` call afterwards.

use std::sync::Arc;

use parking_lot::Mutex;

use super::error::BackendError;
use super::{
    CrossEncoderBackend, CrossEncoderLoader, EmbeddingBackend, EmbeddingLoader, LoadRequest,
};

/// When a mock backend call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    Never,
    /// Fail every call made with a batch size above the limit.
    AboveBatchSize(usize),
    /// Fail the first `n` calls, then succeed.
    FirstCalls(usize),
    Always,
}

impl FailureMode {
    fn should_fail(&self, call_index: usize, batch_size: usize) -> bool {
        match *self {
            FailureMode::Never => false,
            FailureMode::AboveBatchSize(limit) => batch_size > limit,
            FailureMode::FirstCalls(n) => call_index < n,
            FailureMode::Always => true,
        }
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub inputs: Vec<String>,
    pub batch_size: usize,
    pub failed: bool,
}

impl RecordedCall {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

type PairScorer = dyn Fn(&str, &str) -> f32 + Send + Sync;
type TextEncoder = dyn Fn(&str) -> Vec<f32> + Send + Sync;

/// Cross-encoder whose scores come from a closure (document length by default).
#[derive(Clone)]
pub struct MockCrossEncoder {
    scorer: Arc<PairScorer>,
    failure: FailureMode,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Default for MockCrossEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockCrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCrossEncoder")
            .field("failure", &self.failure)
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

impl MockCrossEncoder {
    pub fn new() -> Self {
        Self {
            scorer: Arc::new(|_: &str, document: &str| document.len() as f32),
            failure: FailureMode::Never,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_scorer<F>(mut self, scorer: F) -> Self
    where
        F: Fn(&str, &str) -> f32 + Send + Sync + 'static,
    {
        self.scorer = Arc::new(scorer);
        self
    }

    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Calls that carried this exact document.
    pub fn calls_with_document(&self, document: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.inputs.iter().any(|d| d == document))
            .count()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl CrossEncoderBackend for MockCrossEncoder {
    fn predict(
        &self,
        pairs: &[(&str, &str)],
        batch_size: usize,
    ) -> Result<Vec<f32>, BackendError> {
        let mut calls = self.calls.lock();
        let failed = self.failure.should_fail(calls.len(), batch_size);

        calls.push(RecordedCall {
            inputs: pairs.iter().map(|(_, d)| d.to_string()).collect(),
            batch_size,
            failed,
        });

        if failed {
            return Err(BackendError::InferenceFailed {
                reason: format!("mock failure at batch size {batch_size}"),
            });
        }

        Ok(pairs.iter().map(|(q, d)| (self.scorer)(q, d)).collect())
    }
}

/// Embedder whose vectors come from a closure.
#[derive(Clone)]
pub struct MockEmbedder {
    encoder: Arc<TextEncoder>,
    failure: FailureMode,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl std::fmt::Debug for MockEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockEmbedder")
            .field("failure", &self.failure)
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

impl MockEmbedder {
    pub fn new<F>(encoder: F) -> Self
    where
        F: Fn(&str) -> Vec<f32> + Send + Sync + 'static,
    {
        Self {
            encoder: Arc::new(encoder),
            failure: FailureMode::Never,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl EmbeddingBackend for MockEmbedder {
    fn encode(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Vec<f32>>, BackendError> {
        let mut calls = self.calls.lock();
        let failed = self.failure.should_fail(calls.len(), batch_size);

        calls.push(RecordedCall {
            inputs: texts.iter().map(|t| t.to_string()).collect(),
            batch_size,
            failed,
        });

        if failed {
            return Err(BackendError::InferenceFailed {
                reason: format!("mock encode failure at batch size {batch_size}"),
            });
        }

        Ok(texts.iter().map(|t| (self.encoder)(t)).collect())
    }
}

/// Loader that hands out a clone of a prepared backend, or fails.
#[derive(Debug, Clone)]
pub struct MockLoader<B> {
    backend: Option<B>,
    requests: Arc<Mutex<Vec<LoadRequest>>>,
}

impl<B: Clone> MockLoader<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Some(backend),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A loader whose every `load` fails with `ModelLoadFailed`.
    pub fn failing() -> Self {
        Self {
            backend: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<LoadRequest> {
        self.requests.lock().clone()
    }

    fn take(&self, request: &LoadRequest) -> Result<B, BackendError> {
        self.requests.lock().push(request.clone());
        self.backend
            .clone()
            .ok_or_else(|| BackendError::ModelLoadFailed {
                reason: format!("mock loader refused '{}'", request.model),
            })
    }
}

impl CrossEncoderLoader for MockLoader<MockCrossEncoder> {
    type Backend = MockCrossEncoder;

    fn load(&self, request: &LoadRequest) -> Result<MockCrossEncoder, BackendError> {
        self.take(request)
    }
}

impl EmbeddingLoader for MockLoader<MockEmbedder> {
    type Backend = MockEmbedder;

    fn load(&self, request: &LoadRequest) -> Result<MockEmbedder, BackendError> {
        self.take(request)
    }
}
