use crate::constants::{
    DEFAULT_CROSS_ENCODER_MODEL, DEFAULT_MAX_SEQ_LEN, DEFAULT_PAIR_CACHE_CAPACITY,
    MAX_DOCS_PER_CALL,
};

/// Configuration for [`CrossEncoderReranker`](super::CrossEncoderReranker).
#[derive(Debug, Clone, PartialEq)]
pub struct RerankerConfig {
    /// Local model directory or hub id.
    pub model: String,

    /// Explicit batch size; `None` derives one from the device profile.
    pub batch_size: Option<usize>,

    /// Max tokens per (query, document) pair.
    pub max_seq_len: usize,

    /// Ask the backend to compile the model before first use.
    pub compile_model: bool,

    /// Run one throwaway scoring call after loading.
    pub warm_up: bool,

    /// Single-pair cache capacity; `0` disables the cache.
    pub cache_capacity: u64,

    /// Documents per backend call before input is split into chunks.
    pub max_docs_per_call: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CROSS_ENCODER_MODEL.to_string(),
            batch_size: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            compile_model: true,
            warm_up: true,
            cache_capacity: DEFAULT_PAIR_CACHE_CAPACITY,
            max_docs_per_call: MAX_DOCS_PER_CALL,
        }
    }
}

impl RerankerConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn with_compile(mut self, compile_model: bool) -> Self {
        self.compile_model = compile_model;
        self
    }

    pub fn with_warm_up(mut self, warm_up: bool) -> Self {
        self.warm_up = warm_up;
        self
    }

    pub fn with_cache_capacity(mut self, cache_capacity: u64) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn with_max_docs_per_call(mut self, max_docs_per_call: usize) -> Self {
        self.max_docs_per_call = max_docs_per_call;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }

        if self.batch_size == Some(0) {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.max_seq_len == 0 {
            return Err("max_seq_len must be at least 1".to_string());
        }

        if self.max_docs_per_call == 0 {
            return Err("max_docs_per_call must be at least 1".to_string());
        }

        Ok(())
    }
}
