use crate::constants::{DEFAULT_BI_ENCODER_MODEL, DEFAULT_MAX_SEQ_LEN};

/// Configuration for [`BiEncoderReranker`](super::BiEncoderReranker).
#[derive(Debug, Clone, PartialEq)]
pub struct BiEncoderConfig {
    /// Local model directory or hub id.
    pub model: String,

    /// Explicit batch size; `None` derives one from the device profile.
    pub batch_size: Option<usize>,

    pub max_seq_len: usize,

    /// L2-normalize embeddings so similarity is a plain dot product.
    pub normalize_embeddings: bool,
}

impl Default for BiEncoderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_BI_ENCODER_MODEL.to_string(),
            batch_size: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            normalize_embeddings: true,
        }
    }
}

impl BiEncoderConfig {
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

    pub fn with_normalize_embeddings(mut self, normalize_embeddings: bool) -> Self {
        self.normalize_embeddings = normalize_embeddings;
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

        Ok(())
    }
}
