use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use tokenizers::{EncodeInput, Encoding, Tokenizer};
use tracing::{debug, info, warn};

use super::bert::{BertClassifier, BertEncoder, Pooling};
use super::error::BackendError;
use super::source::{ModelSource, load_tokenizer};
use super::{
    CrossEncoderBackend, CrossEncoderLoader, EmbeddingBackend, EmbeddingLoader, LoadRequest,
};
use crate::constants::PROGRESS_LOG_THRESHOLD;

/// Padded token tensors for one batch.
struct BatchInputs {
    input_ids: Tensor,
    type_ids: Tensor,
    attention_mask: Tensor,
}

fn tokenize_batch<'s, E>(
    tokenizer: &Tokenizer,
    inputs: Vec<E>,
    device: &Device,
) -> Result<BatchInputs, BackendError>
where
    E: Into<EncodeInput<'s>> + Send,
{
    let encodings = tokenizer
        .encode_batch(inputs, true)
        .map_err(|e| BackendError::TokenizationFailed {
            reason: e.to_string(),
        })?;

    let batch = encodings.len();
    let seq_len = encodings.first().map(Encoding::len).unwrap_or(0);
    if encodings.iter().any(|e| e.len() != seq_len) {
        return Err(BackendError::TokenizationFailed {
            reason: "batch encodings were not padded to a common length".to_string(),
        });
    }

    let flatten = |field: fn(&Encoding) -> &[u32]| -> Vec<u32> {
        encodings.iter().flat_map(|e| field(e).iter().copied()).collect()
    };

    Ok(BatchInputs {
        input_ids: Tensor::from_vec(flatten(Encoding::get_ids), (batch, seq_len), device)?,
        type_ids: Tensor::from_vec(flatten(Encoding::get_type_ids), (batch, seq_len), device)?,
        attention_mask: Tensor::from_vec(
            flatten(Encoding::get_attention_mask),
            (batch, seq_len),
            device,
        )?,
    })
}

fn log_progress(done: usize, total: usize) {
    if total > PROGRESS_LOG_THRESHOLD {
        debug!(done, total, "Batch progress");
    }
}

/// BERT-family cross-encoder running on candle.
pub struct CandleCrossEncoder {
    model: BertClassifier,
    tokenizer: Tokenizer,
    device: Device,
}

impl std::fmt::Debug for CandleCrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleCrossEncoder")
            .field("device", &format!("{:?}", self.device))
            .finish()
    }
}

impl CandleCrossEncoder {
    fn score_batch(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>, BackendError> {
        let inputs = tokenize_batch(&self.tokenizer, pairs.to_vec(), &self.device)?;

        let logits = self
            .model
            .forward(
                &inputs.input_ids,
                &inputs.type_ids,
                Some(&inputs.attention_mask),
            )
            .map_err(|e| BackendError::InferenceFailed {
                reason: format!("Cross-encoder forward pass failed: {}", e),
            })?;

        Ok(logits
            .flatten_all()?
            .to_dtype(DType::F32)?
            .to_vec1::<f32>()?)
    }
}

impl CrossEncoderBackend for CandleCrossEncoder {
    fn predict(
        &self,
        pairs: &[(&str, &str)],
        batch_size: usize,
    ) -> Result<Vec<f32>, BackendError> {
        let mut scores = Vec::with_capacity(pairs.len());

        for batch in pairs.chunks(batch_size.max(1)) {
            scores.extend(self.score_batch(batch)?);
            log_progress(scores.len(), pairs.len());
        }

        Ok(scores)
    }
}

/// BERT-family sentence encoder running on candle.
pub struct CandleEmbedder {
    model: BertEncoder,
    tokenizer: Tokenizer,
    device: Device,
}

impl std::fmt::Debug for CandleEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleEmbedder")
            .field("device", &format!("{:?}", self.device))
            .finish()
    }
}

impl CandleEmbedder {
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, BackendError> {
        let inputs = tokenize_batch(&self.tokenizer, texts.to_vec(), &self.device)?;

        let pooled = self
            .model
            .forward(&inputs.input_ids, &inputs.type_ids, &inputs.attention_mask)
            .map_err(|e| BackendError::InferenceFailed {
                reason: format!("Encoder forward pass failed: {}", e),
            })?;

        Ok(pooled.to_dtype(DType::F32)?.to_vec2::<f32>()?)
    }
}

impl EmbeddingBackend for CandleEmbedder {
    fn encode(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Vec<f32>>, BackendError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(batch_size.max(1)) {
            vectors.extend(self.encode_batch(batch)?);
            log_progress(vectors.len(), texts.len());
        }

        Ok(vectors)
    }
}

/// Loads candle backends from a local directory or the hub.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandleLoader {
    pooling: Pooling,
}

impl CandleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pooling used by embedders built with this loader.
    pub fn with_pooling(mut self, pooling: Pooling) -> Self {
        self.pooling = pooling;
        self
    }

    fn prepare(
        request: &LoadRequest,
    ) -> Result<(super::ModelFiles, Tokenizer, Device), BackendError> {
        let files = ModelSource::parse(&request.model)?.resolve()?;
        let device = request.profile.device()?;
        let tokenizer = load_tokenizer(&files.tokenizer, request.max_seq_len)?;

        if request.compile {
            // Candle executes eagerly; there is no graph compiler to hand the model to.
            warn!(
                model = %request.model,
                "Model compilation requested but not supported by the candle backend"
            );
        }

        Ok((files, tokenizer, device))
    }
}

impl CrossEncoderLoader for CandleLoader {
    type Backend = CandleCrossEncoder;

    fn load(&self, request: &LoadRequest) -> Result<CandleCrossEncoder, BackendError> {
        let start = Instant::now();
        let (files, tokenizer, device) = Self::prepare(request)?;

        let model = BertClassifier::load(&files, request.profile.dtype(), &device).map_err(|e| {
            BackendError::ModelLoadFailed {
                reason: format!("Failed to load BERT classifier: {}", e),
            }
        })?;

        info!(
            model = %request.model,
            device = %request.profile.target(),
            max_seq_len = request.max_seq_len,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Cross-encoder loaded"
        );

        Ok(CandleCrossEncoder {
            model,
            tokenizer,
            device,
        })
    }
}

impl EmbeddingLoader for CandleLoader {
    type Backend = CandleEmbedder;

    fn load(&self, request: &LoadRequest) -> Result<CandleEmbedder, BackendError> {
        let start = Instant::now();
        let (files, tokenizer, device) = Self::prepare(request)?;

        let model = BertEncoder::load(&files, request.profile.dtype(), &device, self.pooling)
            .map_err(|e| BackendError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            })?;

        info!(
            model = %request.model,
            device = %request.profile.target(),
            pooling = ?self.pooling,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Embedder loaded"
        );

        Ok(CandleEmbedder {
            model,
            tokenizer,
            device,
        })
    }
}
