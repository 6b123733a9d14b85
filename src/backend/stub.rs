use std::collections::HashSet;

use tracing::{debug, warn};

use super::error::BackendError;
use super::{
    CrossEncoderBackend, CrossEncoderLoader, EmbeddingBackend, EmbeddingLoader, LoadRequest,
};
use crate::hashing::hash_to_u64;

/// Embedding width produced by [`StubEmbedder`].
pub const STUB_EMBEDDING_DIM: usize = 64;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "can", "to",
    "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through", "during",
    "before", "after", "above", "below", "between", "under", "then", "once", "here", "there",
    "when", "where", "why", "how", "all", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "just", "and", "but",
    "if", "or", "because", "until", "while", "what", "which", "who", "whom", "this", "that",
    "these", "those", "am", "it", "its",
];

fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Lexical-overlap scorer in `[0, 1]`; deterministic and weight-free.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubCrossEncoder;

impl StubCrossEncoder {
    pub fn score(&self, query: &str, document: &str) -> f32 {
        let query_words = content_words(query);
        let document_words = content_words(document);

        if query_words.is_empty() {
            let len_ratio = (query.len().min(document.len()) as f32)
                / (query.len().max(document.len()).max(1) as f32);
            return len_ratio * 0.3;
        }

        let matches = query_words.intersection(&document_words).count();
        let recall = matches as f32 / query_words.len() as f32;

        let union = query_words.union(&document_words).count();
        let jaccard = if union > 0 {
            matches as f32 / union as f32
        } else {
            0.0
        };

        let base_score = 0.6 * recall + 0.4 * jaccard;
        let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());

        normalized.clamp(0.0, 1.0)
    }
}

impl CrossEncoderBackend for StubCrossEncoder {
    fn predict(
        &self,
        pairs: &[(&str, &str)],
        _batch_size: usize,
    ) -> Result<Vec<f32>, BackendError> {
        debug!(pairs = pairs.len(), "Scoring pairs (stub)");
        Ok(pairs.iter().map(|(q, d)| self.score(q, d)).collect())
    }
}

/// Hash-seeded unit vectors; identical texts map to identical vectors.
#[derive(Debug, Clone, Copy)]
pub struct StubEmbedder {
    dim: usize,
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self {
            dim: STUB_EMBEDDING_DIM,
        }
    }
}

impl StubEmbedder {
    pub fn with_dim(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut state = hash_to_u64(text.as_bytes());
        let mut embedding = Vec::with_capacity(self.dim);

        for _ in 0..self.dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        embedding
    }
}

impl EmbeddingBackend for StubEmbedder {
    fn encode(&self, texts: &[&str], _batch_size: usize) -> Result<Vec<Vec<f32>>, BackendError> {
        debug!(texts = texts.len(), "Encoding texts (stub)");
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }
}

/// Loader that ignores the model id and hands out stub backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubLoader;

impl CrossEncoderLoader for StubLoader {
    type Backend = StubCrossEncoder;

    fn load(&self, request: &LoadRequest) -> Result<StubCrossEncoder, BackendError> {
        warn!(model = %request.model, "Cross-encoder running in STUB mode (testing only)");
        Ok(StubCrossEncoder)
    }
}

impl EmbeddingLoader for StubLoader {
    type Backend = StubEmbedder;

    fn load(&self, request: &LoadRequest) -> Result<StubEmbedder, BackendError> {
        warn!(model = %request.model, "Embedder running in STUB mode (testing only)");
        Ok(StubEmbedder::default())
    }
}
