//! Strategy selection by name.
//!
//! Both rerankers implement [`RelevanceScorer`]; [`build_scorer`] picks one from a
//! [`Config`] and hides the backend type behind a trait object.

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::candle_backend::CandleLoader;
use crate::backend::stub::StubLoader;
use crate::backend::{CrossEncoderBackend, EmbeddingBackend};
use crate::biencoder::BiEncoderReranker;
use crate::config::{Config, ConfigError};
use crate::constants::{DEFAULT_BI_ENCODER_MODEL, DEFAULT_CROSS_ENCODER_MODEL};
use crate::device::SystemProbe;
use crate::reranker::{CrossEncoderReranker, RerankerError};

/// The shared scoring contract: one score per document, in input order.
pub trait RelevanceScorer: fmt::Debug + Send + Sync {
    /// Registry name of the strategy.
    fn name(&self) -> &'static str;

    fn get_scores(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError>;
}

impl<B> RelevanceScorer for CrossEncoderReranker<B>
where
    B: CrossEncoderBackend + Send + Sync,
{
    fn name(&self) -> &'static str {
        RerankerKind::OptimizedCrossEncoder.as_str()
    }

    fn get_scores(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError> {
        CrossEncoderReranker::get_scores(self, query, documents)
    }
}

impl<E> RelevanceScorer for BiEncoderReranker<E>
where
    E: EmbeddingBackend + Send + Sync,
{
    fn name(&self) -> &'static str {
        RerankerKind::FastBiEncoder.as_str()
    }

    fn get_scores(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError> {
        BiEncoderReranker::get_scores(self, query, documents)
    }
}

/// Registered scoring strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RerankerKind {
    /// Cross-encoder with batching, chunking and fallback.
    #[default]
    #[serde(rename = "optimized_crossencoder")]
    OptimizedCrossEncoder,
    /// Bi-encoder embeddings with cosine similarity.
    #[serde(rename = "fast_biencoder")]
    FastBiEncoder,
}

impl RerankerKind {
    pub const ALL: [RerankerKind; 2] = [
        RerankerKind::OptimizedCrossEncoder,
        RerankerKind::FastBiEncoder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RerankerKind::OptimizedCrossEncoder => "optimized_crossencoder",
            RerankerKind::FastBiEncoder => "fast_biencoder",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            RerankerKind::OptimizedCrossEncoder => DEFAULT_CROSS_ENCODER_MODEL,
            RerankerKind::FastBiEncoder => DEFAULT_BI_ENCODER_MODEL,
        }
    }
}

impl fmt::Display for RerankerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RerankerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        RerankerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownReranker {
                value: s.to_string(),
            })
    }
}

/// Builds the scorer selected by `config`.
///
/// Uses the candle backend unless `config.stub` is set. Device detection runs once
/// here; the resulting scorer keeps its profile for life.
pub fn build_scorer(config: &Config) -> Result<Box<dyn RelevanceScorer>, RerankerError> {
    config
        .validate()
        .map_err(|e| RerankerError::InvalidConfig {
            reason: e.to_string(),
        })?;

    let probe = SystemProbe::new().with_gpu_memory_gb(config.gpu_memory_gb);

    info!(
        reranker = %config.reranker,
        model = config.model(),
        stub = config.stub,
        "Building relevance scorer"
    );

    let scorer: Box<dyn RelevanceScorer> = match (config.reranker, config.stub) {
        (RerankerKind::OptimizedCrossEncoder, false) => Box::new(CrossEncoderReranker::load(
            config.reranker_config(),
            &probe,
            &CandleLoader::new(),
        )?),
        (RerankerKind::OptimizedCrossEncoder, true) => Box::new(CrossEncoderReranker::load(
            config.reranker_config(),
            &probe,
            &StubLoader,
        )?),
        (RerankerKind::FastBiEncoder, false) => Box::new(BiEncoderReranker::load(
            config.biencoder_config(),
            &probe,
            &CandleLoader::new(),
        )?),
        (RerankerKind::FastBiEncoder, true) => Box::new(BiEncoderReranker::load(
            config.biencoder_config(),
            &probe,
            &StubLoader,
        )?),
    };

    Ok(scorer)
}
