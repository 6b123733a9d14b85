//! Bi-encoder fast path: independent embeddings plus cosine similarity.
//!
//! Much cheaper than a cross-encoder since the query is encoded once and documents
//! do not attend to it. There is no batch fallback here: any backend error or shape
//! mismatch fails the whole call.

pub mod config;
pub mod similarity;


pub use config::BiEncoderConfig;
pub use similarity::{cosine_similarity, dot, normalize};

use std::time::Instant;

use tracing::{debug, error, info};

use crate::backend::{BackendError, EmbeddingBackend, EmbeddingLoader, LoadRequest};
use crate::device::{AcceleratorProbe, BatchPolicy, ComputeTarget, DeviceProfile};
use crate::reranker::{RerankerError, ScorerState};

pub struct BiEncoderReranker<E> {
    backend: E,
    profile: DeviceProfile,
    config: BiEncoderConfig,
}

impl<E> std::fmt::Debug for BiEncoderReranker<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiEncoderReranker")
            .field("profile", &self.profile)
            .field("config", &self.config)
            .finish()
    }
}

impl<E: EmbeddingBackend> BiEncoderReranker<E> {
    pub fn load<L>(
        config: BiEncoderConfig,
        probe: &dyn AcceleratorProbe,
        loader: &L,
    ) -> Result<Self, RerankerError>
    where
        L: EmbeddingLoader<Backend = E>,
    {
        config
            .validate()
            .map_err(|reason| RerankerError::InvalidConfig { reason })?;

        let profile = DeviceProfile::resolve(probe, BatchPolicy::BiEncoder, config.batch_size);

        info!(
            model = %config.model,
            device = %profile.target(),
            batch_size = profile.batch_size(),
            "Initializing bi-encoder reranker"
        );

        let start = Instant::now();
        let request = LoadRequest::new(&config.model, profile, config.max_seq_len);

        let backend = loader.load(&request).map_err(|source| {
            error!(
                model = %config.model,
                error = %source,
                state = ?ScorerState::Failed,
                "Embedding backend could not be instantiated"
            );
            RerankerError::Configuration {
                model: config.model.clone(),
                source,
            }
        })?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Bi-encoder initialized"
        );

        Self::with_backend(config, profile, backend)
    }

    pub fn with_backend(
        config: BiEncoderConfig,
        profile: DeviceProfile,
        backend: E,
    ) -> Result<Self, RerankerError> {
        config
            .validate()
            .map_err(|reason| RerankerError::InvalidConfig { reason })?;

        Ok(Self {
            backend,
            profile,
            config,
        })
    }

    /// Similarity of every document to `query`, in input order.
    pub fn get_scores(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let batch_size = self.profile.batch_size();

        let mut query_embedding = self.encode(&[query], 1)?.pop().ok_or_else(|| {
            Self::scoring_error(
                1,
                BackendError::OutputCountMismatch {
                    expected: 1,
                    actual: 0,
                },
            )
        })?;

        let mut doc_embeddings = self.encode(documents, batch_size)?;

        if let Some(bad) = doc_embeddings
            .iter()
            .find(|v| v.len() != query_embedding.len())
        {
            return Err(Self::scoring_error(
                batch_size,
                BackendError::InferenceFailed {
                    reason: format!(
                        "embedding dimension mismatch: query {} vs document {}",
                        query_embedding.len(),
                        bad.len()
                    ),
                },
            ));
        }

        let scores: Vec<f32> = if self.config.normalize_embeddings {
            normalize(&mut query_embedding);
            doc_embeddings
                .iter_mut()
                .map(|doc| {
                    normalize(doc);
                    dot(&query_embedding, doc)
                })
                .collect()
        } else {
            doc_embeddings
                .iter()
                .map(|doc| cosine_similarity(&query_embedding, doc))
                .collect()
        };

        let elapsed = start.elapsed();
        info!(
            documents = documents.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            docs_per_sec = documents.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
            "Scored documents (bi-encoder)"
        );

        Ok(scores)
    }

    fn encode(&self, texts: &[&str], batch_size: usize) -> Result<Vec<Vec<f32>>, RerankerError> {
        let embeddings = self
            .backend
            .encode(texts, batch_size)
            .map_err(|source| Self::scoring_error(batch_size, source))?;

        if embeddings.len() != texts.len() {
            return Err(Self::scoring_error(
                batch_size,
                BackendError::OutputCountMismatch {
                    expected: texts.len(),
                    actual: embeddings.len(),
                },
            ));
        }

        debug!(texts = texts.len(), batch_size, "Encoded texts");
        Ok(embeddings)
    }

    fn scoring_error(batch_size: usize, source: BackendError) -> RerankerError {
        error!(error = %source, batch_size, "Bi-encoder scoring failed");
        RerankerError::Scoring { batch_size, source }
    }

    #[inline]
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    #[inline]
    pub fn target(&self) -> ComputeTarget {
        self.profile.target()
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.profile.batch_size()
    }

    pub fn config(&self) -> &BiEncoderConfig {
        &self.config
    }
}
