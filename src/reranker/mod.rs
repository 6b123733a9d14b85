//! Cross-encoder reranking with batching policy.
//!
//! [`CrossEncoderReranker`] pairs the query with every document and hands the pairs to
//! an injected [`CrossEncoderBackend`]. Around that call it:
//!
//! - splits inputs above `max_docs_per_call` into ordered chunks,
//! - retries a failing chunk once at half the batch size (never deeper),
//! - memoizes single-pair scores in a bounded LRU cache.
//!
//! Scores come back in input order with the backend's own scale.

pub mod config;
pub mod error;


pub use config::RerankerConfig;
pub use error::RerankerError;

use std::cmp::Ordering;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::backend::{BackendError, CrossEncoderBackend, CrossEncoderLoader, LoadRequest};
use crate::cache::PairScoreCache;
use crate::constants::{WARM_UP_PASSAGES, WARM_UP_QUERY};
use crate::device::{AcceleratorProbe, BatchPolicy, ComputeTarget, DeviceProfile};

/// Lifecycle stage reported in construction logs.
///
/// Construction either returns a ready reranker or an error, so no value carries the
/// state; `Failed` is what gets logged when the backend cannot be instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerState {
    Uninitialized,
    Ready,
    Failed,
}

pub struct CrossEncoderReranker<B> {
    backend: B,
    profile: DeviceProfile,
    config: RerankerConfig,
    cache: Option<PairScoreCache>,
}

impl<B> std::fmt::Debug for CrossEncoderReranker<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoderReranker")
            .field("profile", &self.profile)
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<B: CrossEncoderBackend> CrossEncoderReranker<B> {
    /// Resolves the device profile, instantiates the backend through `loader`, and
    /// warms it up if configured.
    ///
    /// A loader failure is a [`RerankerError::Configuration`]; a warm-up failure is
    /// only logged.
    pub fn load<L>(
        config: RerankerConfig,
        probe: &dyn AcceleratorProbe,
        loader: &L,
    ) -> Result<Self, RerankerError>
    where
        L: CrossEncoderLoader<Backend = B>,
    {
        config
            .validate()
            .map_err(|reason| RerankerError::InvalidConfig { reason })?;

        let profile = DeviceProfile::resolve(probe, BatchPolicy::CrossEncoder, config.batch_size);

        info!(
            model = %config.model,
            device = %profile.target(),
            batch_size = profile.batch_size(),
            state = ?ScorerState::Uninitialized,
            "Initializing cross-encoder reranker"
        );

        let start = Instant::now();
        let request = LoadRequest::new(&config.model, profile, config.max_seq_len)
            .with_compile(config.compile_model);

        let backend = loader.load(&request).map_err(|source| {
            error!(
                model = %config.model,
                error = %source,
                state = ?ScorerState::Failed,
                "Scoring backend could not be instantiated"
            );
            RerankerError::Configuration {
                model: config.model.clone(),
                source,
            }
        })?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            compiled = backend.is_compiled(),
            "Model initialized"
        );

        Self::with_backend(config, profile, backend)
    }

    /// Wraps an already-instantiated backend bound to `profile`.
    pub fn with_backend(
        config: RerankerConfig,
        profile: DeviceProfile,
        backend: B,
    ) -> Result<Self, RerankerError> {
        config
            .validate()
            .map_err(|reason| RerankerError::InvalidConfig { reason })?;

        let cache = (config.cache_capacity > 0)
            .then(|| PairScoreCache::with_capacity(config.cache_capacity));

        let reranker = Self {
            backend,
            profile,
            config,
            cache,
        };

        if reranker.config.warm_up {
            reranker.warm_up();
        }

        debug!(state = ?ScorerState::Ready, "Cross-encoder reranker ready");
        Ok(reranker)
    }

    fn warm_up(&self) {
        info!("Warming up model");
        let start = Instant::now();

        match self.score_chunk(WARM_UP_QUERY, &WARM_UP_PASSAGES) {
            Ok(_) => info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Model warmed up"
            ),
            Err(e) => {
                let err = RerankerError::WarmUp {
                    reason: e.to_string(),
                };
                warn!(error = %err, "Continuing without warm-up");
            }
        }
    }

    /// Scores every document against `query`; `scores[i]` belongs to `documents[i]`.
    ///
    /// Empty input returns immediately without touching the backend.
    pub fn get_scores(&self, query: &str, documents: &[&str]) -> Result<Vec<f32>, RerankerError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let ceiling = self.config.max_docs_per_call;

        let scores = if documents.len() <= ceiling {
            self.score_chunk(query, documents)?
        } else {
            info!(
                documents = documents.len(),
                chunk_size = ceiling,
                chunks = documents.len().div_ceil(ceiling),
                "Processing documents in chunks"
            );

            let mut scores = Vec::with_capacity(documents.len());
            for chunk in documents.chunks(ceiling) {
                scores.extend(self.score_chunk(query, chunk)?);
            }
            scores
        };

        let elapsed = start.elapsed();
        info!(
            documents = documents.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            docs_per_sec = documents.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
            "Scored documents"
        );

        Ok(scores)
    }

    /// Scores one pair, consulting the pair cache first.
    pub fn score_pair(&self, query: &str, document: &str) -> Result<f32, RerankerError> {
        if let Some(cache) = &self.cache
            && let Some(score) = cache.get(query, document)
        {
            debug!(query_len = query.len(), "Pair cache hit");
            return Ok(score);
        }

        let score = self
            .score_chunk(query, &[document])?
            .first()
            .copied()
            .ok_or_else(|| RerankerError::Scoring {
                batch_size: self.profile.batch_size(),
                source: BackendError::OutputCountMismatch {
                    expected: 1,
                    actual: 0,
                },
            })?;

        if let Some(cache) = &self.cache {
            cache.insert(query, document, score);
        }

        Ok(score)
    }

    /// Document indices with scores, best first.
    pub fn rerank(
        &self,
        query: &str,
        documents: &[&str],
    ) -> Result<Vec<(usize, f32)>, RerankerError> {
        let mut ranked: Vec<(usize, f32)> = self
            .get_scores(query, documents)?
            .into_iter()
            .enumerate()
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        debug!(
            top_score = ranked.first().map(|(_, s)| *s),
            "Reranking complete"
        );

        Ok(ranked)
    }

    pub fn rerank_top_n(
        &self,
        query: &str,
        documents: &[&str],
        top_n: usize,
    ) -> Result<Vec<(usize, f32)>, RerankerError> {
        let mut ranked = self.rerank(query, documents)?;
        ranked.truncate(top_n);
        Ok(ranked)
    }

    /// One backend call for the whole chunk; on failure, one retry at half batch size.
    fn score_chunk(&self, query: &str, chunk: &[&str]) -> Result<Vec<f32>, RerankerError> {
        let batch_size = self.profile.batch_size();

        match self.predict(query, chunk, batch_size) {
            Ok(scores) => Ok(scores),
            Err(source) if batch_size > 1 => {
                let fallback_batch_size = (batch_size / 2).max(1);
                error!(error = %source, batch_size, "Scoring failed");
                info!(fallback_batch_size, "Retrying with smaller batch size");
                self.score_with_fallback(query, chunk, fallback_batch_size)
            }
            Err(source) => Err(RerankerError::Scoring { batch_size, source }),
        }
    }

    fn score_with_fallback(
        &self,
        query: &str,
        chunk: &[&str],
        batch_size: usize,
    ) -> Result<Vec<f32>, RerankerError> {
        let mut scores = Vec::with_capacity(chunk.len());

        for slice in chunk.chunks(batch_size) {
            let slice_scores = self.predict(query, slice, batch_size).map_err(|source| {
                warn!(error = %source, batch_size, "Fallback scoring failed");
                RerankerError::Scoring { batch_size, source }
            })?;
            scores.extend(slice_scores);
        }

        Ok(scores)
    }

    fn predict(
        &self,
        query: &str,
        documents: &[&str],
        batch_size: usize,
    ) -> Result<Vec<f32>, BackendError> {
        let pairs: Vec<(&str, &str)> = documents.iter().map(|doc| (query, *doc)).collect();
        let scores = self.backend.predict(&pairs, batch_size)?;

        if scores.len() != pairs.len() {
            return Err(BackendError::OutputCountMismatch {
                expected: pairs.len(),
                actual: scores.len(),
            });
        }

        Ok(scores)
    }

    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.backend.is_compiled()
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

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    /// The pair cache, or `None` when disabled.
    pub fn cache(&self) -> Option<&PairScoreCache> {
        self.cache.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
