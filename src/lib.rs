//! Sift library crate: relevance scoring for (query, document) pairs.
//!
//! # Public API Surface
//!
//! ## Scorers
//! - [`CrossEncoderReranker`], [`RerankerConfig`] - Cross-encoder with chunking,
//!   one-shot batch-halving fallback and a pair score cache
//! - [`BiEncoderReranker`], [`BiEncoderConfig`] - Embedding + cosine fast path
//! - [`RelevanceScorer`], [`RerankerKind`], [`build_scorer`] - Strategy selection
//!
//! ## Backends
//! - [`CrossEncoderBackend`], [`EmbeddingBackend`] - Inference contracts
//! - [`backend::candle_backend`] - BERT-family models on candle
//! - [`backend::stub`] - Deterministic scoring without weights
//!
//! ## Device
//! - [`ComputeTarget`], [`DeviceProfile`], [`AcceleratorProbe`] - Target detection and
//!   batch-size policy
//!
//! ## Configuration
//! - [`Config`], [`ConfigError`] - `SIFT_*` environment configuration
//!
//! ## Test/Mock Support
//! Mock backends are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod backend;
pub mod biencoder;
pub mod cache;
pub mod config;
pub mod constants;
pub mod device;
pub mod hashing;
pub mod registry;
pub mod reranker;

pub use backend::{
    BackendError, CrossEncoderBackend, CrossEncoderLoader, EmbeddingBackend, EmbeddingLoader,
    LoadRequest, ModelFiles, ModelSource,
};
#[cfg(any(test, feature = "mock"))]
pub use backend::mock::{FailureMode, MockCrossEncoder, MockEmbedder, MockLoader};
pub use biencoder::{BiEncoderConfig, BiEncoderReranker};
pub use cache::PairScoreCache;
pub use config::{Config, ConfigError};
pub use device::{
    AcceleratorProbe, BatchPolicy, CapacityClass, ComputeTarget, DeviceProfile, StaticProbe,
    SystemProbe, detect_target, detect_target_for,
};
pub use hashing::{hash_pair, hash_text, hash_to_u64};
pub use registry::{RelevanceScorer, RerankerKind, build_scorer};
pub use reranker::{CrossEncoderReranker, RerankerConfig, RerankerError, ScorerState};
