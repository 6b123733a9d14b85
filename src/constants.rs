//! Cross-cutting, shared constants.
//!
//! Batch-size policy values live here so the device profile and both reranker
//! strategies agree on them.

/// Upper bound on documents sent to the backend in one chunk.
pub const MAX_DOCS_PER_CALL: usize = 1000;

/// Default capacity of the single-pair score cache.
pub const DEFAULT_PAIR_CACHE_CAPACITY: u64 = 1000;

/// Default max tokens per (query, document) pair.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// BERT-family checkpoint; the candle backend loads BERT encoders only.
pub const DEFAULT_CROSS_ENCODER_MODEL: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";
pub const DEFAULT_BI_ENCODER_MODEL: &str = "BAAI/bge-base-en-v1.5";

/// CUDA devices with at least this much memory get [`BATCH_SIZE_GPU_HIGH`].
pub const GPU_HIGH_MEMORY_GB: f64 = 24.0;
/// CUDA devices with at least this much memory get [`BATCH_SIZE_GPU_MID`].
pub const GPU_MID_MEMORY_GB: f64 = 12.0;

pub const BATCH_SIZE_GPU_HIGH: usize = 128;
pub const BATCH_SIZE_GPU_MID: usize = 64;
pub const BATCH_SIZE_GPU_LOW: usize = 32;
pub const BATCH_SIZE_METAL: usize = 64;
pub const BATCH_SIZE_CPU: usize = 16;

pub const BI_ENCODER_BATCH_SIZE_ACCELERATOR: usize = 256;
pub const BI_ENCODER_BATCH_SIZE_CPU: usize = 64;

/// Inputs larger than this log per-batch progress.
pub const PROGRESS_LOG_THRESHOLD: usize = 50;

pub const WARM_UP_QUERY: &str = "This is a sample query for warming up the model";
pub const WARM_UP_PASSAGES: [&str; 2] = [
    "This is a sample passage to warm up the reranking model",
    "Another sample passage for model initialization",
];
