//! Shared fixtures for integration tests and benches.

#![allow(dead_code)]

use tracing_subscriber::EnvFilter;

pub const TEST_QUERY: &str =
    "What are the latest advances in machine learning for natural language processing?";

const BASE_DOCUMENTS: [&str; 10] = [
    "Recent advances in transformer architectures have significantly improved natural language understanding tasks.",
    "Deep learning models like BERT and GPT have revolutionized how we approach text processing and generation.",
    "Attention mechanisms have become fundamental building blocks in modern neural network architectures.",
    "Pre-trained language models have shown remarkable performance across various NLP benchmarks.",
    "Fine-tuning large language models on specific tasks has become a standard practice in machine learning.",
    "The emergence of few-shot learning capabilities in large language models has opened new research directions.",
    "Multimodal models that combine text and image understanding are gaining increasing attention.",
    "Efficient training techniques like gradient accumulation and mixed precision have made large model training feasible.",
    "The development of more efficient architectures like MobileBERT has enabled deployment on edge devices.",
    "Recent work on interpretability has helped understand what language models learn during training.",
];

/// The ten base documents repeated five times (50 total).
pub fn test_documents() -> Vec<&'static str> {
    BASE_DOCUMENTS.iter().copied().cycle().take(50).collect()
}

/// `n` distinct documents named `doc-0..doc-{n-1}`.
pub fn numbered_documents(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("doc-{i}")).collect()
}

/// Score that decodes the index from a `numbered_documents` entry.
pub fn index_score(_: &str, document: &str) -> f32 {
    document
        .trim_start_matches("doc-")
        .parse::<f32>()
        .unwrap_or(-1.0)
}

/// Installs an env-filtered fmt subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
