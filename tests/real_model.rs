//! Tests against real model weights. Run with:
//!
//! ```text
//! SIFT_MODEL=/path/to/cross-encoder cargo test --test real_model -- --ignored
//! ```

mod common;

use anyhow::Result;
use common::{init_tracing, test_documents, TEST_QUERY};
use sift::{Config, RerankerKind, build_scorer};

fn config_from_env(reranker: RerankerKind) -> Result<Config> {
    let mut config = Config::from_env()?;
    config.reranker = reranker;
    config.stub = false;
    Ok(config)
}

#[test]
#[ignore]
fn test_real_cross_encoder_ranks_relevant_first() -> Result<()> {
    init_tracing();
    let scorer = build_scorer(&config_from_env(RerankerKind::OptimizedCrossEncoder)?)?;

    let scores = scorer.get_scores(
        "What is the capital of France?",
        &["Paris is the capital of France.", "Bananas are rich in potassium."],
    )?;

    assert_eq!(scores.len(), 2);
    assert!(scores[0] > scores[1]);
    Ok(())
}

#[test]
#[ignore]
fn test_real_cross_encoder_fixture() -> Result<()> {
    init_tracing();
    let scorer = build_scorer(&config_from_env(RerankerKind::OptimizedCrossEncoder)?)?;
    let docs = test_documents();

    let scores = scorer.get_scores(TEST_QUERY, &docs)?;

    assert_eq!(scores.len(), docs.len());
    assert!(scores.iter().all(|s| s.is_finite()));
    Ok(())
}

#[test]
#[ignore]
fn test_real_bi_encoder_fixture() -> Result<()> {
    init_tracing();
    let mut config = config_from_env(RerankerKind::FastBiEncoder)?;
    config.model = std::env::var("SIFT_BI_ENCODER_MODEL").ok();
    let scorer = build_scorer(&config)?;
    let docs = test_documents();

    let scores = scorer.get_scores(TEST_QUERY, &docs)?;

    assert_eq!(scores.len(), docs.len());
    assert!(scores.iter().all(|s| (-1.0001..=1.0001).contains(s)));
    Ok(())
}
