use super::*;
use crate::backend::mock::MockCrossEncoder;
use crate::device::DeviceProfile;
use crate::reranker::RerankerConfig;

fn stub_config(reranker: RerankerKind) -> Config {
    Config {
        reranker,
        stub: true,
        warm_up: false,
        ..Default::default()
    }
}

#[test]
fn test_kind_parse() {
    assert_eq!(
        "optimized_crossencoder".parse::<RerankerKind>().unwrap(),
        RerankerKind::OptimizedCrossEncoder
    );
    assert_eq!(
        " Fast_BiEncoder ".parse::<RerankerKind>().unwrap(),
        RerankerKind::FastBiEncoder
    );
}

#[test]
fn test_kind_parse_unknown() {
    let err = "colbert".parse::<RerankerKind>().unwrap_err();

    assert!(matches!(err, ConfigError::UnknownReranker { .. }));
    assert!(err.to_string().contains("colbert"));
}

#[test]
fn test_kind_display_round_trips_through_serde() {
    for kind in RerankerKind::ALL {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{kind}\""));
        assert_eq!(serde_json::from_str::<RerankerKind>(&json).unwrap(), kind);
    }
}

#[test]
fn test_kind_default_models() {
    assert_eq!(RerankerKind::default(), RerankerKind::OptimizedCrossEncoder);
    assert_eq!(
        RerankerKind::FastBiEncoder.default_model(),
        DEFAULT_BI_ENCODER_MODEL
    );
}

#[test]
fn test_build_stub_cross_encoder() {
    let scorer = build_scorer(&stub_config(RerankerKind::OptimizedCrossEncoder)).unwrap();

    let scores = scorer
        .get_scores("What is Rust?", &["Rust is a language", "Bananas are yellow"])
        .unwrap();

    assert_eq!(scorer.name(), "optimized_crossencoder");
    assert_eq!(scores.len(), 2);
    assert!(scores[0] > scores[1]);
}

#[test]
fn test_build_stub_bi_encoder() {
    let scorer = build_scorer(&stub_config(RerankerKind::FastBiEncoder)).unwrap();

    let scores = scorer.get_scores("query", &["query", "other"]).unwrap();

    assert_eq!(scorer.name(), "fast_biencoder");
    assert!((scores[0] - 1.0).abs() < 1e-5);
}

#[test]
fn test_build_rejects_invalid_config() {
    let config = Config {
        batch_size: Some(0),
        ..stub_config(RerankerKind::OptimizedCrossEncoder)
    };

    let Err(err) = build_scorer(&config) else {
        panic!("zero batch size should be rejected");
    };

    assert!(matches!(err, RerankerError::InvalidConfig { .. }));
}

#[test]
fn test_build_missing_local_model_fails() {
    let config = Config {
        model: Some("/nonexistent/sift-model".to_string()),
        stub: false,
        warm_up: false,
        ..Default::default()
    };

    let Err(err) = build_scorer(&config) else {
        panic!("missing model directory should fail to load");
    };

    assert!(matches!(err, RerankerError::Configuration { .. }));
}

#[test]
fn test_trait_object_delegates_to_reranker() {
    let mock = MockCrossEncoder::new();
    let reranker = CrossEncoderReranker::with_backend(
        RerankerConfig::new("mock").with_warm_up(false),
        DeviceProfile::cpu(4),
        mock.clone(),
    )
    .unwrap();
    let scorer: Box<dyn RelevanceScorer> = Box::new(reranker);

    let scores = scorer.get_scores("q", &["a", "bbb"]).unwrap();

    assert_eq!(scores, vec![1.0, 3.0]);
    assert_eq!(mock.call_count(), 1);
}

#[test]
fn test_boxed_scorer_is_debuggable() {
    let scorer = build_scorer(&stub_config(RerankerKind::FastBiEncoder)).unwrap();

    let rendered = format!("{scorer:?}");

    assert!(rendered.contains("BiEncoderReranker"));
}
