use super::mock::{FailureMode, MockCrossEncoder, MockEmbedder, MockLoader};
use super::source::{CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE};
use super::stub::{STUB_EMBEDDING_DIM, StubCrossEncoder, StubEmbedder, StubLoader};
use super::*;
use crate::device::DeviceProfile;
use candle_core::{DType, Device};
use std::path::PathBuf;

#[test]
fn test_stub_score_range() {
    let stub = StubCrossEncoder;

    let score = stub.score("query", "candidate");

    assert!((0.0..=1.0).contains(&score));
}

#[test]
fn test_stub_score_determinism() {
    let stub = StubCrossEncoder;

    let score1 = stub.score("What is Rust?", "Rust is a language");
    let score2 = stub.score("What is Rust?", "Rust is a language");

    assert_eq!(score1, score2);
}

#[test]
fn test_stub_similar_texts_score_higher() {
    let stub = StubCrossEncoder;

    let similar = stub.score("What is Rust?", "Rust is a systems programming language");
    let dissimilar = stub.score("What is Rust?", "Python is great for data science");

    assert!(similar > dissimilar);
}

#[test]
fn test_stub_predict_preserves_order() {
    let stub = StubCrossEncoder;
    let pairs = [
        ("What is Rust?", "Python is a scripting language"),
        ("What is Rust?", "Rust is a systems programming language"),
    ];

    let scores = stub.predict(&pairs, 1).unwrap();

    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0], stub.score(pairs[0].0, pairs[0].1));
    assert_eq!(scores[1], stub.score(pairs[1].0, pairs[1].1));
}

#[test]
fn test_stub_predict_empty() {
    let scores = StubCrossEncoder.predict(&[], 16).unwrap();
    assert!(scores.is_empty());
}

#[test]
fn test_stub_embedder_unit_vectors() {
    let embedder = StubEmbedder::default();

    let vectors = embedder.encode(&["alpha", "beta"], 8).unwrap();

    assert_eq!(vectors.len(), 2);
    for v in &vectors {
        assert_eq!(v.len(), STUB_EMBEDDING_DIM);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
    assert_ne!(vectors[0], vectors[1]);
}

#[test]
fn test_stub_embedder_determinism() {
    let embedder = StubEmbedder::with_dim(16);

    assert_eq!(embedder.embed("same text"), embedder.embed("same text"));
}

#[test]
fn test_stub_loader_ignores_model() {
    let request = LoadRequest::new("anything/at-all", DeviceProfile::cpu(4), 512);

    let backend = CrossEncoderLoader::load(&StubLoader, &request).unwrap();

    assert!(!backend.is_compiled());
}

#[test]
fn test_model_source_hub_id() {
    let source = ModelSource::parse("BAAI/bge-base-en-v1.5").unwrap();

    assert_eq!(source, ModelSource::Hub("BAAI/bge-base-en-v1.5".to_string()));
}

#[test]
fn test_model_source_local_paths() {
    let dir = tempfile::tempdir().unwrap();
    let existing = dir.path().to_string_lossy().into_owned();

    assert_eq!(
        ModelSource::parse(&existing).unwrap(),
        ModelSource::Local(PathBuf::from(&existing))
    );
    assert_eq!(
        ModelSource::parse("/models/missing").unwrap(),
        ModelSource::Local(PathBuf::from("/models/missing"))
    );
    assert_eq!(
        ModelSource::parse("./models/reranker").unwrap(),
        ModelSource::Local(PathBuf::from("./models/reranker"))
    );
}

#[test]
fn test_model_source_empty_rejected() {
    let err = ModelSource::parse("   ").unwrap_err();

    assert!(matches!(err, BackendError::InvalidConfig { .. }));
}

#[test]
fn test_model_files_missing_dir() {
    let err = ModelFiles::from_dir(&PathBuf::from("/nonexistent/reranker")).unwrap_err();

    assert!(matches!(err, BackendError::ModelNotFound { .. }));
    assert!(err.to_string().contains("/nonexistent/reranker"));
}

#[test]
fn test_model_files_missing_weights() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
    std::fs::write(dir.path().join(TOKENIZER_FILE), "{}").unwrap();

    let err = ModelFiles::from_dir(dir.path()).unwrap_err();

    assert!(matches!(err, BackendError::ModelLoadFailed { .. }));
    assert!(err.to_string().contains(WEIGHTS_FILE));
}

#[test]
fn test_model_files_complete_dir() {
    let dir = tempfile::tempdir().unwrap();
    for file in [CONFIG_FILE, WEIGHTS_FILE, TOKENIZER_FILE] {
        std::fs::write(dir.path().join(file), b"").unwrap();
    }

    let files = ModelFiles::from_dir(dir.path()).unwrap();

    assert_eq!(files.weights, dir.path().join(WEIGHTS_FILE));
    assert_eq!(files.tokenizer, dir.path().join(TOKENIZER_FILE));
}

#[test]
fn test_candle_loader_missing_local_model() {
    let request = LoadRequest::new("/nonexistent/reranker", DeviceProfile::cpu(4), 512);

    let result = CrossEncoderLoader::load(&candle_backend::CandleLoader::new(), &request);

    assert!(matches!(result, Err(BackendError::ModelNotFound { .. })));
}

#[test]
fn test_mock_failure_above_batch_size() {
    let mock = MockCrossEncoder::new().with_failure(FailureMode::AboveBatchSize(4));
    let pairs = [("q", "a"), ("q", "bb")];

    assert!(mock.predict(&pairs, 8).is_err());
    assert_eq!(mock.predict(&pairs, 4).unwrap(), vec![1.0, 2.0]);

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].failed);
    assert!(!calls[1].failed);
    assert_eq!(calls[1].batch_size, 4);
}

#[test]
fn test_mock_first_calls_fail() {
    let mock = MockCrossEncoder::new().with_failure(FailureMode::FirstCalls(1));

    assert!(mock.predict(&[("q", "a")], 1).is_err());
    assert!(mock.predict(&[("q", "a")], 1).is_ok());
}

#[test]
fn test_mock_clones_share_calls() {
    let mock = MockCrossEncoder::new();
    let handle = mock.clone();

    mock.predict(&[("q", "doc")], 2).unwrap();

    assert_eq!(handle.call_count(), 1);
    assert_eq!(handle.calls_with_document("doc"), 1);
}

#[test]
fn test_mock_embedder_records_calls() {
    let mock = MockEmbedder::new(|t| vec![t.len() as f32, 1.0]);

    let vectors = mock.encode(&["ab", "abc"], 32).unwrap();

    assert_eq!(vectors, vec![vec![2.0, 1.0], vec![3.0, 1.0]]);
    assert_eq!(mock.calls()[0].batch_size, 32);
}

#[test]
fn test_mock_loader_failing() {
    let loader = MockLoader::<MockCrossEncoder>::failing();
    let request = LoadRequest::new("missing", DeviceProfile::cpu(2), 128).with_compile(true);

    let result = CrossEncoderLoader::load(&loader, &request);

    assert!(matches!(result, Err(BackendError::ModelLoadFailed { .. })));
    assert_eq!(loader.requests().len(), 1);
    assert!(loader.requests()[0].compile);
}

#[test]
fn test_boxed_backend_delegates() {
    let boxed: Box<dyn CrossEncoderBackend> = Box::new(StubCrossEncoder);

    let scores = boxed.predict(&[("rust", "rust")], 1).unwrap();

    assert_eq!(scores.len(), 1);
}

#[test]
fn test_error_messages_descriptive() {
    let err = BackendError::OutputCountMismatch {
        expected: 3,
        actual: 2,
    };
    assert!(err.to_string().contains('3'));
    assert!(err.to_string().contains('2'));

    let err = BackendError::DownloadFailed {
        model: "org/model".to_string(),
        reason: "offline".to_string(),
    };
    assert!(err.to_string().contains("org/model"));
    assert!(err.to_string().contains("offline"));
}

fn write_checkpoint(dir: &std::path::Path, tensor_name: &str) -> ModelFiles {
    let tensor = candle_core::Tensor::zeros((4, 2), DType::F32, &Device::Cpu).unwrap();
    let tensors = std::collections::HashMap::from([(tensor_name.to_string(), tensor)]);
    candle_core::safetensors::save(&tensors, dir.join(WEIGHTS_FILE)).unwrap();
    std::fs::write(dir.join(CONFIG_FILE), "{}").unwrap();
    std::fs::write(dir.join(TOKENIZER_FILE), "{}").unwrap();
    ModelFiles::from_dir(dir).unwrap()
}

#[test]
fn test_roberta_classifier_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_checkpoint(dir.path(), "roberta.embeddings.word_embeddings.weight");

    let err = bert::BertClassifier::load(&files, DType::F32, &Device::Cpu)
        .err()
        .unwrap();

    assert!(err.to_string().contains("RoBERTa"));
}

#[test]
fn test_roberta_encoder_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_checkpoint(dir.path(), "roberta.embeddings.word_embeddings.weight");

    let err = bert::BertEncoder::load(&files, DType::F32, &Device::Cpu, bert::Pooling::Cls)
        .err()
        .unwrap();

    assert!(err.to_string().contains("RoBERTa"));
}

#[test]
fn test_bert_checkpoint_passes_architecture_check() {
    let dir = tempfile::tempdir().unwrap();
    let files = write_checkpoint(dir.path(), "bert.embeddings.word_embeddings.weight");

    let err = bert::BertClassifier::load(&files, DType::F32, &Device::Cpu)
        .err()
        .unwrap();

    assert!(!err.to_string().contains("RoBERTa"));
}
