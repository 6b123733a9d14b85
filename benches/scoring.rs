use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

#[path = "../tests/common/mod.rs"]
mod common;

use common::{TEST_QUERY, test_documents};
use sift::backend::stub::StubLoader;
use sift::{
    BiEncoderConfig, BiEncoderReranker, CrossEncoderReranker, RerankerConfig, StaticProbe,
};

fn bench_strategies(c: &mut Criterion) {
    common::init_tracing();

    let probe = StaticProbe::cpu_only();
    let docs = test_documents();

    let cross = CrossEncoderReranker::load(
        RerankerConfig::new("stub").with_warm_up(false),
        &probe,
        &StubLoader,
    )
    .expect("stub cross-encoder");
    let bi = BiEncoderReranker::load(BiEncoderConfig::new("stub"), &probe, &StubLoader)
        .expect("stub bi-encoder");

    let mut group = c.benchmark_group("get_scores");
    for n in [10usize, 50] {
        let slice = &docs[..n];

        group.bench_with_input(BenchmarkId::new("optimized_crossencoder", n), slice, |b, d| {
            b.iter(|| cross.get_scores(black_box(TEST_QUERY), black_box(d)))
        });
        group.bench_with_input(BenchmarkId::new("fast_biencoder", n), slice, |b, d| {
            b.iter(|| bi.get_scores(black_box(TEST_QUERY), black_box(d)))
        });
    }
    group.finish();
}

fn bench_pair_cache(c: &mut Criterion) {
    let cross = CrossEncoderReranker::load(
        RerankerConfig::new("stub").with_warm_up(false),
        &StaticProbe::cpu_only(),
        &StubLoader,
    )
    .expect("stub cross-encoder");
    let doc = test_documents()[0];
    let _ = cross.score_pair(TEST_QUERY, doc);

    c.bench_function("score_pair_cached", |b| {
        b.iter(|| cross.score_pair(black_box(TEST_QUERY), black_box(doc)))
    });
}

criterion_group!(benches, bench_strategies, bench_pair_cache);
criterion_main!(benches);
