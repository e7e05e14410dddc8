//! Criterion microbenches for facelabel hot paths.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Label vector encoding with the cascade rules (once per exported frame)
//! - Store insertion with the overlap check
//! - Project document parsing (from_json_str)

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use std::hint::black_box;

use facelabel::catalog::LabelCatalog;
use facelabel::encode::encode;
use facelabel::model::{AnnotationInterval, LabelConfig};
use facelabel::project::{from_json_str, to_json_string};
use facelabel::store::AnnotationStore;

fn sample_intervals(n: usize) -> Vec<AnnotationInterval> {
    (0..n)
        .map(|i| {
            let start = i as f64 * 2.0;
            AnnotationInterval::new(
                start,
                start + 1.5,
                vec![
                    LabelConfig::linear("jawOpen", 0.8),
                    LabelConfig::constant("tongueUp", 0.6),
                ],
            )
            .unwrap()
        })
        .collect()
}

/// Benchmark encoding a multi-label frame.
fn bench_encode(c: &mut Criterion) {
    let catalog = LabelCatalog::facial_actions();
    let labels = vec![
        LabelConfig::linear("jawOpen", 0.8),
        LabelConfig::constant("tongueUp", 0.6),
        LabelConfig::linear("mouthSmileLeft", 1.0),
    ];

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("three_labels", |b| {
        b.iter(|| {
            let vector = encode(black_box(&labels), black_box(0.42), &catalog);
            black_box(vector)
        })
    });

    group.bench_function("three_labels_to_text", |b| {
        b.iter(|| {
            let text = encode(black_box(&labels), black_box(0.42), &catalog).to_text();
            black_box(text)
        })
    });

    group.finish();
}

/// Benchmark filling a store; every insert checks overlap against all
/// members.
fn bench_store_add(c: &mut Criterion) {
    let intervals = sample_intervals(200);

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(intervals.len() as u64));

    group.bench_function("add_200", |b| {
        b.iter_batched(
            || intervals.clone(),
            |intervals| {
                let mut store = AnnotationStore::new();
                for interval in intervals {
                    store.add(interval).unwrap();
                }
                black_box(store)
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

/// Benchmark project parsing.
///
/// We serialize a store once, then benchmark loading it back.
fn bench_project_parse(c: &mut Criterion) {
    let mut store = AnnotationStore::new();
    for interval in sample_intervals(100) {
        store.add(interval).unwrap();
    }
    let json = to_json_string(&store).unwrap();

    let mut group = c.benchmark_group("project_parse");
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("from_json_str", |b| {
        b.iter(|| {
            let load = from_json_str(black_box(&json)).unwrap();
            black_box(load)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_store_add, bench_project_parse);
criterion_main!(benches);
