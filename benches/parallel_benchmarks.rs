#![allow(missing_docs)]
//! Parallel decoding benchmarks using rayon.
//!
//! Compares decoding a block of records one after another with decoding the
//! same block through the rayon batch helpers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use euring::batch::{decode_batch, decode_lines_parallel};
use euring::EuringReader;
use std::io::Cursor;

const EURING2000_RECORD: &str =
    "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";

fn records(count: usize) -> Vec<String> {
    (0..count).map(|_| EURING2000_RECORD.to_string()).collect()
}

fn benchmark_sequential_vs_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_batch");
    for count in [100usize, 1_000, 10_000] {
        let batch = records(count);
        group.bench_with_input(BenchmarkId::new("sequential", count), &batch, |b, batch| {
            b.iter(|| {
                batch
                    .iter()
                    .filter(|raw| euring::decode(black_box(raw), None).is_ok())
                    .count()
            });
        });
        group.bench_with_input(BenchmarkId::new("rayon", count), &batch, |b, batch| {
            b.iter(|| decode_batch(black_box(batch), None).len());
        });
    }
    group.finish();
}

fn benchmark_reader_vs_parallel_lines(c: &mut Criterion) {
    let text = records(1_000).join("\n");

    c.bench_function("reader_1k_lines", |b| {
        b.iter(|| {
            let reader = EuringReader::new(Cursor::new(black_box(text.as_bytes())));
            reader.filter(Result::is_ok).count()
        });
    });

    c.bench_function("parallel_1k_lines", |b| {
        b.iter(|| {
            decode_lines_parallel(black_box(&text), None)
                .map(|records| records.len())
                .unwrap_or(0)
        });
    });
}

criterion_group!(
    benches,
    benchmark_sequential_vs_parallel,
    benchmark_reader_vs_parallel_lines
);
criterion_main!(benches);
