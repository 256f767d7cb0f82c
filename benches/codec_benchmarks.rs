#![allow(missing_docs)]
//! Benchmarks for decoding, building and converting EURING records.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use euring::json::record_to_json_string;
use euring::{build, convert, decode, EuringFormat};

const EURING2000_RECORD: &str =
    "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";

fn benchmark_decode(c: &mut Criterion) {
    let plus = convert(
        &decode(EURING2000_RECORD, None).unwrap(),
        EuringFormat::Euring2000Plus,
        false,
    )
    .unwrap()
    .raw()
    .to_string();
    let modern = convert(
        &decode(EURING2000_RECORD, None).unwrap(),
        EuringFormat::Euring2020,
        false,
    )
    .unwrap()
    .raw()
    .to_string();

    c.bench_function("decode_euring2000", |b| {
        b.iter(|| decode(black_box(EURING2000_RECORD), None));
    });
    c.bench_function("decode_euring2000plus", |b| {
        b.iter(|| decode(black_box(&plus), None));
    });
    c.bench_function("decode_euring2020", |b| {
        b.iter(|| decode(black_box(&modern), Some(EuringFormat::Euring2020)));
    });
}

fn benchmark_build(c: &mut Criterion) {
    let record = decode(EURING2000_RECORD, None).unwrap();
    let values: Vec<(String, String)> = record
        .values_by_key()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    c.bench_function("build_euring2000", |b| {
        b.iter(|| build(EuringFormat::Euring2000, black_box(values.clone()), true));
    });
}

fn benchmark_convert(c: &mut Criterion) {
    let record = decode(EURING2000_RECORD, None).unwrap();

    c.bench_function("convert_2000_to_2020", |b| {
        b.iter(|| convert(black_box(&record), EuringFormat::Euring2020, false));
    });
    c.bench_function("convert_2000_to_2000plus", |b| {
        b.iter(|| convert(black_box(&record), EuringFormat::Euring2000Plus, false));
    });
}

fn benchmark_json(c: &mut Criterion) {
    let record = decode(EURING2000_RECORD, None).unwrap();

    c.bench_function("record_to_json", |b| {
        b.iter(|| record_to_json_string(black_box(&record), false));
    });
}

criterion_group!(
    benches,
    benchmark_decode,
    benchmark_build,
    benchmark_convert,
    benchmark_json
);
criterion_main!(benches);
