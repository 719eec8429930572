//! Seed, message and record decoding benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cryptocheck_bench::{random_record_bytes, random_seed};
use cryptocheck_codec::{RecordReader, RECORD_SIZE};
use cryptocheck_core::{account_seed, SeedDeriver, MAX_MESSAGE_LENGTH};

/// Benchmark account seed derivation.
fn bench_account_seed(c: &mut Criterion) {
    let seed = random_seed();
    c.bench_function("account_seed", |b| {
        let mut n = 0u64;
        b.iter(|| {
            n = n.wrapping_add(1);
            black_box(account_seed(seed, black_box(n)));
        });
    });
}

/// Benchmark message reconstruction across lengths.
fn bench_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("message");
    let deriver = SeedDeriver::new(random_seed());

    for len in [1u64, 64, 4096, MAX_MESSAGE_LENGTH] {
        group.throughput(Throughput::Bytes(len));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter(|| black_box(deriver.message(black_box(len - 1))));
        });
    }

    group.finish();
}

/// Benchmark template construction.
fn bench_template(c: &mut Criterion) {
    c.bench_function("template", |b| {
        b.iter(|| black_box(SeedDeriver::new(black_box(random_seed()))));
    });
}

/// Benchmark streaming record decode.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let count = 10_000;
    let bytes = random_record_bytes(count);
    group.throughput(Throughput::Bytes((count * RECORD_SIZE) as u64));

    group.bench_function("records", |b| {
        b.iter(|| {
            let reader = RecordReader::new(black_box(&bytes[..]), 8);
            let decoded = reader.filter(Result::is_ok).count();
            black_box(decoded);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_account_seed,
    bench_message,
    bench_template,
    bench_decode
);
criterion_main!(benches);
