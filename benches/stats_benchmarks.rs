//! Statistics benchmarks: per-file reduction over realistic trace sizes.
//!
//! A Keithley capture at 1 kS/s over a multi-second window lands in the
//! 10^4..10^6 sample range; the reduction must stay comfortably linear.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use vatio::stats::{sample_std, summarize, trimmed_mean};

/// Deterministic pseudo-trace around 45 mA with periodic ripple.
fn synthetic_trace(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 45.0 + (i as f64 * 0.7).sin() * 0.5)
        .collect()
}

fn bench_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("per_file_reduction");

    for size in [10_000, 100_000, 1_000_000] {
        let trace = synthetic_trace(size);

        group.bench_with_input(BenchmarkId::new("summarize_plain", size), &trace, |b, t| {
            b.iter(|| summarize(black_box(t), 0.0));
        });

        group.bench_with_input(
            BenchmarkId::new("trimmed_mean_1pct", size),
            &trace,
            |b, t| {
                b.iter(|| trimmed_mean(black_box(t), 0.01));
            },
        );

        group.bench_with_input(BenchmarkId::new("sample_std", size), &trace, |b, t| {
            b.iter(|| sample_std(black_box(t)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reduction);
criterion_main!(benches);
