//! Benchmarks for smoothing, peak finding and epoch assignment.

use changepoint_epochs::core::PostRecord;
use changepoint_epochs::detection::{find_peaks, Bound, PeakPolicy};
use changepoint_epochs::epochs::assign_epochs;
use changepoint_epochs::transform::rolling_prob_or;
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_bumps(n: usize, period: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * i as f64 / period as f64;
            0.5 * (1.0 + phase.sin()) * (0.8 + 0.2 * (i as f64 * 0.37).cos())
        })
        .collect()
}

fn bench_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_prob_or");

    for size in [52, 260, 1040, 4160].iter() {
        let signal = generate_bumps(*size, 13);
        for window in [1, 4, 12] {
            group.bench_with_input(
                BenchmarkId::new(format!("window_{window}"), size),
                size,
                |b, _| b.iter(|| rolling_prob_or(black_box(&signal), window)),
            );
        }
    }

    group.finish();
}

fn bench_find_peaks(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_peaks");

    for size in [52, 260, 1040, 4160].iter() {
        let signal = generate_bumps(*size, 13);

        group.bench_with_input(BenchmarkId::new("height", size), size, |b, _| {
            let policy = PeakPolicy::default().min_height(0.5);
            b.iter(|| find_peaks(black_box(&signal), &policy))
        });

        group.bench_with_input(BenchmarkId::new("distance", size), size, |b, _| {
            let policy = PeakPolicy::default().min_height(0.5).distance(8.0);
            b.iter(|| find_peaks(black_box(&signal), &policy))
        });

        group.bench_with_input(BenchmarkId::new("prominence_width", size), size, |b, _| {
            let policy = PeakPolicy::default()
                .prominence(Bound::at_least(0.1))
                .width(Bound::at_least(1.0));
            b.iter(|| find_peaks(black_box(&signal), &policy))
        });
    }

    group.finish();
}

fn bench_assign_epochs(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_epochs");
    let origin = NaiveDate::from_ymd_opt(2020, 1, 6)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let changepoints: Vec<_> = (1..8).map(|k| origin + Duration::weeks(13 * k)).collect();

    for size in [1_000, 10_000, 100_000].iter() {
        let records: Vec<PostRecord> = (0..*size)
            .map(|i| {
                PostRecord::new(
                    format!("p{i}"),
                    "pl",
                    format!("account-{}", i % 50),
                    origin + Duration::minutes(i as i64 * 7),
                )
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("records", size), size, |b, _| {
            b.iter(|| assign_epochs(black_box(&records), &changepoints, 5))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_smoothing, bench_find_peaks, bench_assign_epochs);
criterion_main!(benches);
