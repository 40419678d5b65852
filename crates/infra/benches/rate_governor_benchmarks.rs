use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::time::{Duration, Instant};

use medthing_infra::{RateGovernor, RateLimitConfig};

fn governor(max: u32) -> RateGovernor {
    RateGovernor::new(RateLimitConfig {
        max,
        window: Duration::from_secs(60),
        sweep_interval: Duration::from_secs(60),
    })
}

fn bench_admit_single_key(c: &mut Criterion) {
    let g = governor(u32::MAX);
    let now = Instant::now();
    c.bench_function("admit/single_key", |b| {
        b.iter(|| black_box(g.admit_at(black_box("10.0.0.1:5000"), now)))
    });
}

fn bench_admit_many_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("admit/many_keys");
    for keys in [100usize, 10_000] {
        let g = governor(20);
        let now = Instant::now();
        let names: Vec<String> = (0..keys).map(|i| format!("10.0.{}.{}:443", i / 256, i % 256)).collect();
        group.throughput(Throughput::Elements(keys as u64));
        group.bench_with_input(BenchmarkId::from_parameter(keys), &names, |b, names| {
            b.iter(|| {
                for name in names {
                    black_box(g.admit_at(name, now));
                }
            })
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    for keys in [1_000usize, 50_000] {
        group.bench_with_input(BenchmarkId::from_parameter(keys), &keys, |b, &keys| {
            b.iter_batched(
                || {
                    let g = governor(20);
                    let t0 = Instant::now();
                    for i in 0..keys {
                        g.admit_at(&format!("client-{i}"), t0);
                    }
                    (g, t0 + Duration::from_secs(61))
                },
                |(g, later)| black_box(g.sweep_at(later)),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_admit_single_key, bench_admit_many_keys, bench_sweep);
criterion_main!(benches);
