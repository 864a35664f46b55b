//! Assignment benchmarks
//!
//! Assignment sits on the visitor-facing path, so it must stay a cheap,
//! allocation-free hash walk regardless of variant count.
//!
//! Toyota Way: Genchi Genbutsu (measure, don't guess)
//!
//! Run with: cargo bench --bench assignment

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_ab::assignment::{assign, visitor_hash};
use trueno_ab::experiment::Experiment;

fn experiment_with(variants: usize) -> Experiment {
    let mut builder = Experiment::builder("bench");
    for i in 0..variants {
        builder = builder.variant(format!("v{i}"), 1.0);
    }
    builder.control("v0").build().expect("valid bench experiment")
}

/// Benchmark visitor hashing alone
fn bench_visitor_hash(c: &mut Criterion) {
    let visitor = "3f2c9a71-5e0b-4c8e-a1d4-7b6e2f90c1aa";
    c.bench_function("visitor_hash", |b| {
        b.iter(|| visitor_hash(black_box(visitor)));
    });
}

/// Benchmark full assignment as variant count grows
fn bench_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign");
    let visitors: Vec<String> = (0..1_000).map(|i| format!("visitor-{i}")).collect();

    for variants in [2, 5, 20] {
        let experiment = experiment_with(variants);
        group.bench_with_input(
            BenchmarkId::new("variants", variants),
            &experiment,
            |b, experiment| {
                b.iter(|| {
                    for visitor in &visitors {
                        black_box(assign(black_box(visitor), experiment));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_visitor_hash, bench_assign);
criterion_main!(benches);
