//! LWPR benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Training throughput by input dimension (1D to 10D)
//! - Metric adaptation modes (fixed, diagonal, full, meta learning)
//! - Kernels (gaussian, bisquare)
//! - Output count
//! - Prediction, confidence and Jacobian queries on a trained model
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lwpr_rs::prelude::*;
use rand::prelude::*;
use rand_distr::{Normal, Uniform};
use std::f64::consts::PI;
use std::hint::black_box;

// ============================================================================
// Data Generation with Reproducible RNG
// ============================================================================

/// Samples of `sin(2π x₀) + Σ xᵢ² / dim` on the unit cube, with Gaussian noise.
fn generate_data(size: usize, dim: usize, seed: u64) -> Vec<(Vec<f64>, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let input = Uniform::new(0.0, 1.0).unwrap();
    let noise = Normal::new(0.0, 0.05).unwrap();

    (0..size)
        .map(|_| {
            let x: Vec<f64> = (0..dim).map(|_| input.sample(&mut rng)).collect();
            let quad = x.iter().map(|v| v * v).sum::<f64>() / dim as f64;
            let y = (2.0 * PI * x[0]).sin() + quad + noise.sample(&mut rng);
            (x, y)
        })
        .collect()
}

fn train(model: &mut LwprModel<f64>, data: &[(Vec<f64>, f64)]) {
    for (x, y) in data {
        model.update(black_box(x), black_box(&[*y])).unwrap();
    }
}

// ============================================================================
// Benchmark Functions
// ============================================================================

fn bench_dimension(c: &mut Criterion) {
    let mut group = c.benchmark_group("dimension");
    group.sample_size(20);

    let size = 2000;
    group.throughput(Throughput::Elements(size as u64));
    for dim in [1, 2, 5, 10] {
        let data = generate_data(size, dim, 42);
        group.bench_with_input(BenchmarkId::new("update", dim), &dim, |b, &dim| {
            b.iter(|| {
                let mut model = Lwpr::new(dim, 1).init_d_spherical(9.0).build().unwrap();
                train(&mut model, &data);
                model
            })
        });
    }
    group.finish();
}

fn bench_metric_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("metric");
    group.sample_size(20);

    let size = 2000;
    let data = generate_data(size, 3, 42);
    group.throughput(Throughput::Elements(size as u64));

    let modes: [(&str, bool, bool, bool); 4] = [
        ("fixed", false, true, false),
        ("diagonal", true, true, false),
        ("full", true, false, false),
        ("meta", true, false, true),
    ];
    for (name, update_d, diag_only, use_meta) in modes {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut model = Lwpr::new(3, 1)
                    .init_d_spherical(9.0)
                    .update_d(update_d)
                    .diag_only(diag_only)
                    .use_meta(use_meta)
                    .build()
                    .unwrap();
                train(&mut model, &data);
                model
            })
        });
    }
    group.finish();
}

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel");
    group.sample_size(20);

    let data = generate_data(2000, 2, 42);
    for kernel in [Gaussian, BiSquare] {
        group.bench_with_input(BenchmarkId::new("update", kernel), &kernel, |b, &kernel| {
            b.iter(|| {
                let mut model = Lwpr::new(2, 1).kernel(kernel).build().unwrap();
                train(&mut model, &data);
                model
            })
        });
    }
    group.finish();
}

fn bench_outputs(c: &mut Criterion) {
    let mut group = c.benchmark_group("outputs");
    group.sample_size(20);

    let data = generate_data(1000, 2, 42);
    for n_out in [1, 4, 8] {
        group.bench_with_input(BenchmarkId::new("update", n_out), &n_out, |b, &n_out| {
            b.iter(|| {
                let mut model = Lwpr::new(2, n_out).build().unwrap();
                for (x, y) in &data {
                    let ys: Vec<f64> = (0..n_out).map(|k| y * (k + 1) as f64).collect();
                    model.update(black_box(x), black_box(&ys)).unwrap();
                }
                model
            })
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    group.sample_size(100);

    let data = generate_data(5000, 4, 42);
    let mut model = Lwpr::new(4, 1).init_d_spherical(9.0).build().unwrap();
    train(&mut model, &data);
    let queries = generate_data(500, 4, 7);
    group.throughput(Throughput::Elements(queries.len() as u64));

    group.bench_function("predict", |b| {
        b.iter(|| {
            for (x, _) in &queries {
                black_box(model.predict(black_box(x), 0.001).unwrap());
            }
        })
    });
    group.bench_function("confidence", |b| {
        b.iter(|| {
            for (x, _) in &queries {
                black_box(model.predict_with_confidence(black_box(x), 0.001).unwrap());
            }
        })
    });
    group.bench_function("jacobian", |b| {
        b.iter(|| {
            for (x, _) in &queries {
                black_box(model.predict_jacobian(black_box(x), 0.001).unwrap());
            }
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_dimension,
    bench_metric_modes,
    bench_kernels,
    bench_outputs,
    bench_queries,
);
criterion_main!(benches);
