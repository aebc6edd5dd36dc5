//! Structural Analysis Benchmarks
//!
//! Measures how long it takes to compute sparse sigma matrices for the demonstration
//! systems and for systems given as expression strings.
//!
//! ## Benchmark Structure
//!
//! ### 1. Models (`benchmark_models`)
//! - **Molecular diffusion**: tridiagonal structure, cost linear in the system size
//! - **Arc length**: dense structure, cost quadratic in the system size
//!
//! ### 2. Expression systems (`benchmark_expression_system`)
//! Compares parsing a system of residual strings with computing its structure once the
//! system is built.
//!
//! ## Usage
//!
//! Run with: `cargo bench --bench structure`

use std::{collections::HashMap, hint::black_box};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sparse_sigma::prelude::*;

fn benchmark_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("Models");
    group.sample_size(20);

    for n in [1_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("Diffusion", n), &n, |b, &n| {
            let mut matrix = SigmaMatrix::new(Model::Diffusion.system_size(n));
            b.iter(|| {
                let summary = matrix.compute_structure(&Model::Diffusion, &n).unwrap();
                black_box(summary)
            })
        });
    }

    for n in [10, 100] {
        group.bench_with_input(BenchmarkId::new("ArcLength", n), &n, |b, &n| {
            let mut matrix = SigmaMatrix::new(Model::ArcLength.system_size(n));
            b.iter(|| {
                let summary = matrix.compute_structure(&Model::ArcLength, &n).unwrap();
                black_box(summary)
            })
        });
    }

    group.finish();
}

fn diffusion_equations(n: usize) -> Vec<String> {
    let mut equations = vec!["-h2 * diff(u0, 1) + D * (u1 - 2 * u0 + ub)".to_string()];
    for i in 1..n {
        equations.push(format!(
            "-h2 * diff(u{i}, 1) + D * (u{} - 2 * u{i} + u{})",
            i + 1,
            i - 1
        ));
    }
    equations.push(format!("u{n} - u{}", n - 2));
    equations
}

fn benchmark_expression_system(c: &mut Criterion) {
    let mut group = c.benchmark_group("ExpressionSystem");
    let n = 100;
    let equations = diffusion_equations(n);
    let var_map: HashMap<String, usize> = (0..=n).map(|i| (format!("u{i}"), i)).collect();
    let constants = HashMap::from([
        ("h2".to_string(), 1.0),
        ("D".to_string(), 0.96),
        ("ub".to_string(), 0.1),
    ]);

    group.bench_function("Build", |b| {
        b.iter(|| {
            let system = ExpressionSystem::from_var_map_with_constants(
                equations.clone(),
                &var_map,
                &constants,
            );
            black_box(system)
        })
    });

    let system =
        ExpressionSystem::from_var_map_with_constants(equations.clone(), &var_map, &constants)
            .unwrap();
    group.bench_function("Structure", |b| {
        let mut matrix = SigmaMatrix::new(system.size());
        b.iter(|| black_box(matrix.compute_structure(&system, &()).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, benchmark_models, benchmark_expression_system);
criterion_main!(benches);
