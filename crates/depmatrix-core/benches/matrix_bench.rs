//! Criterion benchmarks for depmatrix-core.
//!
//! These benchmarks exercise the pure-Rust folding and projection internals on
//! a synthetic inventory, without touching the filesystem.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/depmatrix-core/Cargo.toml
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use _depmatrix_core::matrix::fold::fold_matrix;
use _depmatrix_core::matrix::projection::{project, MatrixOptions};
use _depmatrix_core::models::{ImportEdge, ImportRecord, Matrix, Module};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a four-level inventory of `packages * 10 * 10` modules where every
/// module imports its successor.
fn synthetic_matrix(packages: usize) -> Matrix {
    let mut modules = Vec::new();
    for p in 0..packages {
        for s in 0..10 {
            for m in 0..10 {
                modules.push(Module {
                    name: format!("pkg{p}.sub{s}.inner.mod{m}"),
                    path: None,
                    group_index: p,
                    group_name: String::new(),
                });
            }
        }
    }
    let imports = (1..modules.len())
        .map(|target| {
            let source = target - 1;
            ImportEdge {
                source_name: modules[source].name.clone(),
                source_index: source,
                target_name: modules[target].name.clone(),
                target_index: target,
                imports: vec![ImportRecord {
                    importer: modules[source].name.clone(),
                    target: modules[target].name.clone(),
                    names: vec!["a".to_string(), "b".to_string()],
                }],
                cardinal: 2,
            }
        })
        .collect();
    Matrix::new(modules, imports)
}

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold");
    for packages in [1usize, 10, 50] {
        let matrix = synthetic_matrix(packages);
        group.bench_with_input(BenchmarkId::from_parameter(packages), &matrix, |b, m| {
            b.iter(|| {
                let depth3 = fold_matrix(black_box(m), 3);
                let depth2 = fold_matrix(&depth3, 2);
                fold_matrix(&depth2, 1)
            })
        });
    }
    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let matrix = synthetic_matrix(10);
    let options = MatrixOptions {
        imports: false,
        ..MatrixOptions::default()
    };
    c.bench_function("projection/no_imports", |b| {
        b.iter(|| project(black_box(&matrix), &options))
    });
}

criterion_group!(benches, bench_fold, bench_projection);
criterion_main!(benches);
