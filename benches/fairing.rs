//! Benchmarks for fairing and operator assembly.

use criterion::{criterion_group, criterion_main, Criterion};

use burnish::algo::laplace::{mass_matrix, stiffness_matrix, LaplaceOptions};
use burnish::prelude::*;
use nalgebra::Point3;

/// A bumpy (n+1) x (n+1) grid over the unit square.
fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            let x = i as f64 / n as f64;
            let y = j as f64 / n as f64;
            let z = 0.05 * (12.0 * x).sin() * (12.0 * y).cos();
            vertices.push(Point3::new(x, y, z));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

fn bench_operator_assembly(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("stiffness_matrix_50x50", |b| {
        b.iter(|| stiffness_matrix(&mesh, &LaplaceOptions::default()));
    });

    c.bench_function("mass_matrix_50x50", |b| {
        b.iter(|| mass_matrix(&mesh));
    });
}

fn bench_fairing(c: &mut Criterion) {
    c.bench_function("minimize_area_30x30", |b| {
        b.iter(|| {
            let mut mesh = create_grid_mesh(30);
            minimize_area(&mut mesh).unwrap();
            mesh
        });
    });

    c.bench_function("minimize_curvature_30x30", |b| {
        b.iter(|| {
            let mut mesh = create_grid_mesh(30);
            minimize_curvature(&mut mesh).unwrap();
            mesh
        });
    });

    c.bench_function("minimize_area_30x30_sequential", |b| {
        b.iter(|| {
            let mut mesh = create_grid_mesh(30);
            fair_with(&mut mesh, 1, &FairOptions::default().sequential()).unwrap();
            mesh
        });
    });
}

criterion_group!(benches, bench_operator_assembly, bench_fairing);
criterion_main!(benches);
