//! Benchmarks for mesh construction.
//!
//! Run with: `cargo bench --bench connectivity_bench`
//!
//! Measures face connectivity, full mesh data construction and periodic
//! pairing on uniform meshes of increasing size.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dg_mesh::{
    ConnectivityConfig, ElementShape, MeshData, PeriodicityConfig, ReferenceElement, connect_mesh, uniform_mesh,
};

/// Benchmark face matching alone.
fn bench_connect_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("connect_mesh");

    for n in [8, 16, 32, 64] {
        let (vertices, etov) = uniform_mesh(ElementShape::Tri, &[n, n]).unwrap();
        let face_vertices = ElementShape::Tri.face_vertices();
        let n_vertices = vertices[0].len();

        group.bench_with_input(BenchmarkId::new("tri", 2 * n * n), &etov, |b, etov| {
            b.iter(|| connect_mesh(black_box(etov), black_box(&face_vertices), n_vertices).unwrap())
        });
    }

    group.finish();
}

/// Benchmark full mesh data construction, including node maps and geometry.
fn bench_mesh_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_data");
    let config = ConnectivityConfig::default();

    for order in [1, 3, 5] {
        let rd = ReferenceElement::new(ElementShape::Quad, order);
        let (vertices, etov) = uniform_mesh(ElementShape::Quad, &[16, 16]).unwrap();

        group.bench_with_input(BenchmarkId::new("quad_16x16", order), &order, |b, _| {
            b.iter(|| MeshData::new(&rd, black_box(vertices.clone()), black_box(etov.clone()), &config).unwrap())
        });
    }

    group.finish();
}

/// Benchmark periodic pairing of both axes.
fn bench_make_periodic(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_periodic");
    let rd = ReferenceElement::new(ElementShape::Quad, 3);

    for n in [8, 16, 32] {
        let (vertices, etov) = uniform_mesh(ElementShape::Quad, &[n, n]).unwrap();
        let md = MeshData::new(&rd, vertices, etov, &ConnectivityConfig::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("quad", n * n), &md, |b, md| {
            b.iter(|| {
                md.clone()
                    .make_periodic(black_box(&[true, true]), &PeriodicityConfig::default())
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_connect_mesh, bench_mesh_data, bench_make_periodic);
criterion_main!(benches);
