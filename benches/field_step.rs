//! Benchmarks for the CPU side of a frame: generation, edges, motion.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};

use heartfield::{EdgeList, MotionController, MotionParams, PointField, PointGenerator, PointerSample};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let generator = PointGenerator::default();

    for count in [300usize, 1_000, 5_000] {
        group.bench_with_input(BenchmarkId::new("golden_angle", count), &count, |b, &count| {
            b.iter(|| black_box(generator.generate(count, 2026)))
        });
    }

    group.finish();
}

fn bench_edge_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_build");

    for count in [300usize, 1_000, 2_000] {
        let points = PointGenerator::default().generate(count, 2026).points;
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| black_box(EdgeList::build(points, 0.38)))
        });
    }

    group.finish();
}

fn bench_motion_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("motion_step");

    for count in [300usize, 5_000, 50_000] {
        group.bench_with_input(BenchmarkId::new("idle", count), &count, |b, &count| {
            let mut field = PointField::new(PointGenerator::default(), count, 2026, 0.38);
            let mut motion = MotionController::new(MotionParams::default());
            let mut elapsed = 0.0;
            b.iter(|| {
                elapsed += 1.0 / 60.0;
                motion.step(&mut field, elapsed, PointerSample::default());
            })
        });

        group.bench_with_input(BenchmarkId::new("pointer", count), &count, |b, &count| {
            let mut field = PointField::new(PointGenerator::default(), count, 2026, 0.38);
            let mut motion = MotionController::new(MotionParams::default());
            let pointer = PointerSample {
                ndc: Vec2::new(0.1, 0.3),
                world: Some(Vec3::new(0.2, 0.4, 0.0)),
            };
            let mut elapsed = 0.0;
            b.iter(|| {
                elapsed += 1.0 / 60.0;
                motion.step(&mut field, elapsed, pointer);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_edge_build, bench_motion_step);
criterion_main!(benches);
