//! Benchmark for world graph generation.
//!
//! The world is generated once at process start, so the budget is
//! generous — but regressions here show up as slow server boots.
//!
//! Run with: cargo bench --package blackice_procedural --bench worldgen_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use blackice_procedural::{WorldGenerator, WorldSeed};

fn benchmark_full_world(c: &mut Criterion) {
    c.bench_function("generate_full_world", |b| {
        let mut seed = 0_u64;
        b.iter(|| {
            seed += 1;
            let generator = WorldGenerator::new(WorldSeed::new(black_box(seed)));
            black_box(generator.generate())
        });
    });
}

fn benchmark_fixed_seed(c: &mut Criterion) {
    c.bench_function("generate_seed_42", |b| {
        let generator = WorldGenerator::new(WorldSeed::new(42));
        b.iter(|| black_box(generator.generate()));
    });
}

criterion_group!(benches, benchmark_full_world, benchmark_fixed_seed);
criterion_main!(benches);
