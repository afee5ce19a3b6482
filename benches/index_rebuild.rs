//! Benchmarks for index rebuilds and neighbor model training.
//!
//! Run with: `cargo bench`
//!
//! Performance targets:
//! - by-user rebuild over 1M events < 50ms
//! - random-order rebuild over 1M events < 50ms
//! - KNN training over 2K entities (sparse, ~50 relations each) < 100ms

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pulsecf::{EventStore, NeighborModel, SparseSimilarityMatrix, StoreConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a store of `n` events over 10K users and 5K items.
fn synthetic_store(n: usize) -> EventStore {
    let mut rng = StdRng::seed_from_u64(42);
    let config = StoreConfig {
        random_seed: Some(7),
        initial_capacity: n,
    };
    let mut store = EventStore::with_config(&config);
    store.extend((0..n).map(|_| (rng.gen_range(0..10_000), rng.gen_range(0..5_000), ())));
    store
}

/// Builds a sparse matrix with `per_entity` random relations per entity.
fn synthetic_similarity(entities: u32, per_entity: usize) -> SparseSimilarityMatrix {
    let mut rng = StdRng::seed_from_u64(9);
    let mut sim = SparseSimilarityMatrix::new(entities as usize);
    for i in 0..entities {
        for _ in 0..per_entity / 2 {
            let j = rng.gen_range(0..entities);
            if j != i {
                // Range is inside [0, entities), set cannot fail
                let _ = sim.set(i, j, rng.gen_range(0.01f32..1.0));
            }
        }
    }
    sim
}

/// Benchmark rebuilding the grouping indices after invalidation.
fn bench_grouping_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouping_rebuild");
    for &n in &[10_000usize, 100_000, 1_000_000] {
        let mut store = synthetic_store(n);
        group.bench_with_input(BenchmarkId::new("by_user", n), &n, |b, _| {
            b.iter(|| {
                store.invalidate();
                black_box(store.by_user().len());
            });
        });
        group.bench_with_input(BenchmarkId::new("by_item", n), &n, |b, _| {
            b.iter(|| {
                store.invalidate();
                black_box(store.by_item().len());
            });
        });
    }
    group.finish();
}

/// Benchmark drawing a fresh random permutation.
fn bench_random_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_rebuild");
    for &n in &[10_000usize, 1_000_000] {
        let mut store = synthetic_store(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                store.reshuffle();
                black_box(store.random_order().len());
            });
        });
    }
    group.finish();
}

/// Benchmark the cached path: repeated reads must not rebuild.
fn bench_cached_lookup(c: &mut Criterion) {
    let store = synthetic_store(100_000);
    store.by_user();
    c.bench_function("cached_by_user_lookup", |b| {
        let mut user = 0u32;
        b.iter(|| {
            user = (user + 1) % 10_000;
            black_box(store.by_user().get(user).len());
        });
    });
}

/// Benchmark KNN training with bounded top-k selection.
fn bench_knn_train(c: &mut Criterion) {
    let sim = Arc::new(synthetic_similarity(2_000, 50));
    let mut group = c.benchmark_group("knn_train");
    for &k in &[10usize, 80] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            b.iter(|| {
                let model = NeighborModel::train(2_000, k, Arc::clone(&sim)).unwrap();
                black_box(model.num_entities());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_grouping_rebuild,
    bench_random_rebuild,
    bench_cached_lookup,
    bench_knn_train
);
criterion_main!(benches);
