//! Property-based tests for event store and neighbor model invariants.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use proptest::prelude::*;
use pulsecf::{
    DenseSimilarityMatrix, EventStore, NeighborModel, Ratings, SimilarityMatrix,
    SparseSimilarityMatrix, StoreConfig,
};

/// Events over a small id space so that buckets collide.
fn events_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..8, 0u32..12), 0..60)
}

/// Upper-triangle pairs over `n` entities with non-zero similarities.
fn pairs_strategy(n: u32) -> impl Strategy<Value = Vec<(u32, u32, f32)>> {
    prop::collection::vec(
        (0..n, 0..n, prop_oneof![-1.0f32..-0.01, 0.01f32..1.0]),
        0..40,
    )
}

fn store_of(events: &[(u32, u32)]) -> EventStore {
    let mut store = EventStore::with_config(&StoreConfig::seeded(0));
    store.extend(events.iter().map(|&(u, i)| (u, i, ())));
    store
}

proptest! {
    #[test]
    fn prop_buckets_partition_positions(events in events_strategy()) {
        let store = store_of(&events);
        prop_assert_eq!(store.by_user().total_positions(), events.len());
        prop_assert_eq!(store.by_item().total_positions(), events.len());

        for user in store.all_users() {
            let positions = store.by_user().get(user);
            prop_assert!(!positions.is_empty());
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(positions.iter().all(|&p| store.users()[p] == user));
        }
    }

    #[test]
    fn prop_random_order_is_permutation(events in events_strategy()) {
        let store = store_of(&events);
        let mut order = store.random_order().to_vec();
        order.sort_unstable();
        prop_assert_eq!(order, (0..events.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_removal_leaves_no_trace(events in events_strategy(), victim in 0u32..8) {
        let mut store = store_of(&events);
        store.by_user();
        let expected = events.iter().filter(|&&(u, _)| u == victim).count();

        prop_assert_eq!(store.remove_user(victim), expected);
        prop_assert_eq!(store.len(), events.len() - expected);
        prop_assert!(store.by_user().get(victim).is_empty());
        prop_assert!(!store.users().contains(&victim));

        let survivors: Vec<(u32, u32)> = events
            .iter()
            .copied()
            .filter(|&(u, _)| u != victim)
            .collect();
        let remaining: Vec<(u32, u32)> = store.iter().map(|(u, i, _)| (u, i)).collect();
        prop_assert_eq!(remaining, survivors);
    }

    #[test]
    fn prop_add_or_update_keeps_pairs_unique(
        updates in prop::collection::vec((0u32..4, 0u32..4, 1u8..=5), 0..40)
    ) {
        let mut ratings = Ratings::new();
        for &(user, item, value) in &updates {
            ratings.add_or_update(user, item, value);
        }

        let distinct: HashSet<(u32, u32)> = updates.iter().map(|&(u, i, _)| (u, i)).collect();
        prop_assert_eq!(ratings.len(), distinct.len());

        for &(user, item) in &distinct {
            let last = updates
                .iter()
                .rev()
                .find(|&&(u, i, _)| u == user && i == item)
                .map(|&(_, _, v)| f64::from(v));
            prop_assert_eq!(ratings.try_get(user, item), last);
        }
    }

    #[test]
    fn prop_neighbors_are_ranked(pairs in pairs_strategy(6), k in 1usize..5) {
        let mut sim = SparseSimilarityMatrix::new(6);
        for &(i, j, value) in &pairs {
            sim.set(i, j, value).unwrap();
        }
        let sim = Arc::new(sim);
        let model = NeighborModel::train(6, k, Arc::clone(&sim)).unwrap();

        for e in 0..6u32 {
            let neighbors = model.neighbors(e);
            let related = sim.related(e);
            prop_assert_eq!(neighbors.len(), related.len().min(k));
            prop_assert!(!neighbors.contains(&e));

            let scores: Vec<f32> = neighbors.iter().map(|&n| sim.similarity(e, n)).collect();
            prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));

            // Nothing left out beats the weakest kept neighbor
            if let Some(&floor) = scores.last() {
                for (other, value) in related {
                    if !neighbors.contains(&other) {
                        prop_assert!(value <= floor);
                    }
                }
            }
        }
    }

    #[test]
    fn prop_save_load_preserves_neighbors(pairs in pairs_strategy(5), k in 1usize..4) {
        let mut sim = SparseSimilarityMatrix::new(5);
        for &(i, j, value) in &pairs {
            sim.set(i, j, value).unwrap();
        }
        let model = NeighborModel::train(5, k, Arc::new(sim)).unwrap();

        let mut buf = Vec::new();
        model.save(&mut buf).unwrap();
        let loaded: NeighborModel<SparseSimilarityMatrix> =
            NeighborModel::load(&mut Cursor::new(buf)).unwrap();

        for e in 0..5u32 {
            prop_assert_eq!(loaded.neighbors(e), model.neighbors(e));
        }
        prop_assert!(loaded.k() <= k);
    }

    #[test]
    fn prop_load_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = NeighborModel::<SparseSimilarityMatrix>::load(&mut Cursor::new(bytes));
    }

    #[test]
    fn prop_dense_load_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = NeighborModel::<DenseSimilarityMatrix>::load(&mut Cursor::new(bytes));
    }

    #[test]
    fn prop_dense_load_rejects_or_fits(header in 0usize..64, tail in "[0-9 .\n-]{0,48}") {
        // A single-entity model in front of an arbitrary dense matrix section
        let text = format!("1\n\n{}\n{}", header, tail);
        if let Ok(model) = NeighborModel::<DenseSimilarityMatrix>::load(&mut Cursor::new(text)) {
            prop_assert_eq!(model.similarity().num_entities(), header);
        }
    }
}
