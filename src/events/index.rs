//! Lazily built secondary indices over an event store.
//!
//! [`IndexCache`] holds three derived views:
//! - positions grouped by user id
//! - positions grouped by item id
//! - a random permutation of all positions
//!
//! Each view lives in its own `OnceLock` cell. A cell is filled on first
//! read and emptied by [`IndexCache::invalidate`], which the owning store
//! calls on every structural mutation. Reads take `&self`, mutations take
//! `&mut self`, so a view can never be observed half-built or stale.
//!
//! # Thread Safety
//!
//! The RNG behind the random view is protected by a `Mutex`, which makes
//! the cache (and the stores embedding it) `Send + Sync`.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::config::StoreConfig;
use crate::types::Position;

/// Positions grouped by an entity id (user or item).
///
/// Every id present has at least one position. Positions within a bucket
/// are in ascending order, which is also insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionIndex {
    buckets: HashMap<u32, Vec<Position>>,
}

impl PositionIndex {
    /// Groups positions by key with one linear scan.
    pub(crate) fn build(keys: &[u32]) -> Self {
        let mut buckets: HashMap<u32, Vec<Position>> = HashMap::new();
        for (position, &key) in keys.iter().enumerate() {
            buckets.entry(key).or_default().push(position);
        }
        Self { buckets }
    }

    /// Returns the positions for `id`, or an empty slice if `id` has no events.
    #[inline]
    pub fn get(&self, id: u32) -> &[Position] {
        self.buckets.get(&id).map_or(&[][..], Vec::as_slice)
    }

    /// Returns true if `id` has at least one event.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.buckets.contains_key(&id)
    }

    /// Number of events for `id`.
    #[inline]
    pub fn bucket_len(&self, id: u32) -> usize {
        self.get(id).len()
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if no id has any events.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// All ids with at least one event, ascending.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.buckets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The largest id with at least one event.
    pub fn max_id(&self) -> Option<u32> {
        self.buckets.keys().copied().max()
    }

    /// Sum of all bucket sizes (equals the store's event count).
    pub fn total_positions(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Iterates `(id, positions)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Position])> + '_ {
        self.buckets.iter().map(|(&id, positions)| (id, positions.as_slice()))
    }
}

/// Lazily rebuilt by-user, by-item and random-order views.
#[derive(Debug)]
pub struct IndexCache {
    by_user: OnceLock<PositionIndex>,
    by_item: OnceLock<PositionIndex>,
    random: OnceLock<Vec<Position>>,

    /// Source of permutations. Each rebuild of the random view advances it,
    /// so a rebuilt permutation is fresh but reproducible for a fixed seed.
    rng: Mutex<StdRng>,

    /// Bumped on every invalidation.
    generation: u64,
}

impl IndexCache {
    /// Creates an empty cache drawing permutations from `rng`.
    pub fn new(rng: StdRng) -> Self {
        Self {
            by_user: OnceLock::new(),
            by_item: OnceLock::new(),
            random: OnceLock::new(),
            rng: Mutex::new(rng),
            generation: 0,
        }
    }

    /// Creates an empty cache seeded according to `config`.
    pub fn with_config(config: &StoreConfig) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng)
    }

    pub(crate) fn by_user(&self, users: &[u32]) -> &PositionIndex {
        self.by_user
            .get_or_init(|| self.build_grouping("user", users))
    }

    pub(crate) fn by_item(&self, items: &[u32]) -> &PositionIndex {
        self.by_item
            .get_or_init(|| self.build_grouping("item", items))
    }

    pub(crate) fn random_order(&self, len: usize) -> &[Position] {
        self.random.get_or_init(|| {
            let mut order: Vec<Position> = (0..len).collect();
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            order.shuffle(&mut *rng);
            debug!(
                events = len,
                generation = self.generation,
                "Built random index"
            );
            order
        })
    }

    fn build_grouping(&self, kind: &'static str, keys: &[u32]) -> PositionIndex {
        let index = PositionIndex::build(keys);
        debug!(
            kind,
            events = keys.len(),
            ids = index.len(),
            generation = self.generation,
            "Built position index"
        );
        index
    }

    /// Discards all three views. Idempotent.
    pub fn invalidate(&mut self) {
        let had_views = self.is_user_index_built()
            || self.is_item_index_built()
            || self.is_random_index_built();
        self.by_user.take();
        self.by_item.take();
        self.random.take();
        self.generation += 1;
        if had_views {
            debug!(generation = self.generation, "Invalidated index cache");
        }
    }

    /// Discards only the random view.
    ///
    /// The next random-order read draws a new permutation. Grouping views
    /// stay valid because positions did not change.
    pub fn reshuffle(&mut self) {
        self.random.take();
    }

    /// Number of invalidations so far.
    ///
    /// Positions obtained from this cache are only meaningful while the
    /// generation is unchanged.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if the by-user view is currently built.
    pub fn is_user_index_built(&self) -> bool {
        self.by_user.get().is_some()
    }

    /// Returns true if the by-item view is currently built.
    pub fn is_item_index_built(&self) -> bool {
        self.by_item.get().is_some()
    }

    /// Returns true if the random view is currently built.
    pub fn is_random_index_built(&self) -> bool {
        self.random.get().is_some()
    }
}

impl Default for IndexCache {
    fn default() -> Self {
        Self::with_config(&StoreConfig::default())
    }
}

impl Clone for IndexCache {
    /// Clones the RNG state; views are left unbuilt and rebuild lazily.
    fn clone(&self) -> Self {
        let rng = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let mut cache = Self::new(rng);
        cache.generation = self.generation;
        cache
    }
}
