//! Rating-valued interaction data.
//!
//! [`Ratings`] embeds an `EventStore<f64>` and adds:
//! - aggregates (min, max, average, per-user and per-item counts)
//! - lookup of a value or position by `(user, item)` pair, optionally
//!   restricted to a subset of positions
//!
//! # Lookup families
//!
//! | must exist (`NotFound` on miss) | may be absent (`None` on miss) |
//! |---------------------------------|--------------------------------|
//! | [`get`](Ratings::get)           | [`try_get`](Ratings::try_get)  |
//! | [`get_in`](Ratings::get_in)     | [`try_get_in`](Ratings::try_get_in) |
//! | [`index_of`](Ratings::index_of) | [`try_index_of`](Ratings::try_index_of) |
//! | [`index_of_in`](Ratings::index_of_in) | [`try_index_of_in`](Ratings::try_index_of_in) |
//!
//! A dataset may contain the same `(user, item)` pair more than once. All
//! lookups resolve to the match with the lowest position.

pub mod types;

pub use types::RatingStats;

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use rand::rngs::StdRng;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{NotFoundError, Result};
use crate::events::{DataSet, EventStore};
use crate::types::{ItemId, Position, UserId};

/// A collection of `(user, item, rating)` events.
///
/// # Example
/// ```rust
/// use pulsecf::Ratings;
///
/// let mut ratings = Ratings::new();
/// ratings.add(0, 0, 3.0);
/// ratings.add(0, 1, 4u8);
/// ratings.add(1, 0, 2.0f32);
///
/// assert_eq!(ratings.average(), Some(3.0));
/// assert_eq!(ratings.get(0, 1).unwrap(), 4.0);
/// assert_eq!(ratings.try_get(1, 1), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Ratings {
    events: EventStore<f64>,

    /// Aggregates over `events.values()`. Emptied by any mutation that can
    /// shrink the range; appends fold into it in place.
    stats: OnceLock<RatingStats>,
}

impl Ratings {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection configured by `config`.
    pub fn with_config(config: &StoreConfig) -> Self {
        Self::from_events(EventStore::with_config(config))
    }

    /// Creates an empty collection whose random index draws from `rng`.
    pub fn with_rng(rng: StdRng) -> Self {
        Self::from_events(EventStore::with_rng(rng))
    }

    /// Wraps an existing event store.
    pub fn from_events(events: EventStore<f64>) -> Self {
        Self {
            events,
            stats: OnceLock::new(),
        }
    }

    /// Unwraps into the underlying event store.
    pub fn into_events(self) -> EventStore<f64> {
        self.events
    }

    /// Number of ratings.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if there are no ratings.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Adds a rating and returns its position.
    ///
    /// Any numeric type convertible to `f64` is accepted (`u8`, `i32`,
    /// `f32`, ...).
    pub fn add(&mut self, user: UserId, item: ItemId, value: impl Into<f64>) -> Position {
        let value = value.into();
        let position = self.events.append(user, item, value);
        if let Some(stats) = self.stats.get_mut() {
            stats.record(value);
        }
        position
    }

    /// Overwrites the rating for `(user, item)` if one exists, else adds it.
    ///
    /// An overwrite is not a structural change: positions and indices are
    /// kept. Returns the position holding the value.
    pub fn add_or_update(
        &mut self,
        user: UserId,
        item: ItemId,
        value: impl Into<f64>,
    ) -> Position {
        let value = value.into();
        if let Some(position) = self.try_index_of(user, item) {
            if let Some(slot) = self.events.value_mut(position) {
                *slot = value;
                self.stats.take();
                return position;
            }
        }
        self.add(user, item, value)
    }

    /// Replaces the rating at `position`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `position >= len()`; nothing changes.
    pub fn set(&mut self, position: Position, value: impl Into<f64>) -> Result<f64> {
        let previous = self.events.update(position, value.into())?;
        self.stats.take();
        Ok(previous)
    }

    /// Removes all ratings matching `predicate`, returning how many were removed.
    pub fn remove_where<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(UserId, ItemId) -> bool,
    {
        let removed = self.events.remove_where(predicate);
        if removed > 0 {
            self.stats.take();
        }
        removed
    }

    /// Removes all ratings by `user`.
    pub fn remove_user(&mut self, user: UserId) -> usize {
        let removed = self.remove_where(|u, _| u == user);
        debug!(user, removed, "Removed user ratings");
        removed
    }

    /// Removes all ratings of `item`.
    pub fn remove_item(&mut self, item: ItemId) -> usize {
        let removed = self.remove_where(|_, i| i == item);
        debug!(item, removed, "Removed item ratings");
        removed
    }

    /// Draws a new random order on next access.
    pub fn reshuffle(&mut self) {
        self.events.reshuffle();
    }

    // =========================================================================
    // Positional access
    // =========================================================================

    /// Rating at `position`.
    pub fn value(&self, position: Position) -> Result<f64> {
        self.events.value(position).copied()
    }

    /// All rating values, by position.
    pub fn values(&self) -> &[f64] {
        self.events.values()
    }

    // =========================================================================
    // Pair lookup
    // =========================================================================

    /// Position of the first rating for `(user, item)`, if any.
    ///
    /// Scans only the user's bucket of the by-user index.
    pub fn try_index_of(&self, user: UserId, item: ItemId) -> Option<Position> {
        let items = self.events.items();
        self.events
            .by_user()
            .get(user)
            .iter()
            .copied()
            .find(|&p| items[p] == item)
    }

    /// Position of the first rating for `(user, item)` among `positions`.
    ///
    /// The lowest matching position wins, whatever the order of `positions`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `positions` names an invalid position.
    /// A miss is `Ok(None)`.
    pub fn try_index_of_in(
        &self,
        user: UserId,
        item: ItemId,
        positions: &[Position],
    ) -> Result<Option<Position>> {
        let users = self.events.users();
        let items = self.events.items();
        let mut best: Option<Position> = None;
        for &p in positions {
            self.events.check_position(p)?;
            if users[p] == user && items[p] == item && best.map_or(true, |b| p < b) {
                best = Some(p);
            }
        }
        Ok(best)
    }

    /// Position of the first rating for `(user, item)`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such rating.
    pub fn index_of(&self, user: UserId, item: ItemId) -> Result<Position> {
        self.try_index_of(user, item)
            .ok_or_else(|| NotFoundError::rating(user, item).into())
    }

    /// Position of the first rating for `(user, item)` among `positions`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` on a miss, `IndexOutOfRange` for invalid positions.
    pub fn index_of_in(
        &self,
        user: UserId,
        item: ItemId,
        positions: &[Position],
    ) -> Result<Position> {
        self.try_index_of_in(user, item, positions)?
            .ok_or_else(|| NotFoundError::rating(user, item).into())
    }

    /// The first rating for `(user, item)`, if any.
    pub fn try_get(&self, user: UserId, item: ItemId) -> Option<f64> {
        self.try_index_of(user, item)
            .map(|p| self.events.values()[p])
    }

    /// The first rating for `(user, item)` among `positions`, if any.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `positions` names an invalid position.
    pub fn try_get_in(
        &self,
        user: UserId,
        item: ItemId,
        positions: &[Position],
    ) -> Result<Option<f64>> {
        Ok(self
            .try_index_of_in(user, item, positions)?
            .map(|p| self.events.values()[p]))
    }

    /// The first rating for `(user, item)`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such rating.
    pub fn get(&self, user: UserId, item: ItemId) -> Result<f64> {
        self.try_get(user, item)
            .ok_or_else(|| NotFoundError::rating(user, item).into())
    }

    /// The first rating for `(user, item)` among `positions`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` on a miss, `IndexOutOfRange` for invalid positions.
    pub fn get_in(&self, user: UserId, item: ItemId, positions: &[Position]) -> Result<f64> {
        self.try_get_in(user, item, positions)?
            .ok_or_else(|| NotFoundError::rating(user, item).into())
    }

    /// Distinct users referenced by `positions`.
    pub fn users_referenced_by(&self, positions: &[Position]) -> Result<BTreeSet<UserId>> {
        positions.iter().map(|&p| self.events.user(p)).collect()
    }

    /// Distinct items referenced by `positions`.
    pub fn items_referenced_by(&self, positions: &[Position]) -> Result<BTreeSet<ItemId>> {
        positions.iter().map(|&p| self.events.item(p)).collect()
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Count, sum and range of all ratings.
    pub fn stats(&self) -> RatingStats {
        *self
            .stats
            .get_or_init(|| RatingStats::from_values(self.events.values()))
    }

    /// Largest rating, `None` when empty.
    pub fn max_rating(&self) -> Option<f64> {
        self.stats().max
    }

    /// Smallest rating, `None` when empty.
    pub fn min_rating(&self) -> Option<f64> {
        self.stats().min
    }

    /// Mean rating, `None` when empty.
    pub fn average(&self) -> Option<f64> {
        self.stats().average()
    }

    /// Number of ratings per user (users without ratings are absent).
    pub fn count_by_user(&self) -> HashMap<UserId, usize> {
        self.events
            .by_user()
            .iter()
            .map(|(user, positions)| (user, positions.len()))
            .collect()
    }

    /// Number of ratings per item (items without ratings are absent).
    pub fn count_by_item(&self) -> HashMap<ItemId, usize> {
        self.events
            .by_item()
            .iter()
            .map(|(item, positions)| (item, positions.len()))
            .collect()
    }
}

impl DataSet for Ratings {
    type Value = f64;

    fn events(&self) -> &EventStore<f64> {
        &self.events
    }

    fn remove_user(&mut self, user: UserId) -> usize {
        Ratings::remove_user(self, user)
    }

    fn remove_item(&mut self, item: ItemId) -> usize {
        Ratings::remove_item(self, item)
    }
}

impl Extend<(UserId, ItemId, f64)> for Ratings {
    fn extend<I: IntoIterator<Item = (UserId, ItemId, f64)>>(&mut self, iter: I) {
        self.events.extend(iter);
        self.stats.take();
    }
}

impl FromIterator<(UserId, ItemId, f64)> for Ratings {
    fn from_iter<I: IntoIterator<Item = (UserId, ItemId, f64)>>(iter: I) -> Self {
        Self::from_events(iter.into_iter().collect())
    }
}

impl From<EventStore<f64>> for Ratings {
    fn from(events: EventStore<f64>) -> Self {
        Self::from_events(events)
    }
}
