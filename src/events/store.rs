//! Column-oriented storage of interaction events.

use std::mem;

use rand::rngs::StdRng;

use crate::config::StoreConfig;
use crate::error::{PulseCFError, Result};
use crate::types::{ItemId, Position, UserId};

use super::index::{IndexCache, PositionIndex};

/// Interaction events stored as parallel columns.
///
/// Each event has a user id, an item id and a payload value of type `V`.
/// `EventStore<()>` models implicit feedback (an event either exists or
/// not); `EventStore<f64>` backs [`Ratings`](crate::Ratings).
///
/// The by-user, by-item and random-order views are derived lazily and
/// dropped whenever the set of positions changes (append or removal).
/// Payload updates leave them intact.
///
/// # Example
/// ```rust
/// use pulsecf::EventStore;
///
/// let mut events: EventStore = EventStore::new();
/// events.push(0, 10);
/// events.push(1, 10);
/// events.push(0, 11);
///
/// assert_eq!(events.by_user().get(0), &[0, 2]);
/// assert_eq!(events.by_item().get(10), &[0, 1]);
///
/// events.remove_user(0);
/// assert_eq!(events.len(), 1);
/// assert!(!events.by_user().contains(0));
/// ```
#[derive(Clone, Debug)]
pub struct EventStore<V = ()> {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    values: Vec<V>,
    cache: IndexCache,
}

impl<V> Default for EventStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> EventStore<V> {
    /// Creates an empty store with an entropy-seeded random index.
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    /// Creates an empty store configured by `config`.
    pub fn with_config(config: &StoreConfig) -> Self {
        let capacity = config.initial_capacity;
        Self {
            users: Vec::with_capacity(capacity),
            items: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            cache: IndexCache::with_config(config),
        }
    }

    /// Creates an empty store whose random index draws from `rng`.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            users: Vec::new(),
            items: Vec::new(),
            values: Vec::new(),
            cache: IndexCache::new(rng),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Appends an event and returns its position.
    pub fn append(&mut self, user: UserId, item: ItemId, value: V) -> Position {
        let position = self.users.len();
        self.users.push(user);
        self.items.push(item);
        self.values.push(value);
        self.cache.invalidate();
        position
    }

    /// Replaces the payload at `position`, returning the previous value.
    ///
    /// User and item stay the same, so indices are not touched.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `position >= len()`.
    pub fn update(&mut self, position: Position, value: V) -> Result<V> {
        let len = self.len();
        let slot = self
            .values
            .get_mut(position)
            .ok_or_else(|| PulseCFError::out_of_range(position, len))?;
        Ok(mem::replace(slot, value))
    }

    /// Mutable payload slot at `position`, if in range.
    ///
    /// Payload writes are not structural, so the index views stay valid.
    pub(crate) fn value_mut(&mut self, position: Position) -> Option<&mut V> {
        self.values.get_mut(position)
    }

    /// Removes every event whose `(user, item)` matches `predicate`.
    ///
    /// Survivors keep their relative order but are renumbered. Returns the
    /// number of removed events; the indices are invalidated only if that
    /// number is non-zero.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(UserId, ItemId) -> bool,
    {
        let keep: Vec<bool> = self
            .users
            .iter()
            .zip(&self.items)
            .map(|(&user, &item)| !predicate(user, item))
            .collect();
        let removed = keep.iter().filter(|&&k| !k).count();
        if removed == 0 {
            return 0;
        }

        retain_by_mask(&mut self.users, &keep);
        retain_by_mask(&mut self.items, &keep);
        retain_by_mask(&mut self.values, &keep);
        self.cache.invalidate();
        removed
    }

    /// Removes all events of `user`.
    pub fn remove_user(&mut self, user: UserId) -> usize {
        self.remove_where(|u, _| u == user)
    }

    /// Removes all events of `item`.
    pub fn remove_item(&mut self, item: ItemId) -> usize {
        self.remove_where(|_, i| i == item)
    }

    /// Drops all derived views. Normally called internally.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Draws a new random order on next access, keeping the grouping views.
    pub fn reshuffle(&mut self) {
        self.cache.reshuffle();
    }

    // =========================================================================
    // Positional access
    // =========================================================================

    /// Number of events.
    #[inline]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if the store holds no events.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// User id of every event, by position.
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Item id of every event, by position.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Payload of every event, by position.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// User id at `position`.
    pub fn user(&self, position: Position) -> Result<UserId> {
        self.check_position(position)?;
        Ok(self.users[position])
    }

    /// Item id at `position`.
    pub fn item(&self, position: Position) -> Result<ItemId> {
        self.check_position(position)?;
        Ok(self.items[position])
    }

    /// Payload at `position`.
    pub fn value(&self, position: Position) -> Result<&V> {
        self.values
            .get(position)
            .ok_or_else(|| PulseCFError::out_of_range(position, self.len()))
    }

    /// Iterates `(user, item, value)` in position order.
    pub fn iter(&self) -> impl Iterator<Item = (UserId, ItemId, &V)> + '_ {
        self.users
            .iter()
            .zip(&self.items)
            .zip(&self.values)
            .map(|((&user, &item), value)| (user, item, value))
    }

    pub(crate) fn check_position(&self, position: Position) -> Result<()> {
        if position < self.len() {
            Ok(())
        } else {
            Err(PulseCFError::out_of_range(position, self.len()))
        }
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Positions grouped by user id.
    pub fn by_user(&self) -> &PositionIndex {
        self.cache.by_user(&self.users)
    }

    /// Positions grouped by item id.
    pub fn by_item(&self) -> &PositionIndex {
        self.cache.by_item(&self.items)
    }

    /// All positions in a random order.
    ///
    /// Stable until the next structural mutation or [`reshuffle`](Self::reshuffle).
    pub fn random_order(&self) -> &[Position] {
        self.cache.random_order(self.len())
    }

    /// User ids with at least one event, ascending.
    pub fn all_users(&self) -> Vec<UserId> {
        self.by_user().ids()
    }

    /// Item ids with at least one event, ascending.
    pub fn all_items(&self) -> Vec<ItemId> {
        self.by_item().ids()
    }

    /// Largest user id present, `None` when empty.
    pub fn max_user_id(&self) -> Option<UserId> {
        self.by_user().max_id()
    }

    /// Largest item id present, `None` when empty.
    pub fn max_item_id(&self) -> Option<ItemId> {
        self.by_item().max_id()
    }

    /// Size of the valid user id range (`max_user_id + 1`, 0 when empty).
    pub fn user_id_bound(&self) -> usize {
        self.max_user_id().map_or(0, |id| id as usize + 1)
    }

    /// Size of the valid item id range (`max_item_id + 1`, 0 when empty).
    pub fn item_id_bound(&self) -> usize {
        self.max_item_id().map_or(0, |id| id as usize + 1)
    }

    /// The cache holding the derived views.
    pub fn cache(&self) -> &IndexCache {
        &self.cache
    }
}

impl EventStore<()> {
    /// Appends an implicit-feedback event.
    pub fn push(&mut self, user: UserId, item: ItemId) -> Position {
        self.append(user, item, ())
    }
}

impl<V> Extend<(UserId, ItemId, V)> for EventStore<V> {
    fn extend<I: IntoIterator<Item = (UserId, ItemId, V)>>(&mut self, iter: I) {
        let before = self.len();
        for (user, item, value) in iter {
            self.users.push(user);
            self.items.push(item);
            self.values.push(value);
        }
        if self.len() != before {
            self.cache.invalidate();
        }
    }
}

impl<V> FromIterator<(UserId, ItemId, V)> for EventStore<V> {
    fn from_iter<I: IntoIterator<Item = (UserId, ItemId, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

/// Keeps `column[p]` iff `keep[p]`. `Vec::retain` visits in order, once each.
fn retain_by_mask<T>(column: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter().copied();
    column.retain(|_| flags.next().unwrap_or(false));
}
