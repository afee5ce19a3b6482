//! Interaction event storage and its derived indices.
//!
//! An **event** is one observed `(user, item)` interaction, optionally
//! carrying a payload such as a rating. Events live in an [`EventStore`]
//! as parallel columns addressed by position.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │           DataSet trait          │
//! └──────────┬───────────────────────┘
//!            │
//!    ┌───────┴────────┐      ┌──────────────┐
//!    │ EventStore<V>  │◄─────│   Ratings    │  (embeds EventStore<f64>)
//!    └───────┬────────┘      └──────────────┘
//!            │ owns
//!    ┌───────┴────────┐
//!    │   IndexCache   │  by_user / by_item / random_order
//!    └────────────────┘
//! ```
//!
//! The columns are the **source of truth**. Indices are derived and
//! rebuilt lazily after any append or removal.

mod index;
mod store;

pub use index::{IndexCache, PositionIndex};
pub use store::EventStore;

use crate::types::{ItemId, Position, UserId};

/// Base capability shared by every interaction dataset.
///
/// Implemented by [`EventStore`] and [`Ratings`](crate::Ratings), so
/// algorithms that only need orderings and membership can be generic
/// over either tier.
pub trait DataSet {
    /// Per-event payload type.
    type Value;

    /// The underlying event columns.
    fn events(&self) -> &EventStore<Self::Value>;

    /// Removes all events of `user`, returning how many were removed.
    fn remove_user(&mut self, user: UserId) -> usize;

    /// Removes all events of `item`, returning how many were removed.
    fn remove_item(&mut self, item: ItemId) -> usize;

    /// Number of events.
    fn len(&self) -> usize {
        self.events().len()
    }

    /// Returns true if there are no events.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// User id of every event, by position.
    fn users(&self) -> &[UserId] {
        self.events().users()
    }

    /// Item id of every event, by position.
    fn items(&self) -> &[ItemId] {
        self.events().items()
    }

    /// Positions grouped by user id.
    fn by_user(&self) -> &PositionIndex {
        self.events().by_user()
    }

    /// Positions grouped by item id.
    fn by_item(&self) -> &PositionIndex {
        self.events().by_item()
    }

    /// All positions in a random order.
    fn random_order(&self) -> &[Position] {
        self.events().random_order()
    }

    /// User ids with at least one event, ascending.
    fn all_users(&self) -> Vec<UserId> {
        self.events().all_users()
    }

    /// Item ids with at least one event, ascending.
    fn all_items(&self) -> Vec<ItemId> {
        self.events().all_items()
    }

    /// Largest user id present.
    fn max_user_id(&self) -> Option<UserId> {
        self.events().max_user_id()
    }

    /// Largest item id present.
    fn max_item_id(&self) -> Option<ItemId> {
        self.events().max_item_id()
    }
}

impl<V> DataSet for EventStore<V> {
    type Value = V;

    fn events(&self) -> &EventStore<V> {
        self
    }

    fn remove_user(&mut self, user: UserId) -> usize {
        EventStore::remove_user(self, user)
    }

    fn remove_item(&mut self, item: ItemId) -> usize {
        EventStore::remove_item(self, item)
    }
}
