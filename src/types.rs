//! Core type definitions for pulsecf identifiers.
//!
//! User, item and entity ids are dense 0-based integers assigned by the
//! dataset loader's id mapper. Positions index the parallel attribute
//! vectors of an [`EventStore`](crate::EventStore).

/// User identifier (dense, 0-based).
pub type UserId = u32;

/// Item identifier (dense, 0-based).
pub type ItemId = u32;

/// Identifier of an entity in a similarity matrix or neighbor model.
///
/// Entities are users for user-based KNN and items for item-based KNN.
pub type EntityId = u32;

/// 0-based row identifier into an event store.
///
/// Positions are only stable until the next removal, which compacts the
/// store and renumbers surviving events.
pub type Position = usize;
