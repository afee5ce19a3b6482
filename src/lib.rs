//! # pulsecf
//!
//! In-memory collaborative filtering data layer: interaction stores with
//! lazily rebuilt indices, rating-valued stores, and a k-nearest-neighbor
//! model over a pluggable similarity matrix.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use pulsecf::prelude::*;
//!
//! // Record ratings; indices are built on first use
//! let mut ratings = Ratings::new();
//! ratings.add(0, 10, 4.0);
//! ratings.add(0, 11, 2.5);
//! ratings.add(1, 10, 5.0);
//!
//! assert_eq!(ratings.by_user().get(0), &[0, 1]);
//! assert_eq!(ratings.get(1, 10)?, 5.0);
//!
//! // Neighbors from a similarity matrix computed elsewhere
//! let mut sim = SparseSimilarityMatrix::new(3);
//! sim.set(0, 1, 0.9)?;
//! sim.set(1, 2, 0.5)?;
//! let model = NeighborModel::train(3, 1, Arc::new(sim))?;
//! assert_eq!(model.neighbors(2), &[1]);
//! # Ok::<(), pulsecf::PulseCFError>(())
//! ```
//!
//! ## Key Concepts
//!
//! ### Events
//!
//! An **event** is one `(user, item)` interaction, optionally carrying a
//! payload. Events live in parallel columns addressed by **position**, the
//! index at which the event was appended. Positions are stable until a
//! removal compacts the store.
//!
//! ### Derived Views
//!
//! The by-user, by-item and random-order views are computed on first
//! access and cached. Any mutation that changes positions or the user/item
//! columns drops them; the next read rebuilds.
//!
//! ### Neighbor Models
//!
//! A [`NeighborModel`] keeps the `k` most similar entities per entity. It
//! persists as line-oriented text followed by its similarity matrix.
//!
//! ## Thread Safety
//!
//! Stores are `Send + Sync`. Reads take `&self` and may race to build a
//! view; exactly one build wins. Mutation takes `&mut self`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============================================================================
// Module declarations
// ============================================================================

mod config;
mod error;
mod format;
mod types;

// Domain modules
pub mod events;
pub mod ratings;

/// Similarity matrices consumed by neighbor models.
pub mod similarity;

/// k-nearest-neighbor model training and persistence.
pub mod knn;

// ============================================================================
// Public API re-exports
// ============================================================================

// Configuration
pub use config::{KnnConfig, StoreConfig, DEFAULT_K};

// Error handling
pub use error::{ModelError, NotFoundError, PulseCFError, Result, ValidationError};

// Core types
pub use types::{EntityId, ItemId, Position, UserId};

// Event stores
pub use events::{DataSet, EventStore, IndexCache, PositionIndex};
pub use ratings::{RatingStats, Ratings};

// Similarity and neighbors
pub use knn::NeighborModel;
pub use similarity::{DenseSimilarityMatrix, SimilarityMatrix, SparseSimilarityMatrix};

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Convenient imports for common pulsecf usage.
///
/// ```rust
/// use pulsecf::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{KnnConfig, StoreConfig};
    pub use crate::error::{PulseCFError, Result};
    pub use crate::events::{DataSet, EventStore};
    pub use crate::knn::NeighborModel;
    pub use crate::ratings::Ratings;
    pub use crate::similarity::{
        DenseSimilarityMatrix, SimilarityMatrix, SparseSimilarityMatrix,
    };
    pub use crate::types::{EntityId, ItemId, Position, UserId};
}
