//! Configuration types for pulsecf.
//!
//! - [`StoreConfig`] controls event store construction (RNG seed for the
//!   random-order index, preallocated capacity)
//! - [`KnnConfig`] controls neighbor model training
//!
//! # Example
//! ```rust
//! use pulsecf::{KnnConfig, StoreConfig};
//!
//! // Reproducible random ordering
//! let config = StoreConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let knn = KnnConfig { k: 20 };
//! assert!(knn.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default number of neighbors kept per entity.
pub const DEFAULT_K: usize = 80;

/// Event store configuration.
///
/// All fields have sensible defaults. Use struct update syntax to override
/// specific settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Seed for the random-order index.
    ///
    /// `Some` makes every permutation sequence reproducible across runs.
    /// `None` seeds from OS entropy.
    pub random_seed: Option<u64>,

    /// Number of events to preallocate room for.
    ///
    /// Purely a performance hint for bulk loaders that know the dataset
    /// size. Default: 0
    pub initial_capacity: usize,
}

impl StoreConfig {
    /// Creates a new StoreConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a StoreConfig with a fixed RNG seed.
    ///
    /// # Example
    /// ```rust
    /// use pulsecf::StoreConfig;
    ///
    /// let config = StoreConfig::seeded(7);
    /// assert_eq!(config.random_seed, Some(7));
    /// ```
    pub fn seeded(seed: u64) -> Self {
        Self {
            random_seed: Some(seed),
            ..Default::default()
        }
    }
}

/// Neighbor model training configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnnConfig {
    /// The number of neighbors to keep per entity.
    ///
    /// Default: 80
    pub k: usize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

impl KnnConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `ValidationError` if `k` is 0.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.k == 0 {
            return Err(ValidationError::invalid_field("k", "must be greater than 0"));
        }
        Ok(())
    }
}
