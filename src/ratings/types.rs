//! Aggregate statistics over rating values.

use serde::{Deserialize, Serialize};

/// Count, sum and range of all rating values in a collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingStats {
    /// Number of ratings.
    pub count: usize,

    /// Sum of all rating values.
    pub sum: f64,

    /// Smallest rating, `None` when empty.
    pub min: Option<f64>,

    /// Largest rating, `None` when empty.
    pub max: Option<f64>,
}

impl RatingStats {
    /// Computes statistics with one pass over `values`.
    pub fn from_values(values: &[f64]) -> Self {
        let mut stats = Self::default();
        for &value in values {
            stats.record(value);
        }
        stats
    }

    /// Folds one more value into the statistics.
    pub fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Mean rating, `None` when empty.
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
