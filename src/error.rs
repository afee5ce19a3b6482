//! Error types for pulsecf.
//!
//! pulsecf uses a hierarchical error system:
//! - `PulseCFError` is the top-level error returned by all public APIs
//! - Specific error types (`NotFoundError`, `ModelError`, `ValidationError`)
//!   provide detail
//!
//! Lookups that may legitimately miss (`try_get`, `try_index_of`) return
//! `Option` instead of `NotFound`. The two families are never mixed for the
//! same condition.
//!
//! # Error Handling Pattern
//! ```rust
//! use pulsecf::{Ratings, Result};
//!
//! fn example() -> Result<f64> {
//!     let mut ratings = Ratings::new();
//!     ratings.add(0, 0, 4.5);
//!     ratings.get(0, 0)
//! }
//! # assert_eq!(example().unwrap(), 4.5);
//! ```

use thiserror::Error;

use crate::types::{EntityId, ItemId, Position, UserId};

/// Result type alias for pulsecf operations.
pub type Result<T> = std::result::Result<T, PulseCFError>;

/// Top-level error enum for all pulsecf operations.
///
/// This is the only error type returned by public APIs.
/// Use pattern matching to handle specific error cases.
#[derive(Debug, Error)]
pub enum PulseCFError {
    /// Positional access beyond the current number of events.
    #[error("Position {position} out of range (len: {len})")]
    IndexOutOfRange {
        /// The requested position.
        position: Position,
        /// Number of events at the time of the call.
        len: usize,
    },

    /// A lookup that must succeed found no match.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// Persisted model data is structurally invalid.
    #[error("Corrupt model: {0}")]
    CorruptModel(#[from] ModelError),

    /// Input validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PulseCFError {
    /// Creates an out-of-range error for the given position.
    pub fn out_of_range(position: Position, len: usize) -> Self {
        Self::IndexOutOfRange { position, len }
    }

    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if this is a positional out-of-range error.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. })
    }

    /// Returns true if persisted model data was rejected.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptModel(_))
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Not found errors for "must exist" lookups.
#[derive(Debug, Error)]
pub enum NotFoundError {
    /// No event for the given (user, item) pair.
    #[error("Rating not found for user {user}, item {item}")]
    Rating {
        /// The user ID that was looked up.
        user: UserId,
        /// The item ID that was looked up.
        item: ItemId,
    },
}

impl NotFoundError {
    /// Creates a rating not found error.
    pub fn rating(user: UserId, item: ItemId) -> Self {
        Self::Rating { user, item }
    }
}

/// Structural problems found while reading a persisted model.
///
/// Line numbers are 1-based and count from the start of the stream
/// handed to the reader that detected the problem.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The stream ended before the expected content was read.
    #[error("unexpected end of stream (expected {expected})")]
    Truncated {
        /// What the reader was waiting for.
        expected: String,
    },

    /// A field did not parse as the expected number.
    #[error("line {line}: invalid token '{token}'")]
    InvalidToken {
        /// Line the token was found on.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A line had the wrong number of fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    MalformedLine {
        /// Line number.
        line: usize,
        /// Expected field count.
        expected: usize,
        /// Actual field count.
        found: usize,
    },

    /// A neighbor row names its own entity or repeats an id.
    #[error("neighbor row {row} lists {id} as itself or twice")]
    InvalidNeighbor {
        /// Entity whose row is inconsistent.
        row: usize,
        /// The offending neighbor id.
        id: EntityId,
    },

    /// An entity id is outside `[0, entity_count)`.
    #[error("line {line}: entity id {id} out of range (entity count: {count})")]
    EntityOutOfRange {
        /// Line number.
        line: usize,
        /// The offending id.
        id: u64,
        /// Declared entity count.
        count: usize,
    },

    /// A matrix header declares more entities than can be allocated.
    #[error("similarity matrix of {entities} entities is too large to allocate")]
    TooLarge {
        /// Entity count from the header.
        entities: usize,
    },

    /// The embedded similarity matrix disagrees with the model header.
    #[error("entity count mismatch: model has {model}, similarity matrix has {matrix}")]
    EntityCountMismatch {
        /// Entity count in the model header.
        model: usize,
        /// Entity count in the similarity matrix.
        matrix: usize,
    },
}

impl ModelError {
    /// Creates a truncation error.
    pub fn truncated(expected: impl Into<String>) -> Self {
        Self::Truncated {
            expected: expected.into(),
        }
    }

    /// Creates an invalid token error.
    pub fn invalid_token(line: usize, token: impl Into<String>) -> Self {
        Self::InvalidToken {
            line,
            token: token.into(),
        }
    }

    /// Creates a malformed line error.
    pub fn malformed_line(line: usize, expected: usize, found: usize) -> Self {
        Self::MalformedLine {
            line,
            expected,
            found,
        }
    }
}

/// Validation errors for caller-supplied arguments and configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field has an invalid value.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Name of the invalid field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// Entity count doesn't match the similarity matrix.
    #[error("Entity count mismatch: similarity matrix has {expected}, got {got}")]
    DimensionMismatch {
        /// Entity count of the similarity matrix.
        expected: usize,
        /// Entity count requested by the caller.
        got: usize,
    },
}

impl ValidationError {
    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, got: usize) -> Self {
        Self::DimensionMismatch { expected, got }
    }
}
