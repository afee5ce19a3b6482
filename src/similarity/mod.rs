//! Symmetric entity-to-entity similarity matrices.
//!
//! A similarity matrix is computed by an external trainer (cosine,
//! Jaccard, Pearson, ...) and consumed by the
//! [`NeighborModel`](crate::NeighborModel). This module defines the
//! contract and two storage layouts:
//!
//! - [`DenseSimilarityMatrix`]: `n × n` table, best for small `n`
//! - [`SparseSimilarityMatrix`]: per-row maps of non-zero entries
//!
//! An entry of exactly `0.0` means "no known relation".
//!
//! # Text Format
//!
//! Both implementations share one layout:
//!
//! ```text
//! <num_entities>
//! <i> <j> <value>        one line per non-zero pair, i < j, ascending
//! ```
//!
//! Reading consumes the rest of the stream. Blank lines are skipped.

mod dense;
mod sparse;

pub use dense::DenseSimilarityMatrix;
pub use sparse::SparseSimilarityMatrix;

use std::io::{BufRead, Write};

use crate::error::{ModelError, Result, ValidationError};
use crate::format::{parse_field, LineReader};
use crate::types::EntityId;

/// Symmetric similarity between entities in `[0, num_entities)`.
///
/// Implementations must be `Send + Sync` so a trained model can be shared
/// across threads behind an `Arc`.
pub trait SimilarityMatrix: Send + Sync {
    /// Number of entities covered.
    fn num_entities(&self) -> usize;

    /// Similarity of `i` and `j`. Symmetric; `0.0` if unknown or out of range.
    fn similarity(&self, i: EntityId, j: EntityId) -> f32;

    /// Known relations of `entity` as `(other, similarity)`, excluding
    /// `entity` itself, in ascending id order.
    fn related(&self, entity: EntityId) -> Vec<(EntityId, f32)>;

    /// Writes the matrix in the shared text format.
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Reads a matrix written by [`write_to`](Self::write_to).
    ///
    /// # Errors
    ///
    /// `CorruptModel` for a missing header, malformed lines or ids out of
    /// range; `Io` for read failures.
    fn read_from<R: BufRead>(reader: &mut R) -> Result<Self>
    where
        Self: Sized;
}

/// One non-zero entry of the upper triangle.
pub(crate) type Pair = (EntityId, EntityId, f32);

/// Writes the header and the given upper-triangle pairs.
pub(crate) fn write_pairs<W, I>(writer: &mut W, num_entities: usize, pairs: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = Pair>,
{
    writeln!(writer, "{}", num_entities)?;
    for (i, j, value) in pairs {
        writeln!(writer, "{} {} {}", i, j, value)?;
    }
    Ok(())
}

/// Reads the header and all pair lines until end of stream.
pub(crate) fn read_pairs<R: BufRead>(reader: &mut R) -> Result<(usize, Vec<Pair>)> {
    let mut lines = LineReader::new(reader);

    let num_entities = match lines.next_line()? {
        Some((line, header)) => parse_field::<usize>(header, line)?,
        None => return Err(ModelError::truncated("similarity matrix header").into()),
    };

    let mut pairs = Vec::new();
    while let Some((line, content)) = lines.next_line()? {
        if content.is_empty() {
            continue;
        }
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(ModelError::malformed_line(line, 3, fields.len()).into());
        }
        let i = parse_entity(fields[0], line, num_entities)?;
        let j = parse_entity(fields[1], line, num_entities)?;
        let value: f32 = parse_field(fields[2], line)?;
        pairs.push((i, j, value));
    }

    Ok((num_entities, pairs))
}

fn parse_entity(token: &str, line: usize, count: usize) -> Result<EntityId> {
    let id: u64 = parse_field(token, line)?;
    if id >= count as u64 {
        return Err(ModelError::EntityOutOfRange { line, id, count }.into());
    }
    // count <= usize::MAX and EntityId covers every valid id we hand out
    EntityId::try_from(id).map_err(|_| ModelError::invalid_token(line, token).into())
}

/// Checks that `(i, j)` addresses a matrix with `n` entities.
pub(crate) fn check_entities(i: EntityId, j: EntityId, n: usize) -> Result<()> {
    for id in [i, j] {
        if id as usize >= n {
            return Err(ValidationError::invalid_field(
                "entity",
                format!("id {} out of range for {} entities", id, n),
            )
            .into());
        }
    }
    Ok(())
}
