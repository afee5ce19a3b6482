//! k-nearest-neighbor model over a similarity matrix.
//!
//! A [`NeighborModel`] stores, per entity, the ids of its `k` most similar
//! other entities together with a shared reference to the
//! [`SimilarityMatrix`] they were derived from.
//!
//! # Persisted Format
//!
//! ```text
//! <entity_count>
//! <neighbor ids of entity 0, space separated>
//! <neighbor ids of entity 1>
//! ...                                   (entity_count rows)
//! <similarity matrix, see crate::similarity>
//! ```
//!
//! Rows are ragged: an entity with fewer than `k` known relations has a
//! shorter row, possibly empty. On load, `k` is inferred from the row
//! widths, so a model always loads back with the rows it was saved with.

mod topk;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::KnnConfig;
use crate::error::{ModelError, Result, ValidationError};
use crate::format::{parse_field, LineReader};
use crate::similarity::SimilarityMatrix;
use crate::types::EntityId;

use topk::{ScoredNeighbor, TopK};

/// Precomputed nearest neighbors for every entity.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use pulsecf::{DenseSimilarityMatrix, NeighborModel};
///
/// let mut sim = DenseSimilarityMatrix::new(3);
/// sim.set(0, 1, 0.9).unwrap();
/// sim.set(0, 2, 0.2).unwrap();
/// sim.set(1, 2, 0.5).unwrap();
///
/// let model = NeighborModel::train(3, 1, Arc::new(sim)).unwrap();
/// assert_eq!(model.neighbors(0), &[1]);
/// assert_eq!(model.neighbors(1), &[0]);
/// assert_eq!(model.neighbors(2), &[1]);
/// ```
#[derive(Debug)]
pub struct NeighborModel<S> {
    /// Number of neighbors per entity (configured or inferred on load).
    k: usize,

    /// `neighbors[e]`: ids ranked by descending similarity, at most `k`.
    neighbors: Vec<Vec<EntityId>>,

    /// The matrix the neighbors were derived from.
    similarity: Arc<S>,
}

impl<S> Clone for NeighborModel<S> {
    fn clone(&self) -> Self {
        Self {
            k: self.k,
            neighbors: self.neighbors.clone(),
            similarity: Arc::clone(&self.similarity),
        }
    }
}

impl<S: SimilarityMatrix> NeighborModel<S> {
    /// Computes the top-`k` neighbors of entities `0..entity_count`.
    ///
    /// Candidates are the known relations of each entity (non-zero
    /// similarity, itself excluded), ranked by descending similarity with
    /// ties broken by ascending id. Uses bounded heap selection, so the
    /// cost per entity is `O(r log k)` for `r` relations.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `k` is 0 or `entity_count` exceeds
    /// the matrix.
    #[instrument(skip(similarity), fields(matrix_entities = similarity.num_entities()))]
    pub fn train(entity_count: usize, k: usize, similarity: Arc<S>) -> Result<Self> {
        KnnConfig { k }.validate()?;
        if entity_count > similarity.num_entities() {
            return Err(
                ValidationError::dimension_mismatch(similarity.num_entities(), entity_count).into(),
            );
        }

        let mut neighbors = Vec::with_capacity(entity_count);
        let mut isolated = 0usize;
        for entity in 0..entity_count {
            let entity = entity as EntityId;
            let mut topk = TopK::new(k);
            for (other, sim) in similarity.related(entity) {
                if other != entity && (other as usize) < entity_count {
                    topk.offer(ScoredNeighbor::new(other, sim));
                }
            }
            let ranked = topk.into_ranked_ids();
            if ranked.is_empty() {
                isolated += 1;
            }
            neighbors.push(ranked);
        }

        if entity_count > 0 && isolated == entity_count {
            warn!(entity_count, "No entity has any known relation");
        }
        info!(entity_count, k, isolated, "Trained neighbor model");

        Ok(Self {
            k,
            neighbors,
            similarity,
        })
    }

    /// Trains with the `k` from `config`.
    pub fn train_with_config(
        config: &KnnConfig,
        entity_count: usize,
        similarity: Arc<S>,
    ) -> Result<Self> {
        Self::train(entity_count, config.k, similarity)
    }

    /// Neighbors of `entity`, best first. Empty for unknown entities.
    pub fn neighbors(&self, entity: EntityId) -> &[EntityId] {
        self.neighbors
            .get(entity as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of neighbors kept per entity.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of entities with a neighbor row.
    pub fn num_entities(&self) -> usize {
        self.neighbors.len()
    }

    /// The similarity matrix the model was derived from.
    pub fn similarity(&self) -> &Arc<S> {
        &self.similarity
    }

    /// Neighbor-weighted aggregate for `entity`.
    ///
    /// Sums `sim(entity, n)` over the neighbors `n` for which `is_member`
    /// holds. With item neighbors and `is_member = "user interacted with
    /// n"`, this is the item-based KNN score of `entity` for that user.
    pub fn weighted_score<F>(&self, entity: EntityId, mut is_member: F) -> f32
    where
        F: FnMut(EntityId) -> bool,
    {
        self.neighbors(entity)
            .iter()
            .filter(|&&n| is_member(n))
            .map(|&n| self.similarity.similarity(entity, n))
            .sum()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Writes the model followed by its similarity matrix.
    #[instrument(skip(self, writer), fields(entities = self.neighbors.len(), k = self.k))]
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}", self.neighbors.len())?;
        for row in &self.neighbors {
            let mut ids = row.iter();
            if let Some(first) = ids.next() {
                write!(writer, "{}", first)?;
                for id in ids {
                    write!(writer, " {}", id)?;
                }
            }
            writeln!(writer)?;
        }
        self.similarity.write_to(writer)?;
        info!("Saved neighbor model");
        Ok(())
    }

    /// Reads a model written by [`save`](Self::save).
    ///
    /// Nothing is returned unless the whole stream is consistent.
    ///
    /// # Errors
    ///
    /// `CorruptModel` for a truncated stream, non-numeric tokens, neighbor
    /// ids outside `[0, entity_count)`, rows that repeat an id or name their
    /// own entity, or a matrix smaller than the entity count. `Io` for read
    /// failures.
    #[instrument(skip(reader))]
    pub fn load<R: BufRead>(reader: &mut R) -> Result<Self> {
        let neighbors = read_rows(reader)?;
        let entity_count = neighbors.len();

        let k = infer_k(&neighbors);
        if let Some(first) = neighbors.first() {
            if first.len() < k {
                debug!(first_row = first.len(), k, "First neighbor row is shorter than k");
            }
        }

        let similarity = S::read_from(reader)?;
        if similarity.num_entities() < entity_count {
            return Err(ModelError::EntityCountMismatch {
                model: entity_count,
                matrix: similarity.num_entities(),
            }
            .into());
        }

        info!(entity_count, k, "Loaded neighbor model");
        Ok(Self {
            k,
            neighbors,
            similarity: Arc::new(similarity),
        })
    }

    /// Saves the model to a file, replacing any existing one.
    ///
    /// Not atomic: write to a temporary path and rename for crash safety.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a model from a file written by [`save_to_path`](Self::save_to_path).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::load(&mut reader)
    }
}

/// Reads the entity count line and that many neighbor rows.
fn read_rows<R: BufRead>(reader: &mut R) -> Result<Vec<Vec<EntityId>>> {
    let mut lines = LineReader::new(reader);

    let entity_count: usize = match lines.next_line()? {
        Some((line, header)) => parse_field(header, line)?,
        None => return Err(ModelError::truncated("entity count").into()),
    };

    // Rows are pushed as read; a lying header fails at the first missing row
    let mut rows = Vec::new();
    for row in 0..entity_count {
        let Some((line, content)) = lines.next_line()? else {
            return Err(ModelError::truncated(format!(
                "neighbor row {} of {}",
                row, entity_count
            ))
            .into());
        };
        let ids = content
            .split_whitespace()
            .map(|token| {
                let id: u64 = parse_field(token, line)?;
                if id >= entity_count as u64 {
                    return Err(ModelError::EntityOutOfRange {
                        line,
                        id,
                        count: entity_count,
                    });
                }
                EntityId::try_from(id).map_err(|_| ModelError::invalid_token(line, token))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        check_row(row, &ids)?;
        rows.push(ids);
    }
    Ok(rows)
}

/// A row never names its own entity and never repeats an id.
fn check_row(row: usize, ids: &[EntityId]) -> std::result::Result<(), ModelError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for &id in ids {
        if id as usize == row || !seen.insert(id) {
            return Err(ModelError::InvalidNeighbor { row, id });
        }
    }
    Ok(())
}

/// `k` is the widest row, which is the first row whenever that entity has a
/// full neighbor list. Shorter rows belong to entities with fewer relations.
fn infer_k(rows: &[Vec<EntityId>]) -> usize {
    rows.iter().map(Vec::len).max().unwrap_or(0)
}
