//! Sparse similarity storage: only non-zero pairs are kept.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, Write};

use crate::error::Result;
use crate::types::EntityId;

use super::{check_entities, read_pairs, write_pairs, Pair, SimilarityMatrix};

/// Per-entity ordered maps of non-zero similarities.
///
/// Both directions of a pair are stored so that [`related`] is a single
/// map lookup. Memory grows with the number of known pairs, not with
/// `num_entities`.
///
/// [`related`]: SimilarityMatrix::related
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseSimilarityMatrix {
    num_entities: usize,
    rows: HashMap<EntityId, BTreeMap<EntityId, f32>>,
}

impl SparseSimilarityMatrix {
    /// Creates an empty matrix over `num_entities` entities.
    pub fn new(num_entities: usize) -> Self {
        Self {
            num_entities,
            rows: HashMap::new(),
        }
    }

    /// Sets `sim(i, j)` and `sim(j, i)`. Setting `0.0` removes the pair.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either id is out of range.
    pub fn set(&mut self, i: EntityId, j: EntityId, value: f32) -> Result<()> {
        check_entities(i, j, self.num_entities)?;
        self.put(i, j, value);
        Ok(())
    }

    fn put(&mut self, i: EntityId, j: EntityId, value: f32) {
        if value == 0.0 {
            self.remove_half(i, j);
            self.remove_half(j, i);
        } else {
            self.rows.entry(i).or_default().insert(j, value);
            self.rows.entry(j).or_default().insert(i, value);
        }
    }

    fn remove_half(&mut self, i: EntityId, j: EntityId) {
        if let Some(row) = self.rows.get_mut(&i) {
            row.remove(&j);
            if row.is_empty() {
                self.rows.remove(&i);
            }
        }
    }

    /// Number of stored unordered pairs (self-pairs count once).
    pub fn num_pairs(&self) -> usize {
        self.upper_triangle().len()
            + self
                .rows
                .iter()
                .filter(|(i, row)| row.contains_key(*i))
                .count()
    }

    fn upper_triangle(&self) -> Vec<Pair> {
        let mut pairs: Vec<Pair> = self
            .rows
            .iter()
            .flat_map(|(&i, row)| {
                row.range(i.saturating_add(1)..)
                    .filter(move |(&j, _)| j > i)
                    .map(move |(&j, &value)| (i, j, value))
            })
            .collect();
        pairs.sort_unstable_by_key(|&(i, j, _)| (i, j));
        pairs
    }
}

impl SimilarityMatrix for SparseSimilarityMatrix {
    fn num_entities(&self) -> usize {
        self.num_entities
    }

    fn similarity(&self, i: EntityId, j: EntityId) -> f32 {
        self.rows
            .get(&i)
            .and_then(|row| row.get(&j))
            .copied()
            .unwrap_or(0.0)
    }

    fn related(&self, entity: EntityId) -> Vec<(EntityId, f32)> {
        self.rows.get(&entity).map_or_else(Vec::new, |row| {
            row.iter()
                .filter(|(&j, _)| j != entity)
                .map(|(&j, &value)| (j, value))
                .collect()
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_pairs(writer, self.num_entities, self.upper_triangle())
    }

    fn read_from<R: BufRead>(reader: &mut R) -> Result<Self> {
        let (num_entities, pairs) = read_pairs(reader)?;
        let mut matrix = Self::new(num_entities);
        for (i, j, value) in pairs {
            matrix.put(i, j, value);
        }
        Ok(matrix)
    }
}
