//! Dense `n × n` similarity table.

use std::io::{BufRead, Write};

use crate::error::{ModelError, Result};
use crate::types::EntityId;

use super::{check_entities, read_pairs, write_pairs, SimilarityMatrix};

/// Full row-major `f32` table. Every `set` writes both halves.
///
/// Memory is `4 · n²` bytes; prefer
/// [`SparseSimilarityMatrix`](super::SparseSimilarityMatrix) when most
/// pairs are unrelated.
///
/// # Example
/// ```rust
/// use pulsecf::{DenseSimilarityMatrix, SimilarityMatrix};
///
/// let mut sim = DenseSimilarityMatrix::new(3);
/// sim.set(0, 1, 0.9).unwrap();
/// assert_eq!(sim.similarity(1, 0), 0.9);
/// assert!(sim.related(2).is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DenseSimilarityMatrix {
    num_entities: usize,
    data: Vec<f32>,
}

impl DenseSimilarityMatrix {
    /// Creates an all-zero matrix over `num_entities` entities.
    pub fn new(num_entities: usize) -> Self {
        Self {
            num_entities,
            data: vec![0.0; num_entities * num_entities],
        }
    }

    /// Builds a matrix from a pair function evaluated on the upper triangle.
    pub fn from_fn<F>(num_entities: usize, mut f: F) -> Self
    where
        F: FnMut(EntityId, EntityId) -> f32,
    {
        let mut matrix = Self::new(num_entities);
        for i in 0..num_entities {
            for j in (i + 1)..num_entities {
                let value = f(i as EntityId, j as EntityId);
                matrix.put(i, j, value);
            }
        }
        matrix
    }

    /// Sets `sim(i, j)` and `sim(j, i)`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either id is out of range.
    pub fn set(&mut self, i: EntityId, j: EntityId, value: f32) -> Result<()> {
        check_entities(i, j, self.num_entities)?;
        self.put(i as usize, j as usize, value);
        Ok(())
    }

    fn put(&mut self, i: usize, j: usize, value: f32) {
        let n = self.num_entities;
        self.data[i * n + j] = value;
        self.data[j * n + i] = value;
    }
}

impl SimilarityMatrix for DenseSimilarityMatrix {
    fn num_entities(&self) -> usize {
        self.num_entities
    }

    fn similarity(&self, i: EntityId, j: EntityId) -> f32 {
        let (i, j) = (i as usize, j as usize);
        if i >= self.num_entities || j >= self.num_entities {
            return 0.0;
        }
        self.data[i * self.num_entities + j]
    }

    fn related(&self, entity: EntityId) -> Vec<(EntityId, f32)> {
        let e = entity as usize;
        if e >= self.num_entities {
            return Vec::new();
        }
        let row = &self.data[e * self.num_entities..(e + 1) * self.num_entities];
        row.iter()
            .enumerate()
            .filter(|&(j, &value)| j != e && value != 0.0)
            .map(|(j, &value)| (j as EntityId, value))
            .collect()
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let n = self.num_entities;
        let pairs = (0..n).flat_map(move |i| {
            ((i + 1)..n).filter_map(move |j| {
                let value = self.data[i * n + j];
                (value != 0.0).then_some((i as EntityId, j as EntityId, value))
            })
        });
        write_pairs(writer, n, pairs)
    }

    /// Reads a matrix written by [`write_to`](SimilarityMatrix::write_to).
    ///
    /// The table is reserved fallibly: a header declaring more entities
    /// than memory can hold is `CorruptModel` (`TooLarge`), not an abort.
    fn read_from<R: BufRead>(reader: &mut R) -> Result<Self> {
        let (num_entities, pairs) = read_pairs(reader)?;
        let too_large = || ModelError::TooLarge {
            entities: num_entities,
        };

        let cells = num_entities
            .checked_mul(num_entities)
            .ok_or_else(too_large)?;
        let mut data: Vec<f32> = Vec::new();
        data.try_reserve_exact(cells).map_err(|_| too_large())?;
        data.resize(cells, 0.0);

        let mut matrix = Self { num_entities, data };
        for (i, j, value) in pairs {
            matrix.put(i as usize, j as usize, value);
        }
        Ok(matrix)
    }
}
