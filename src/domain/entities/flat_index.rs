//! Exact (brute-force) L2 nearest-neighbor index.
//!
//! Vectors live in one contiguous row-major buffer; row `i` is the vector
//! inserted `i`-th. Search compares the query against every row.

use crate::domain::error::DomainError;
use crate::domain::values::neighbor::Neighbor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuild an index from a persisted row-major buffer.
    pub fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self, DomainError> {
        let index = Self { dimension, data };
        index.validate()?;
        Ok(index)
    }

    /// Structural check for deserialized indexes.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.dimension == 0 {
            return Err(DomainError::StoreRead("index dimension is zero".into()));
        }
        if self.data.len() % self.dimension != 0 {
            return Err(DomainError::StoreRead(format!(
                "vector data length {} is not a multiple of dimension {}",
                self.data.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dimension.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn raw(&self) -> &[f32] {
        &self.data
    }

    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }

    pub fn add(&mut self, vector: &[f32]) -> Result<usize, DomainError> {
        if vector.len() != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    /// The `k` closest rows to `query`, closest first.
    ///
    /// Distances are squared L2, the ordering is the same as true L2.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError> {
        if query.len() != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(query, row),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
