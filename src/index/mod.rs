//! Exact nearest-neighbor search over one embedding field, plus the tag index.
//!
//! Vectors are stored flat and searched by brute force with squared Euclidean
//! distance. Both stored and query vectors are L2-normalized, so the derived
//! similarity `1 - d / 2` equals cosine similarity.

mod tags;

pub use tags::TagIndex;

use crate::corpus::Field;
use crate::error::{GuaxinimError, Result};

/// One match from a [`VectorIndex`] search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f32,
    /// Position of the matched vector in build order.
    pub position: usize,
}

impl Neighbor {
    pub fn similarity(&self) -> f32 {
        similarity_from_distance(self.distance)
    }
}

/// Convert a squared Euclidean distance between unit vectors to cosine similarity.
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 - distance / 2.0
}

pub fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Scale a vector to unit length. Zero vectors are returned unchanged.
pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return vector.to_vec();
    }
    vector.iter().map(|x| x / norm).collect()
}

/// Flat exact-search index over a single field's embeddings.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    field: Field,
    dimension: usize,
    data: Vec<f32>,
    len: usize,
}

impl VectorIndex {
    /// Build an index. Every vector must have exactly `dimension` components.
    pub fn build(field: Field, dimension: usize, vectors: &[&[f32]]) -> Result<Self> {
        let mut data = Vec::with_capacity(vectors.len() * dimension);

        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(GuaxinimError::DimensionMismatch {
                    context: format!("{} index position {}", field, position),
                    expected: dimension,
                    found: vector.len(),
                });
            }
            data.extend(normalize(vector));
        }

        Ok(Self {
            field,
            dimension,
            data,
            len: vectors.len(),
        })
    }

    /// An index with no vectors; every search comes back without matches.
    pub fn empty(field: Field) -> Self {
        Self {
            field,
            dimension: 0,
            data: Vec::new(),
            len: 0,
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn vector(&self, position: usize) -> &[f32] {
        let start = position * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Return up to `k` matches ordered by ascending squared distance.
    ///
    /// Ties keep index order. A `k` larger than the index yields every vector.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(GuaxinimError::DimensionMismatch {
                context: format!("{} query", self.field),
                expected: self.dimension,
                found: query.len(),
            });
        }

        let query = normalize(query);
        let mut neighbors: Vec<Neighbor> = (0..self.len)
            .map(|position| Neighbor {
                distance: squared_distance(&query, self.vector(position)),
                position,
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.position.cmp(&b.position))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}
