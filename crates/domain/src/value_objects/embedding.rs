//! Semantic embedding vectors.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Every embedding in the graph shares this dimensionality.
pub const EMBEDDING_DIMENSIONS: usize = 768;

/// A fixed-dimension embedding produced by the embedding collaborator.
///
/// Construction (including deserialization) rejects vectors of the wrong
/// length or with non-finite components, so similarity math never has to
/// re-check shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Result<Self, DomainError> {
        if values.len() != EMBEDDING_DIMENSIONS {
            return Err(DomainError::validation(format!(
                "embedding vector must have {} dimensions, got {}",
                EMBEDDING_DIMENSIONS,
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::validation(
                "embedding vector contains non-finite values",
            ));
        }
        Ok(Self(values))
    }

    /// Build from the `f64` list representation used by the graph store.
    pub fn from_f64(values: Vec<f64>) -> Result<Self, DomainError> {
        Self::new(values.into_iter().map(|v| v as f32).collect())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.0.iter().map(|&v| f64::from(v)).collect()
    }

    pub fn magnitude(&self) -> f64 {
        dot(self, self).sqrt()
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = DomainError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(value: Embedding) -> Self {
        value.0
    }
}

/// Raw dot product, accumulated in `f64`.
pub fn dot(a: &Embedding, b: &Embedding) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

/// Cosine similarity. `None` when either vector has zero magnitude.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Option<f64> {
    let denom = a.magnitude() * b.magnitude();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(dot(a, b) / denom)
}
