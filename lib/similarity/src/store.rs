//! Holder for the three precomputed similarity matrices

use crate::weights::{DEFAULT_LABELS, MATRIX_COUNT};
use estate_core::{Error, PropertyIndex, Result, SimilarityMatrix};
use std::sync::Arc;
use tracing::warn;

/// Asymmetry above this is reported at load time
const SYMMETRY_TOLERANCE: f64 = 1e-6;

/// Three similarity matrices over a shared property index
#[derive(Debug, Clone)]
pub struct SimilarityStore {
    properties: Arc<PropertyIndex>,
    matrices: [SimilarityMatrix; MATRIX_COUNT],
    labels: [String; MATRIX_COUNT],
}

impl SimilarityStore {
    /// Create a store, checking every matrix matches the property index
    pub fn new(
        properties: Arc<PropertyIndex>,
        matrices: [SimilarityMatrix; MATRIX_COUNT],
    ) -> Result<Self> {
        for (i, matrix) in matrices.iter().enumerate() {
            if matrix.dim() != properties.len() {
                return Err(Error::artifact(format!(
                    "similarity matrix {} has dimension {}, property index has {} entries",
                    i + 1,
                    matrix.dim(),
                    properties.len()
                )));
            }
            let asymmetry = matrix.max_asymmetry();
            if asymmetry > SYMMETRY_TOLERANCE {
                warn!(matrix = i + 1, asymmetry, "similarity matrix is not symmetric");
            }
        }

        Ok(Self {
            properties,
            matrices,
            labels: DEFAULT_LABELS.map(String::from),
        })
    }

    /// Name the matrices for explained results
    pub fn with_labels(mut self, labels: [String; MATRIX_COUNT]) -> Self {
        self.labels = labels;
        self
    }

    pub fn properties(&self) -> &Arc<PropertyIndex> {
        &self.properties
    }

    pub fn matrices(&self) -> &[SimilarityMatrix; MATRIX_COUNT] {
        &self.matrices
    }

    pub fn labels(&self) -> &[String; MATRIX_COUNT] {
        &self.labels
    }

    /// The three raw similarities of one property pair
    #[inline]
    pub fn values(&self, i: usize, j: usize) -> [f64; MATRIX_COUNT] {
        [
            self.matrices[0].get(i, j),
            self.matrices[1].get(i, j),
            self.matrices[2].get(i, j),
        ]
    }
}
