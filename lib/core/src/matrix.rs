//! Dense square similarity matrices
//!
//! A [`SimilarityMatrix`] holds pairwise scores over the rows of a
//! [`PropertyIndex`](crate::PropertyIndex), stored row-major. Matrices are
//! produced offline and only read at query time.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Square `dim x dim` matrix of pairwise similarity scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct SimilarityMatrix {
    dim: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl TryFrom<RawMatrix> for SimilarityMatrix {
    type Error = Error;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        SimilarityMatrix::new(raw.dim, raw.data)
    }
}

impl SimilarityMatrix {
    /// Create a matrix from row-major data
    pub fn new(dim: usize, data: Vec<f64>) -> Result<Self> {
        let expected = dim.checked_mul(dim).ok_or_else(|| {
            Error::artifact(format!("matrix dimension {} overflows", dim))
        })?;
        if data.len() != expected {
            return Err(Error::artifact(format!(
                "matrix of dimension {} needs {} values, got {}",
                dim,
                expected,
                data.len()
            )));
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(Error::artifact(format!(
                "non-finite similarity at row {}, column {}",
                pos / dim,
                pos % dim
            )));
        }
        Ok(Self { dim, data })
    }

    /// Create a matrix from nested rows (the layout numpy's `tolist` produces)
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dim = rows.len();
        let mut data = Vec::with_capacity(dim * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(Error::artifact(format!(
                    "matrix is not square: row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            data.extend(row);
        }
        Self::new(dim, data)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Largest `|m[i][j] - m[j][i]|` over the matrix
    pub fn max_asymmetry(&self) -> f64 {
        let mut worst = 0.0f64;
        for i in 0..self.dim {
            for j in (i + 1)..self.dim {
                worst = worst.max((self.get(i, j) - self.get(j, i)).abs());
            }
        }
        worst
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.max_asymmetry() <= tolerance
    }
}
