//! Top-N recommendation over the composite similarity matrix
//!
//! The composite matrix is built once when the recommender is created, so a
//! query is a single row scan plus a sort.

use crate::store::SimilarityStore;
use crate::weights::{self, MATRIX_COUNT};
use estate_core::{Error, PropertyId, PropertyIndex, Result, SimilarityMatrix};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, info};

/// One recommended property with its composite score
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub property: PropertyId,
    pub score: f64,
    /// Weighted contribution of each similarity matrix (sums to `score`)
    pub contributions: [f64; MATRIX_COUNT],
}

/// Ranks properties by the weighted blend of the three similarity matrices
#[derive(Debug, Clone)]
pub struct Recommender {
    store: SimilarityStore,
    composite: SimilarityMatrix,
}

impl Recommender {
    /// Create a recommender, computing the composite matrix in parallel
    pub fn new(store: SimilarityStore) -> Result<Self> {
        let n = store.properties().len();
        let mut data = vec![0.0f64; n * n];

        if n > 0 {
            data.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
                for (j, cell) in row.iter_mut().enumerate() {
                    *cell = weights::composite(store.values(i, j));
                }
            });
        }

        let composite = SimilarityMatrix::new(n, data)?;
        info!("Composite similarity matrix built for {} properties", n);

        Ok(Self { store, composite })
    }

    pub fn store(&self) -> &SimilarityStore {
        &self.store
    }

    pub fn properties(&self) -> &Arc<PropertyIndex> {
        self.store.properties()
    }

    pub fn composite(&self) -> &SimilarityMatrix {
        &self.composite
    }

    /// Composite score between two known properties
    pub fn score(&self, a: &str, b: &str) -> Result<f64> {
        let i = self.properties().require(a)?;
        let j = self.properties().require(b)?;
        Ok(self.composite.get(i, j))
    }

    /// The `top_n` properties most similar to `property`, best first.
    ///
    /// The query property itself is never returned. Equal scores keep the
    /// artifact order of the property index.
    pub fn recommend(&self, property: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        if top_n == 0 {
            return Err(Error::InvalidArgument("top_n must be at least 1".to_string()));
        }
        let row_idx = self.properties().require(property)?;
        let row = self.composite.row(row_idx);

        let mut ranked: Vec<(usize, f64)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != row_idx)
            .collect();
        // sort_by_key is stable, so ties stay in matrix order
        ranked.sort_by_key(|&(_, score)| Reverse(OrderedFloat(score)));
        ranked.truncate(top_n);

        debug!(property, top_n, returned = ranked.len(), "recommendation query");

        Ok(ranked
            .into_iter()
            .map(|(j, score)| Recommendation {
                property: self.properties().id_at(j).clone(),
                score,
                contributions: weights::contributions(self.store.values(row_idx, j)),
            })
            .collect())
    }
}
