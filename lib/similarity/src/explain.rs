//! Explainability for recommendation results
//!
//! Provides output structures that show how each composite score splits
//! across the three similarity matrices.

use crate::recommend::Recommendation;
use crate::store::SimilarityStore;
use serde::Serialize;
use std::collections::BTreeMap;

/// Decimal places of the display score
const DISPLAY_DECIMALS: i32 = 3;

/// A recommended property with a per-matrix score breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedRecommendation {
    pub property: String,
    /// Composite similarity score
    pub score: f64,
    /// Score rounded for display
    pub display_score: f64,
    /// Per-matrix weighted contributions, keyed by matrix label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<BTreeMap<String, f64>>,
}

impl ExplainedRecommendation {
    /// Create an explained result from a recommendation
    pub fn from_recommendation(rec: Recommendation, store: &SimilarityStore, explain: bool) -> Self {
        let explain = explain.then(|| {
            store
                .labels()
                .iter()
                .cloned()
                .zip(rec.contributions)
                .collect()
        });
        Self {
            property: rec.property.to_string(),
            score: rec.score,
            display_score: round_to(rec.score, DISPLAY_DECIMALS),
            explain,
        }
    }

    pub fn from_recommendations(
        recs: Vec<Recommendation>,
        store: &SimilarityStore,
        explain: bool,
    ) -> Vec<Self> {
        recs.into_iter()
            .map(|r| Self::from_recommendation(r, store, explain))
            .collect()
    }
}

/// Summary statistics for a recommendation query
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationStats {
    /// Number of candidate properties (everything except the query)
    pub candidates_count: usize,
    /// Number of results returned
    pub results_count: usize,
    /// Average score of results
    pub avg_score: f64,
    /// Score of best result
    pub best_score: f64,
    /// Matrix that contributed most to the best result
    pub top_contributing_matrix: Option<String>,
}

impl RecommendationStats {
    /// Compute stats from ranked recommendations
    pub fn compute(results: &[Recommendation], store: &SimilarityStore) -> Self {
        let candidates_count = store.properties().len().saturating_sub(1);
        let Some(best) = results.first() else {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                top_contributing_matrix: None,
            };
        };

        let avg_score = results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64;

        let top_contributing_matrix = best
            .contributions
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| store.labels()[i].clone());

        Self {
            candidates_count,
            results_count: results.len(),
            avg_score,
            best_score: best.score,
            top_contributing_matrix,
        }
    }
}

/// Response structure for the recommendations endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub property: String,
    pub result: Vec<ExplainedRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RecommendationStats>,
}

impl RecommendResponse {
    /// Build the response; `explain` adds breakdowns and stats
    pub fn new(property: &str, recs: Vec<Recommendation>, store: &SimilarityStore, explain: bool) -> Self {
        let stats = explain.then(|| RecommendationStats::compute(&recs, store));
        Self {
            property: property.to_string(),
            result: ExplainedRecommendation::from_recommendations(recs, store, explain),
            stats,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
