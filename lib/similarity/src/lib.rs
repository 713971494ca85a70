//! # estate Similarity
//!
//! Apartment recommendations from three precomputed similarity matrices.
//!
//! Each matrix scores every property pair along one dimension. The
//! recommender blends them with fixed weights (0.5, 0.8, 1.0) into one
//! composite matrix and answers "top-N most similar to property P".
//!
//! ## Example
//!
//! ```rust
//! use estate_core::{PropertyId, PropertyIndex, SimilarityMatrix};
//! use estate_similarity::{Recommender, SimilarityStore};
//! use std::sync::Arc;
//!
//! let index = Arc::new(PropertyIndex::new(vec![
//!     PropertyId::from("A"),
//!     PropertyId::from("B"),
//!     PropertyId::from("C"),
//! ]).unwrap());
//!
//! let m = SimilarityMatrix::from_rows(vec![
//!     vec![1.0, 0.2, 0.9],
//!     vec![0.2, 1.0, 0.3],
//!     vec![0.9, 0.3, 1.0],
//! ]).unwrap();
//!
//! let store = SimilarityStore::new(index, [m.clone(), m.clone(), m]).unwrap();
//! let recommender = Recommender::new(store).unwrap();
//!
//! let top = recommender.recommend("A", 1).unwrap();
//! assert_eq!(top[0].property.as_str(), "C");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  3 matrices │────>│  Composite  │────>│ Recommender │
//! │  (store)    │     │ (weighted)  │     │  (top-N)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                         ┌─────────────┐
//!                                         │  Explain    │
//!                                         │  (results)  │
//!                                         └─────────────┘
//! ```

pub mod weights;
pub mod store;
pub mod recommend;
pub mod explain;

// Re-export main types for convenience
pub use weights::{DEFAULT_LABELS, DEFAULT_TOP_N, MATRIX_COUNT, SIMILARITY_WEIGHTS};
pub use store::SimilarityStore;
pub use recommend::{Recommendation, Recommender};
pub use explain::{ExplainedRecommendation, RecommendResponse, RecommendationStats};
