//! # estate
//!
//! A read-only query service over precomputed Gurgaon real-estate artifacts.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! estate --data-dir ./data --http-port 8501
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use estate::prelude::*;
//!
//! let ctx = EstateContext::load("./data").unwrap();
//!
//! // Five apartments most like a given society
//! for rec in ctx.recommender().recommend("DLF The Crest", 5).unwrap() {
//!     println!("{} {:.3}", rec.property, rec.score);
//! }
//!
//! // Everything strictly within 2 km of a landmark, nearest first
//! for (property, meters) in ctx.proximity().nearby("Sector 45", 2.0).unwrap() {
//!     println!("{} {:.0} m", property, meters);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - [`estate-core`](estate_core) - Property index, similarity matrices, radius search, analytics
//! - [`estate-similarity`](estate_similarity) - Weighted composite recommendations
//! - [`estate-predict`](estate_predict) - Price estimates from an exported regression pipeline
//! - [`estate-storage`](estate_storage) - Artifact manifest, readers and the loaded context
//! - [`estate-api`](estate_api) - REST API

// Re-export core types
pub use estate_core::{
    Error, MarketAnalytics, PropertyId, PropertyIndex, ProximityIndex, ProximityTable, Result,
    SimilarityMatrix,
};

pub use estate_similarity::{Recommendation, Recommender, SimilarityStore, SIMILARITY_WEIGHTS};

pub use estate_predict::{FeatureRecord, LinearPipeline, PriceEstimate, PricePredictor, PRICE_MARGIN_CR};

// Re-export storage
pub use estate_storage::{ArtifactManifest, BundleWriter, EstateContext};

// Re-export API
pub use estate_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Error, Result,
        PropertyId, PropertyIndex, SimilarityMatrix, ProximityIndex, ProximityTable, MarketAnalytics,
        Recommendation, Recommender, SimilarityStore,
        FeatureRecord, PriceEstimate, PricePredictor,
        EstateContext,
        RestApi,
    };
}
