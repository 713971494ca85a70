//! # estate Core
//!
//! Core library for the estate query service.
//!
//! This crate provides the read-only data structures the service answers
//! queries from:
//!
//! - [`PropertyIndex`] - Shared ordered list of property identifiers
//! - [`SimilarityMatrix`] - Dense square pairwise similarity scores
//! - [`ProximityIndex`] - Radius search over a property x location distance table
//! - [`MarketAnalytics`] - Aggregates over the listings dataset
//!
//! ## Example
//!
//! ```rust
//! use estate_core::{PropertyId, PropertyIndex, ProximityIndex, ProximityTable};
//! use std::sync::Arc;
//!
//! let properties = Arc::new(PropertyIndex::new(vec![
//!     PropertyId::from("Tower A"),
//!     PropertyId::from("Tower B"),
//! ]).unwrap());
//!
//! let table = ProximityTable {
//!     index: vec!["Tower A".into(), "Tower B".into()],
//!     columns: vec!["Sector 45".to_string()],
//!     data: vec![vec![Some(80.0)], vec![Some(450.0)]],
//! };
//! let proximity = ProximityIndex::new(properties, table).unwrap();
//!
//! let nearby = proximity.nearby("Sector 45", 0.1).unwrap();
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].0.as_str(), "Tower A");
//! ```

pub mod error;
pub mod property;
pub mod matrix;
pub mod proximity;
pub mod listing;
pub mod analytics;

pub use error::{Error, Result};
pub use property::{PropertyId, PropertyIndex};
pub use matrix::SimilarityMatrix;
pub use proximity::{ProximityIndex, ProximityTable};
pub use listing::{FeatureText, ListingRecord};
pub use analytics::{
    AreaPricePoint, BedroomCount, HistogramSeries, MarketAnalytics, PriceHistogram, PriceSummary,
    RoomCount, SectorPriceSummary, SectorScore, SectorSummary, TermCount, MAX_BINS, ROOM_TYPES,
};
