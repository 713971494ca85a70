//! # estate Predict
//!
//! Price estimates for Gurgaon flats and houses.
//!
//! A [`FeatureRecord`] describes a property with the twelve columns the
//! price model was trained on. [`PricePredictor`] rejects values outside the
//! trained domain, evaluates the [`RegressionPipeline`], inverts the log1p
//! target and reports a range of ±0.22 crore around the estimate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use estate_predict::{FeatureRecord, LinearPipeline, LinearPipelineSpec, PricePredictor};
//! use std::sync::Arc;
//!
//! let spec: LinearPipelineSpec =
//!     serde_json::from_str(&std::fs::read_to_string("data/pipeline.json").unwrap()).unwrap();
//! let predictor = PricePredictor::new(Arc::new(LinearPipeline::from_spec(spec).unwrap()));
//!
//! let record: FeatureRecord = serde_json::from_str(r#"{
//!     "property_type": "flat", "sector": "sector 45", "bedRoom": 3, "bathroom": 3,
//!     "balcony": "3+", "agePossession": "Relatively New", "built_up_area": 1850,
//!     "servant room": 1, "store room": 0, "furnishing_type": "semifurnished",
//!     "luxury_category": "High", "floor_category": "Mid Floor"
//! }"#).unwrap();
//!
//! let price = predictor.predict(&record).unwrap();
//! println!("{:.2} - {:.2} Cr", price.low, price.high);
//! ```

pub mod record;
pub mod domain;
pub mod pipeline;
pub mod predictor;

pub use record::{columns, FeatureRecord, PropertyType, RoomFlag};
pub use domain::{FeatureDomain, FormOptions};
pub use pipeline::{CategoricalTerm, LinearPipeline, LinearPipelineSpec, NumericTerm, RegressionPipeline};
pub use predictor::{PriceEstimate, PricePredictor, PRICE_MARGIN_CR};
