use crate::domain::{FeatureDomain, FormOptions};
use crate::pipeline::RegressionPipeline;
use crate::record::FeatureRecord;
use estate_core::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Half-width of the reported price range, in crore rupees.
///
/// A fixed presentation margin, not a model confidence interval.
pub const PRICE_MARGIN_CR: f64 = 0.22;

/// Point estimate widened into a range (crore rupees).
///
/// `low` is not clamped and can be negative for very small estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEstimate {
    pub estimate: f64,
    pub low: f64,
    pub high: f64,
}

impl PriceEstimate {
    pub fn from_point(estimate: f64) -> Self {
        Self {
            estimate,
            low: estimate - PRICE_MARGIN_CR,
            high: estimate + PRICE_MARGIN_CR,
        }
    }
}

/// Price estimates from a trained regression pipeline
#[derive(Clone)]
pub struct PricePredictor {
    pipeline: Arc<dyn RegressionPipeline>,
}

impl PricePredictor {
    pub fn new(pipeline: Arc<dyn RegressionPipeline>) -> Self {
        Self { pipeline }
    }

    /// Validate the record, run the pipeline and invert the log1p target
    pub fn predict(&self, record: &FeatureRecord) -> Result<PriceEstimate> {
        self.pipeline.domain().validate(record)?;

        let log_price = self.pipeline.predict_log(record)?;
        let price = log_price.exp_m1();
        if !log_price.is_finite() || !price.is_finite() {
            return Err(Error::artifact(format!(
                "pipeline produced a non-finite price (log output {})",
                log_price
            )));
        }
        let estimate = PriceEstimate::from_point(price);

        debug!(
            sector = %record.sector,
            estimate = estimate.estimate,
            "price estimate"
        );
        Ok(estimate)
    }

    pub fn domain(&self) -> &FeatureDomain {
        self.pipeline.domain()
    }

    /// Trained choices for each categorical input
    pub fn options(&self) -> FormOptions {
        FormOptions::from(self.pipeline.domain())
    }

    pub fn describe(&self) -> String {
        self.pipeline.describe()
    }
}

impl std::fmt::Debug for PricePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricePredictor")
            .field("pipeline", &self.pipeline.describe())
            .finish()
    }
}
