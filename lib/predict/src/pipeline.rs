//! Regression pipelines
//!
//! [`RegressionPipeline`] is the seam for any trained price model. The
//! shipped implementation, [`LinearPipeline`], evaluates an exported
//! scale + one-hot + linear model.

use crate::domain::FeatureDomain;
use crate::record::{columns, FeatureRecord};
use ahash::AHashMap;
use estate_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A trained model mapping a feature record to a log1p-scale price
pub trait RegressionPipeline: Send + Sync {
    /// Raw model output (log1p of the price in crore)
    fn predict_log(&self, record: &FeatureRecord) -> Result<f64>;

    /// Categorical values the model was trained on
    fn domain(&self) -> &FeatureDomain;

    /// Short human-readable description of the model
    fn describe(&self) -> String {
        "regression pipeline".to_string()
    }
}

/// Standard-scaled numeric input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericTerm {
    pub column: String,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub coef: f64,
}

fn default_scale() -> f64 {
    1.0
}

/// One-hot encoded categorical input, one coefficient per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalTerm {
    pub column: String,
    pub categories: Vec<String>,
    pub coefs: Vec<f64>,
}

/// Exported linear pipeline artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPipelineSpec {
    pub intercept: f64,
    pub numeric: Vec<NumericTerm>,
    pub categorical: Vec<CategoricalTerm>,
}

/// Linear model over scaled numeric and one-hot categorical columns
#[derive(Debug, Clone)]
pub struct LinearPipeline {
    intercept: f64,
    numeric: Vec<NumericTerm>,
    categorical: Vec<(String, AHashMap<String, f64>)>,
    domain: FeatureDomain,
}

impl LinearPipeline {
    /// Validate an exported spec against the twelve-column schema
    pub fn from_spec(spec: LinearPipelineSpec) -> Result<Self> {
        if !spec.intercept.is_finite() {
            return Err(Error::artifact("pipeline intercept is not finite"));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(columns::NUMERIC.len() + columns::CATEGORICAL.len());

        for term in &spec.numeric {
            if !columns::NUMERIC.contains(&term.column.as_str()) {
                return Err(Error::artifact(format!(
                    "'{}' is not a numeric column of the feature schema",
                    term.column
                )));
            }
            if !term.coef.is_finite() || !term.mean.is_finite() || !term.scale.is_finite() || term.scale == 0.0 {
                return Err(Error::artifact(format!(
                    "numeric term '{}' has invalid parameters",
                    term.column
                )));
            }
            seen.push(&term.column);
        }

        let mut domain = FeatureDomain::new();
        let mut categorical = Vec::with_capacity(spec.categorical.len());
        for term in &spec.categorical {
            if !columns::CATEGORICAL.contains(&term.column.as_str()) {
                return Err(Error::artifact(format!(
                    "'{}' is not a categorical column of the feature schema",
                    term.column
                )));
            }
            if term.categories.len() != term.coefs.len() {
                return Err(Error::artifact(format!(
                    "categorical term '{}' has {} categories but {} coefficients",
                    term.column,
                    term.categories.len(),
                    term.coefs.len()
                )));
            }
            if term.coefs.iter().any(|c| !c.is_finite()) {
                return Err(Error::artifact(format!(
                    "categorical term '{}' has a non-finite coefficient",
                    term.column
                )));
            }
            let weights: AHashMap<String, f64> = term
                .categories
                .iter()
                .cloned()
                .zip(term.coefs.iter().copied())
                .collect();
            if weights.len() != term.categories.len() {
                return Err(Error::artifact(format!(
                    "categorical term '{}' repeats a category",
                    term.column
                )));
            }
            domain.insert(term.column.clone(), term.categories.clone());
            categorical.push((term.column.clone(), weights));
            seen.push(&term.column);
        }

        seen.sort_unstable();
        if seen.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::artifact("pipeline lists a column more than once"));
        }
        if seen.len() != columns::NUMERIC.len() + columns::CATEGORICAL.len() {
            let missing: Vec<&str> = columns::NUMERIC
                .iter()
                .chain(columns::CATEGORICAL.iter())
                .copied()
                .filter(|c| !seen.contains(c))
                .collect();
            return Err(Error::artifact(format!(
                "pipeline does not cover columns: {}",
                missing.join(", ")
            )));
        }
        domain.check_complete()?;

        Ok(Self {
            intercept: spec.intercept,
            numeric: spec.numeric,
            categorical,
            domain,
        })
    }
}

impl RegressionPipeline for LinearPipeline {
    fn predict_log(&self, record: &FeatureRecord) -> Result<f64> {
        let mut y = self.intercept;

        for term in &self.numeric {
            let x = record
                .numeric(&term.column)
                .ok_or_else(|| Error::validation(term.column.clone(), "missing numeric value"))?;
            y += term.coef * (x - term.mean) / term.scale;
        }

        for (column, weights) in &self.categorical {
            let value = record.categorical(column).unwrap_or_default();
            let coef = weights.get(value).ok_or_else(|| {
                Error::validation(column.clone(), format!("'{}' is not one of the trained values", value))
            })?;
            y += coef;
        }

        Ok(y)
    }

    fn domain(&self) -> &FeatureDomain {
        &self.domain
    }

    fn describe(&self) -> String {
        format!(
            "linear pipeline ({} numeric, {} one-hot columns)",
            self.numeric.len(),
            self.categorical.len()
        )
    }
}
