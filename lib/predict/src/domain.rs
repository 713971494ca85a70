//! Trained value domains and record validation

use crate::record::{columns, FeatureRecord};
use estate_core::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Allowed values of every categorical column, as seen during training
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureDomain {
    categories: BTreeMap<String, Vec<String>>,
}

impl FeatureDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the allowed values of a column (kept sorted, deduplicated)
    pub fn insert(&mut self, column: impl Into<String>, mut values: Vec<String>) {
        values.sort();
        values.dedup();
        self.categories.insert(column.into(), values);
    }

    pub fn values(&self, column: &str) -> Option<&[String]> {
        self.categories.get(column).map(Vec::as_slice)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Check every categorical column of the schema has a domain
    pub fn check_complete(&self) -> Result<()> {
        for column in columns::CATEGORICAL {
            match self.categories.get(column) {
                Some(values) if !values.is_empty() => {}
                _ => {
                    return Err(Error::artifact(format!(
                        "pipeline has no trained categories for '{}'",
                        column
                    )))
                }
            }
        }
        Ok(())
    }

    /// Reject records the pipeline was not trained to handle
    pub fn validate(&self, record: &FeatureRecord) -> Result<()> {
        for column in columns::CATEGORICAL {
            let value = record.categorical(column).unwrap_or_default();
            let allowed = self.values(column).unwrap_or_default();
            if allowed.binary_search_by(|v| v.as_str().cmp(value)).is_err() {
                return Err(Error::validation(
                    column,
                    format!("'{}' is not one of the trained values", value),
                ));
            }
        }

        if !record.built_up_area.is_finite() || record.built_up_area <= 0.0 {
            return Err(Error::validation(
                columns::BUILT_UP_AREA,
                format!("must be a positive area, got {}", record.built_up_area),
            ));
        }
        for (column, value) in [
            (columns::BEDROOMS, record.bedrooms),
            (columns::BATHROOMS, record.bathrooms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::validation(
                    column,
                    format!("must be a non-negative count, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// Choices offered to a price-estimate form
#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub property_type: Vec<String>,
    pub categories: FeatureDomain,
}

impl From<&FeatureDomain> for FormOptions {
    fn from(domain: &FeatureDomain) -> Self {
        Self {
            property_type: domain
                .values(columns::PROPERTY_TYPE)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            categories: domain.clone(),
        }
    }
}
