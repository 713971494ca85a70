//! Radius search over a precomputed property x location distance table

use crate::{Error, PropertyId, PropertyIndex, Result};
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Property x location distances in meters, in pandas "split" layout:
/// `index` are property names, `columns` location names and `data[i][j]`
/// the distance from `index[i]` to `columns[j]` (`null` when unknown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityTable {
    pub index: Vec<PropertyId>,
    pub columns: Vec<String>,
    pub data: Vec<Vec<Option<f64>>>,
}

impl ProximityTable {
    /// Check the table is rectangular and has unique location names
    pub fn validate(&self) -> Result<()> {
        if self.data.len() != self.index.len() {
            return Err(Error::artifact(format!(
                "proximity table has {} index entries but {} rows",
                self.index.len(),
                self.data.len()
            )));
        }
        for (i, row) in self.data.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(Error::artifact(format!(
                    "proximity row '{}' has {} values, expected {}",
                    self.index[i],
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        let mut seen = AHashMap::with_capacity(self.columns.len());
        for name in &self.columns {
            if seen.insert(name.as_str(), ()).is_some() {
                return Err(Error::artifact(format!("duplicate location: {}", name)));
            }
        }
        Ok(())
    }
}

/// Column-major distance index aligned with the shared [`PropertyIndex`]
#[derive(Debug, Clone)]
pub struct ProximityIndex {
    properties: Arc<PropertyIndex>,
    locations: Vec<String>,
    location_positions: AHashMap<String, usize>,
    /// `columns[loc][row]`, NaN where the distance is unknown
    columns: Vec<Vec<f64>>,
}

impl ProximityIndex {
    /// Build the index, reordering table rows into property index order.
    ///
    /// Every property in the index must have exactly one table row and the
    /// table must not mention unknown properties.
    pub fn new(properties: Arc<PropertyIndex>, table: ProximityTable) -> Result<Self> {
        table.validate()?;
        if table.index.len() != properties.len() {
            return Err(Error::artifact(format!(
                "proximity table covers {} properties, index has {}",
                table.index.len(),
                properties.len()
            )));
        }

        let n = properties.len();
        let mut columns = vec![vec![f64::NAN; n]; table.columns.len()];
        let mut filled = vec![false; n];

        for (id, row) in table.index.iter().zip(table.data) {
            let pos = properties.position(id.as_str()).ok_or_else(|| {
                Error::artifact(format!("proximity table row for unknown property: {}", id))
            })?;
            if std::mem::replace(&mut filled[pos], true) {
                return Err(Error::artifact(format!("duplicate proximity row: {}", id)));
            }
            for (col, value) in row.into_iter().enumerate() {
                columns[col][pos] = value.unwrap_or(f64::NAN);
            }
        }

        let location_positions = table
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Ok(Self {
            properties,
            locations: table.columns,
            location_positions,
            columns,
        })
    }

    /// Properties strictly within `radius_km` of `location`, nearest first.
    ///
    /// Returns `(property, distance_m)` pairs with `distance_m < radius_km * 1000`.
    /// Equal distances keep table order. An empty result is not an error.
    pub fn nearby(&self, location: &str, radius_km: f64) -> Result<Vec<(PropertyId, f64)>> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "radius must be a positive number of kilometres, got {}",
                radius_km
            )));
        }
        let col = self
            .location_positions
            .get(location)
            .copied()
            .ok_or_else(|| Error::LocationNotFound(location.to_string()))?;

        let threshold = radius_km * 1000.0;
        let mut hits: Vec<(usize, f64)> = self.columns[col]
            .iter()
            .enumerate()
            // NaN compares false, so unknown distances never match
            .filter(|(_, d)| **d < threshold)
            .map(|(row, d)| (row, *d))
            .collect();

        hits.sort_by_key(|&(_, d)| OrderedFloat(d));

        tracing::debug!(location, radius_km, hits = hits.len(), "radius search");

        Ok(hits
            .into_iter()
            .map(|(row, d)| (self.properties.id_at(row).clone(), d))
            .collect())
    }

    /// Distance from a property to a location, if both are known and the cell is set
    pub fn distance(&self, property: &str, location: &str) -> Option<f64> {
        let row = self.properties.position(property)?;
        let col = *self.location_positions.get(location)?;
        let d = self.columns[col][row];
        (!d.is_nan()).then_some(d)
    }

    /// Location names in table order
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Location names sorted for pickers
    #[must_use]
    pub fn sorted_locations(&self) -> Vec<String> {
        let mut names = self.locations.clone();
        names.sort();
        names
    }

    #[inline]
    #[must_use]
    pub fn has_location(&self, location: &str) -> bool {
        self.location_positions.contains_key(location)
    }

    pub fn properties(&self) -> &Arc<PropertyIndex> {
        &self.properties
    }
}
