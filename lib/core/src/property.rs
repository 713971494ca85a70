use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property identifier - the listing's society/tower name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(String);

impl PropertyId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PropertyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PropertyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Shared ordered list of property identifiers.
///
/// Row `i` of every similarity matrix and of the proximity table refers to
/// `ids[i]`. The order is the artifact order and is never changed.
#[derive(Debug, Clone)]
pub struct PropertyIndex {
    ids: Vec<PropertyId>,
    positions: AHashMap<String, usize>,
}

impl PropertyIndex {
    /// Build the index, rejecting empty names and duplicates
    pub fn new(ids: Vec<PropertyId>) -> Result<Self> {
        let mut positions = AHashMap::with_capacity(ids.len());
        for (pos, id) in ids.iter().enumerate() {
            if id.as_str().is_empty() {
                return Err(Error::artifact(format!(
                    "empty property identifier at position {}",
                    pos
                )));
            }
            if positions.insert(id.as_str().to_string(), pos).is_some() {
                return Err(Error::artifact(format!("duplicate property identifier: {}", id)));
            }
        }
        Ok(Self { ids, positions })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row position of a property, if known
    #[inline]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Row position of a property or `PropertyNotFound`
    pub fn require(&self, id: &str) -> Result<usize> {
        self.position(id)
            .ok_or_else(|| Error::PropertyNotFound(id.to_string()))
    }

    #[inline]
    pub fn id_at(&self, pos: usize) -> &PropertyId {
        &self.ids[pos]
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn ids(&self) -> &[PropertyId] {
        &self.ids
    }

    /// Identifiers in lexicographic order (for pickers)
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<PropertyId> {
        let mut ids = self.ids.clone();
        ids.sort();
        ids
    }
}
