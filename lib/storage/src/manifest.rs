//! Artifact bundle manifest
//!
//! A data directory holds `manifest.json` plus the files it names. Paths are
//! relative to the data directory.

use chrono::{DateTime, Utc};
use estate_core::{Error, Result};
use estate_similarity::MATRIX_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Highest manifest version this build understands
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    #[serde(default = "default_version")]
    pub version: u32,

    /// When the artifacts were produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Ordered property identifiers; defaults to the proximity table's index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<String>,

    /// The three similarity matrices, in weight order
    pub similarity: [String; MATRIX_COUNT],

    /// Display names of the similarity matrices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_labels: Option<[String; MATRIX_COUNT]>,

    /// Property x location distance table
    pub proximity: String,

    /// Exported price pipeline
    pub pipeline: String,

    /// Listings dataset for analytics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listings: Option<String>,

    /// Per-sector feature text for analytics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_text: Option<String>,

    /// Expected sha256 (hex) of artifact files, keyed by relative path
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checksums: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    1
}

impl ArtifactManifest {
    /// Read `manifest.json` from a data directory
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(MANIFEST_FILE);
        let bytes = std::fs::read(&path).map_err(|e| {
            Error::artifact(format!("cannot read manifest {}: {}", path.display(), e))
        })?;
        let manifest: ArtifactManifest = serde_json::from_slice(&bytes)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version == 0 || self.version > MANIFEST_VERSION {
            return Err(Error::artifact(format!(
                "unsupported manifest version {} (supported: {})",
                self.version, MANIFEST_VERSION
            )));
        }
        for (name, value) in self.files() {
            if value.is_empty() {
                return Err(Error::artifact(format!("manifest entry '{}' is empty", name)));
            }
        }
        Ok(())
    }

    /// Every artifact file named by the manifest, with its role
    pub fn files(&self) -> Vec<(&'static str, &str)> {
        let mut files = vec![
            ("similarity[0]", self.similarity[0].as_str()),
            ("similarity[1]", self.similarity[1].as_str()),
            ("similarity[2]", self.similarity[2].as_str()),
            ("proximity", self.proximity.as_str()),
            ("pipeline", self.pipeline.as_str()),
        ];
        if let Some(p) = &self.properties {
            files.push(("properties", p.as_str()));
        }
        if let Some(l) = &self.listings {
            files.push(("listings", l.as_str()));
        }
        if let Some(f) = &self.feature_text {
            files.push(("feature_text", f.as_str()));
        }
        files
    }

    pub fn checksum(&self, file: &str) -> Option<&str> {
        self.checksums.get(file).map(String::as_str)
    }
}
