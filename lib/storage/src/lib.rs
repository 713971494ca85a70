//! # estate Storage
//!
//! Loading the artifact bundle the service answers from.
//!
//! A data directory holds `manifest.json` and the files it names: three
//! similarity matrices, the property x location distance table, the exported
//! price pipeline and optionally the listings dataset used by the analytics
//! endpoints. Files may be JSON, gzip-compressed JSON, bincode or CSV, and
//! are verified against the manifest's sha256 checksums when listed.

pub mod manifest;
pub mod artifact;
pub mod bundle;
pub mod context;

pub use manifest::{ArtifactManifest, MANIFEST_FILE, MANIFEST_VERSION};
pub use artifact::{sha256_hex, ArtifactFormat, ArtifactReader};
pub use bundle::{ArtifactDescription, BundleWriter};
pub use context::{ContextSummary, EstateContext};
