// Writing artifact bundles: gzip/bincode/json/csv encoding with sha256 checksums
use crate::artifact::{sha256_hex, ArtifactFormat};
use crate::manifest::{ArtifactManifest, MANIFEST_FILE};
use estate_core::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Description of a written artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDescription {
    pub name: String,
    pub size: u64,
    pub checksum: String,
}

/// Writes artifacts into a data directory and records their checksums
pub struct BundleWriter {
    data_dir: PathBuf,
    written: Vec<ArtifactDescription>,
}

impl BundleWriter {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            written: Vec::new(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn written(&self) -> &[ArtifactDescription] {
        &self.written
    }

    /// Serialize a value in the format implied by the file name
    pub fn write<T: Serialize>(&mut self, file: &str, value: &T) -> Result<&ArtifactDescription> {
        let path = self.prepare(file)?;
        match ArtifactFormat::from_path(file)? {
            ArtifactFormat::Json => {
                let json_data = serde_json::to_vec(value)?;
                fs::write(&path, json_data)?;
            }
            ArtifactFormat::GzJson => {
                let json_data = serde_json::to_vec(value)?;
                let out = File::create(&path)?;
                let mut encoder = GzEncoder::new(BufWriter::new(out), Compression::default());
                encoder.write_all(&json_data)?;
                encoder.finish()?.flush()?;
            }
            ArtifactFormat::Bincode => {
                let data = bincode::serialize(value)
                    .map_err(|e| Error::Serialization(format!("{}: {}", file, e)))?;
                fs::write(&path, data)?;
            }
            ArtifactFormat::Csv => {
                return Err(Error::artifact(format!(
                    "{} is CSV; use write_csv for tabular artifacts",
                    file
                )))
            }
        }
        self.record(file, &path)
    }

    /// Write rows as a CSV file with a header line
    pub fn write_csv<T: Serialize>(&mut self, file: &str, rows: &[T]) -> Result<&ArtifactDescription> {
        let path = self.prepare(file)?;
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| Error::Serialization(format!("{}: {}", file, e)))?;
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| Error::Serialization(format!("{}: {}", file, e)))?;
        }
        writer.flush()?;
        self.record(file, &path)
    }

    /// Write `manifest.json`, filling in checksums for every written artifact
    pub fn finish(self, mut manifest: ArtifactManifest) -> Result<ArtifactManifest> {
        for artifact in &self.written {
            manifest
                .checksums
                .entry(artifact.name.clone())
                .or_insert_with(|| artifact.checksum.clone());
        }
        manifest.validate()?;

        let path = self.data_dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_vec_pretty(&manifest)?)?;
        info!(
            "Wrote manifest {} ({} artifacts)",
            path.display(),
            self.written.len()
        );
        Ok(manifest)
    }

    fn prepare(&self, file: &str) -> Result<PathBuf> {
        let path = self.data_dir.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn record(&mut self, file: &str, path: &Path) -> Result<&ArtifactDescription> {
        let data = fs::read(path)?;
        self.written.push(ArtifactDescription {
            name: file.to_string(),
            size: data.len() as u64,
            checksum: sha256_hex(&data),
        });
        let last = self.written.len() - 1;
        Ok(&self.written[last])
    }
}
