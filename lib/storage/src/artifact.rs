// Artifact file readers: JSON, gzip JSON, bincode and CSV, with optional sha256 verification
use estate_core::{Error, Result, SimilarityMatrix};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk encoding of an artifact, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    GzJson,
    Bincode,
    Csv,
}

impl ArtifactFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".json.gz") {
            Ok(ArtifactFormat::GzJson)
        } else if lower.ends_with(".json") {
            Ok(ArtifactFormat::Json)
        } else if lower.ends_with(".bin") || lower.ends_with(".bincode") {
            Ok(ArtifactFormat::Bincode)
        } else if lower.ends_with(".csv") {
            Ok(ArtifactFormat::Csv)
        } else {
            Err(Error::artifact(format!("unrecognised artifact format: {}", path)))
        }
    }
}

/// Hex sha256 of a byte slice
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Matrix files come either as `{dim, data}` or as nested rows
#[derive(Deserialize)]
#[serde(untagged)]
enum MatrixFile {
    Flat(SimilarityMatrix),
    Rows(Vec<Vec<f64>>),
}

/// Reads artifact files relative to a data directory
#[derive(Debug, Clone)]
pub struct ArtifactReader {
    data_dir: PathBuf,
    checksums: BTreeMap<String, String>,
}

impl ArtifactReader {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            checksums: BTreeMap::new(),
        }
    }

    /// Expected sha256 (hex) per relative path
    pub fn with_checksums(mut self, checksums: BTreeMap<String, String>) -> Self {
        self.checksums = checksums;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Raw file bytes, checked against the manifest checksum when one is listed
    pub fn read_bytes(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.data_dir.join(file);
        let data = std::fs::read(&path).map_err(|e| {
            Error::artifact(format!("cannot read {}: {}", path.display(), e))
        })?;

        if let Some(expected) = self.checksums.get(file) {
            let actual = sha256_hex(&data);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(Error::Checksum {
                    file: file.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
            debug!("Checksum verified for {}", file);
        }

        info!("Loaded artifact {} ({} bytes)", file, data.len());
        Ok(data)
    }

    /// Deserialize a serde artifact stored as JSON, gzip JSON or bincode
    pub fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        let data = self.read_bytes(file)?;
        match ArtifactFormat::from_path(file)? {
            ArtifactFormat::Json => Ok(serde_json::from_slice(&data)
                .map_err(|e| Error::Serialization(format!("{}: {}", file, e)))?),
            ArtifactFormat::GzJson => {
                let mut decoder = GzDecoder::new(data.as_slice());
                let mut json_data = Vec::new();
                decoder.read_to_end(&mut json_data)?;
                Ok(serde_json::from_slice(&json_data)
                    .map_err(|e| Error::Serialization(format!("{}: {}", file, e)))?)
            }
            ArtifactFormat::Bincode => bincode::deserialize(&data)
                .map_err(|e| Error::Serialization(format!("{}: {}", file, e))),
            ArtifactFormat::Csv => Err(Error::artifact(format!(
                "{} is CSV; use read_csv for tabular artifacts",
                file
            ))),
        }
    }

    /// Deserialize every row of a CSV artifact with headers
    pub fn read_csv<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        if ArtifactFormat::from_path(file)? != ArtifactFormat::Csv {
            return self.read(file);
        }
        let data = self.read_bytes(file)?;
        let mut reader = csv::Reader::from_reader(data.as_slice());
        let mut rows = Vec::new();
        for (i, row) in reader.deserialize().enumerate() {
            let row: T = row.map_err(|e| {
                // header is line 1
                Error::Serialization(format!("{} line {}: {}", file, i + 2, e))
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Read a similarity matrix in any supported layout
    pub fn read_matrix(&self, file: &str) -> Result<SimilarityMatrix> {
        let matrix = match ArtifactFormat::from_path(file)? {
            ArtifactFormat::Bincode => self.read::<SimilarityMatrix>(file)?,
            _ => match self.read::<MatrixFile>(file)? {
                MatrixFile::Flat(m) => m,
                MatrixFile::Rows(rows) => SimilarityMatrix::from_rows(rows)?,
            },
        };
        info!("Similarity matrix {}: {}x{}", file, matrix.dim(), matrix.dim());
        Ok(matrix)
    }
}
