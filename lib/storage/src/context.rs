//! Read-only service context
//!
//! [`EstateContext`] is built once at startup from an artifact bundle and
//! shared by every request. Nothing in it changes after load.

use crate::artifact::ArtifactReader;
use crate::manifest::ArtifactManifest;
use chrono::{DateTime, Utc};
use estate_core::{
    FeatureText, ListingRecord, MarketAnalytics, PropertyId, PropertyIndex, ProximityIndex,
    ProximityTable, Result,
};
use estate_predict::{LinearPipeline, LinearPipelineSpec, PricePredictor};
use estate_similarity::{Recommender, SimilarityStore, MATRIX_COUNT};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Everything the query operations read from
#[derive(Debug)]
pub struct EstateContext {
    source: Option<PathBuf>,
    created_at: Option<DateTime<Utc>>,
    loaded_at: DateTime<Utc>,
    properties: Arc<PropertyIndex>,
    recommender: Recommender,
    proximity: ProximityIndex,
    predictor: PricePredictor,
    analytics: Option<MarketAnalytics>,
}

/// Counts and timestamps describing a loaded context
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub properties: usize,
    pub locations: usize,
    pub similarity_labels: Vec<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listings: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub loaded_at: DateTime<Utc>,
}

impl EstateContext {
    /// Load and cross-check every artifact named by `manifest.json`
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let started = Instant::now();
        info!("Loading artifacts from {}", data_dir.display());

        let manifest = ArtifactManifest::load(data_dir)?;
        let reader = ArtifactReader::new(data_dir).with_checksums(manifest.checksums.clone());

        let table: ProximityTable = reader.read(&manifest.proximity)?;
        let ids: Vec<PropertyId> = match &manifest.properties {
            Some(file) => reader.read(file)?,
            None => table.index.clone(),
        };
        let properties = Arc::new(PropertyIndex::new(ids)?);
        info!("Property index: {} properties", properties.len());

        let [first, second, third] = &manifest.similarity;
        let matrices = [
            reader.read_matrix(first)?,
            reader.read_matrix(second)?,
            reader.read_matrix(third)?,
        ];
        let mut store = SimilarityStore::new(properties.clone(), matrices)?;
        if let Some(labels) = &manifest.similarity_labels {
            store = store.with_labels(labels.clone());
        }
        let recommender = Recommender::new(store)?;

        let proximity = ProximityIndex::new(properties.clone(), table)?;
        info!("Proximity index: {} locations", proximity.locations().len());

        let spec: LinearPipelineSpec = reader.read(&manifest.pipeline)?;
        let predictor = PricePredictor::new(Arc::new(LinearPipeline::from_spec(spec)?));
        info!("Price model: {}", predictor.describe());

        let analytics = if manifest.listings.is_some() || manifest.feature_text.is_some() {
            let listings: Vec<ListingRecord> = match &manifest.listings {
                Some(file) => reader.read_csv(file)?,
                None => Vec::new(),
            };
            let features: Vec<FeatureText> = match &manifest.feature_text {
                Some(file) => reader.read_csv(file)?,
                None => Vec::new(),
            };
            info!(
                "Market analytics: {} listings, {} feature texts",
                listings.len(),
                features.len()
            );
            Some(MarketAnalytics::new(listings, features))
        } else {
            info!("No listings in bundle, analytics disabled");
            None
        };

        info!("Artifacts loaded in {:?}", started.elapsed());

        Ok(Self {
            source: Some(data_dir.to_path_buf()),
            created_at: manifest.created_at,
            loaded_at: Utc::now(),
            properties,
            recommender,
            proximity,
            predictor,
            analytics,
        })
    }

    /// Assemble a context from already-built parts.
    ///
    /// The recommender and proximity index must share one property index.
    pub fn from_parts(
        recommender: Recommender,
        proximity: ProximityIndex,
        predictor: PricePredictor,
        analytics: Option<MarketAnalytics>,
    ) -> Result<Self> {
        let properties = recommender.properties().clone();
        if properties.ids() != proximity.properties().ids() {
            return Err(estate_core::Error::artifact(
                "recommender and proximity index use different property lists",
            ));
        }
        Ok(Self {
            source: None,
            created_at: None,
            loaded_at: Utc::now(),
            properties,
            recommender,
            proximity,
            predictor,
            analytics,
        })
    }

    pub fn properties(&self) -> &Arc<PropertyIndex> {
        &self.properties
    }

    pub fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    pub fn proximity(&self) -> &ProximityIndex {
        &self.proximity
    }

    pub fn predictor(&self) -> &PricePredictor {
        &self.predictor
    }

    /// `None` when the bundle carries no listings dataset
    pub fn analytics(&self) -> Option<&MarketAnalytics> {
        self.analytics.as_ref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn summary(&self) -> ContextSummary {
        let labels: &[String; MATRIX_COUNT] = self.recommender.store().labels();
        ContextSummary {
            properties: self.properties.len(),
            locations: self.proximity.locations().len(),
            similarity_labels: labels.to_vec(),
            model: self.predictor.describe(),
            listings: self.analytics.as_ref().map(MarketAnalytics::len),
            created_at: self.created_at,
            loaded_at: self.loaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleWriter;
    use estate_core::{Error, SimilarityMatrix};
    use estate_predict::{CategoricalTerm, NumericTerm};
    use std::fs;

    fn numeric(column: &str) -> NumericTerm {
        NumericTerm {
            column: column.to_string(),
            mean: 0.0,
            scale: 1.0,
            coef: 0.0,
        }
    }

    fn one_hot(column: &str, categories: &[&str]) -> CategoricalTerm {
        CategoricalTerm {
            column: column.to_string(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            coefs: vec![0.0; categories.len()],
        }
    }

    fn pipeline() -> LinearPipelineSpec {
        LinearPipelineSpec {
            intercept: 1.0,
            numeric: ["bedRoom", "bathroom", "built_up_area", "servant room", "store room"]
                .into_iter()
                .map(numeric)
                .collect(),
            categorical: vec![
                one_hot("property_type", &["flat", "house"]),
                one_hot("sector", &["sector 45"]),
                one_hot("balcony", &["1", "2"]),
                one_hot("agePossession", &["New Property"]),
                one_hot("furnishing_type", &["unfurnished"]),
                one_hot("luxury_category", &["Low"]),
                one_hot("floor_category", &["Low Floor"]),
            ],
        }
    }

    fn proximity() -> ProximityTable {
        ProximityTable {
            index: vec!["B".into(), "A".into(), "C".into()],
            columns: vec!["Metro".to_string()],
            data: vec![vec![Some(900.0)], vec![Some(300.0)], vec![None]],
        }
    }

    fn write_bundle(dir: &Path, with_listings: bool) -> ArtifactManifest {
        let mut writer = BundleWriter::new(dir).unwrap();
        let m = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.1, 0.7],
            vec![0.1, 1.0, 0.2],
            vec![0.7, 0.2, 1.0],
        ])
        .unwrap();
        writer.write("properties.json", &vec!["A", "B", "C"]).unwrap();
        writer.write("sim1.bin", &m).unwrap();
        writer.write("sim2.json.gz", &m).unwrap();
        writer.write("sim3.json", &m).unwrap();
        writer.write("location_distance.json.gz", &proximity()).unwrap();
        writer.write("pipeline.json", &pipeline()).unwrap();

        let mut json = serde_json::json!({
            "created_at": "2024-05-01T00:00:00Z",
            "properties": "properties.json",
            "similarity": ["sim1.bin", "sim2.json.gz", "sim3.json"],
            "similarity_labels": ["facilities", "price", "location"],
            "proximity": "location_distance.json.gz",
            "pipeline": "pipeline.json"
        });
        if with_listings {
            fs::write(
                dir.join("data_viz1.csv"),
                "property_type,sector,price,price_per_sqft,built_up_area,bedRoom,bathroom\n\
                 flat,sector 45,1.2,8000,1500,3,2\n\
                 house,sector 45,3.1,12000,2600,4,4\n",
            )
            .unwrap();
            json["listings"] = serde_json::json!("data_viz1.csv");
        }
        writer.finish(serde_json::from_value(json).unwrap()).unwrap()
    }

    #[test]
    fn test_load_bundle() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path(), true);

        let ctx = EstateContext::load(dir.path()).unwrap();
        assert_eq!(ctx.properties().len(), 3);
        assert_eq!(ctx.properties().id_at(0).as_str(), "A");

        let recs = ctx.recommender().recommend("A", 5).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].property.as_str(), "C");

        let near = ctx.proximity().nearby("Metro", 1.0).unwrap();
        let names: Vec<&str> = near.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        assert_eq!(ctx.analytics().unwrap().len(), 2);

        let summary = ctx.summary();
        assert_eq!(summary.similarity_labels, vec!["facilities", "price", "location"]);
        assert_eq!(summary.listings, Some(2));
        assert!(summary.created_at.is_some());
        assert_eq!(ctx.source(), Some(dir.path()));
    }

    #[test]
    fn test_properties_default_to_proximity_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = write_bundle(dir.path(), false);
        manifest.properties = None;
        fs::write(
            dir.path().join("manifest.json"),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();

        let ctx = EstateContext::load(dir.path()).unwrap();
        assert_eq!(ctx.properties().id_at(0).as_str(), "B");
        assert!(ctx.analytics().is_none());
    }

    #[test]
    fn test_checksum_mismatch_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path(), false);
        fs::write(dir.path().join("sim3.json"), b"[[1.0,0.0,0.0],[0.0,1.0,0.0],[0.0,0.0,1.0]]").unwrap();

        assert!(matches!(
            EstateContext::load(dir.path()),
            Err(Error::Checksum { .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = write_bundle(dir.path(), false);
        let small = SimilarityMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        fs::write(dir.path().join("sim3.json"), serde_json::to_vec(&small).unwrap()).unwrap();
        manifest.checksums.remove("sim3.json");
        fs::write(
            dir.path().join("manifest.json"),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();

        assert!(matches!(EstateContext::load(dir.path()), Err(Error::Artifact(_))));
    }
}
