//! The single persisted model file: metadata, codebook and fitted forest.

use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use defaulter_data::{Codebook, DerivedTable};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::forest::RandomForest;
use crate::metadata::ModelMetadata;

pub const ARTIFACT_VERSION: u32 = 1;
pub const DEFAULT_MODEL_PATH: &str = "models/random_forest_model.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub metadata: ModelMetadata,
    pub codebook: Codebook,
    pub forest: RandomForest,
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ModelError + '_ {
    move |source| ModelError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl ModelArtifact {
    pub fn new(metadata: ModelMetadata, codebook: Codebook, forest: RandomForest) -> Self {
        Self {
            format_version: ARTIFACT_VERSION,
            metadata,
            codebook,
            forest,
        }
    }

    /// Write the artifact, creating the parent directory and replacing any
    /// previous file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_dir_all(dir).map_err(io_err(dir))?;
        }
        let file = File::create(path).map_err(io_err(path))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer(&mut w, self)?;
        w.flush().map_err(io_err(path))?;
        log::info!("Saved model '{}' to {}", self.metadata.name, path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(io_err(path))?;
        let artifact: Self = serde_json::from_reader(BufReader::new(file))?;
        if artifact.format_version != ARTIFACT_VERSION {
            return Err(ModelError::ArtifactVersion {
                found: artifact.format_version,
                expected: ARTIFACT_VERSION,
            });
        }
        if artifact.forest.n_features() != artifact.metadata.feature_names.len() {
            return Err(ModelError::FeatureCount {
                expected: artifact.metadata.feature_names.len(),
                got: artifact.forest.n_features(),
            });
        }
        log::info!(
            "Loaded model '{}' v{} ({} trees) from {}",
            artifact.metadata.name,
            artifact.metadata.version,
            artifact.forest.trees().len(),
            path.display()
        );
        Ok(artifact)
    }

    pub fn predict(&self, features: &[f64]) -> Result<u8, ModelError> {
        self.forest.predict(features)
    }

    pub fn predict_table(&self, table: &DerivedTable) -> Result<Vec<u8>, ModelError> {
        self.forest.predict_batch(&table.features())
    }
}
