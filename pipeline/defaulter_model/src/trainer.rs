//! Fit the forest on the training split and score it on the held-out split.

use std::collections::BTreeMap;

use defaulter_data::{columns, DerivedTable};
use serde::{Deserialize, Serialize};

use crate::artifact::ModelArtifact;
use crate::error::ModelError;
use crate::forest::{ForestParams, RandomForest};
use crate::metadata::{ModelMetadata, ModelVersion};
use crate::metrics::accuracy;
use crate::split::{train_test_split, Split, SplitParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub model_name: String,
    pub version: ModelVersion,
    pub forest: ForestParams,
    pub split: SplitParams,
    /// Recorded in the artifact metadata
    pub reference_date: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model_name: "random_forest_model".into(),
            version: ModelVersion::new(1, 0, 0),
            forest: ForestParams::default(),
            split: SplitParams::default(),
            reference_date: None,
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub split: Split,
    /// Accuracy on the held-out split, in [0, 1]
    pub accuracy: f64,
}

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn train(&self, table: &DerivedTable) -> Result<TrainingOutcome, ModelError> {
        let split = train_test_split(&table.features(), &table.labels(), self.config.split)?;
        log::info!("Features used for training: {:?}", columns::FEATURES);
        log::info!(
            "Training on {} rows, holding out {}",
            split.x_train.len(),
            split.x_test.len()
        );

        let forest = RandomForest::fit(&split.x_train, &split.y_train, self.config.forest)?;
        let predicted = forest.predict_batch(&split.x_test)?;
        let acc = accuracy(&split.y_test, &predicted);

        let mut metadata = ModelMetadata::new(
            &self.config.model_name,
            self.config.version.clone(),
            self.config.forest,
            self.config.split,
        );
        if let Some(date) = &self.config.reference_date {
            metadata = metadata.with_reference_date(date.clone());
        }
        for (key, value) in &self.config.tags {
            metadata = metadata.with_tag(key, value);
        }
        metadata.train_rows = split.x_train.len();
        metadata.test_rows = split.x_test.len();
        metadata.test_accuracy = Some(acc);

        Ok(TrainingOutcome {
            artifact: ModelArtifact::new(metadata, table.codebook.clone(), forest),
            split,
            accuracy: acc,
        })
    }
}
