//! Model metadata and versioning structures

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::forest::ForestParams;
use crate::split::SplitParams;

/// `major.minor.patch` of a trained model, set from the `[model] version` key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ModelVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        let mut parts = s.trim().split('.').map(str::parse::<u32>);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch)), None) => {
                Ok(Self::new(major, minor, patch))
            }
            _ => Err(ModelError::InvalidVersion(s.to_string())),
        }
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What was trained, on what, and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: ModelVersion,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Feature columns in the order the forest expects them
    pub feature_names: Vec<String>,
    pub forest: ForestParams,
    pub split: SplitParams,
    /// Reference date ages were computed against (YYYY-MM-DD)
    pub reference_date: Option<String>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_accuracy: Option<f64>,
    /// Free-form provenance, e.g. the input file
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ModelMetadata {
    pub fn new(name: &str, version: ModelVersion, forest: ForestParams, split: SplitParams) -> Self {
        Self {
            name: name.to_string(),
            version,
            created_at: chrono::Utc::now().to_rfc3339(),
            feature_names: defaulter_data::columns::FEATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            forest,
            split,
            reference_date: None,
            train_rows: 0,
            test_rows: 0,
            test_accuracy: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_reference_date(mut self, date: String) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parse_and_display() {
        let v = ModelVersion::parse(" 2.0.11 ").unwrap();
        assert_eq!(v, ModelVersion::new(2, 0, 11));
        assert_eq!(v.to_string(), "2.0.11");
        for bad in ["1.2", "1.x.3", "1.2.3.4", ""] {
            let err = ModelVersion::parse(bad).unwrap_err();
            assert!(matches!(err, ModelError::InvalidVersion(ref s) if s == bad));
        }
    }

    #[test]
    fn version_ordering() {
        assert!(ModelVersion::new(1, 0, 0) < ModelVersion::new(1, 1, 0));
        assert!(ModelVersion::new(1, 1, 0) < ModelVersion::new(2, 0, 0));
    }

    #[test]
    fn metadata_defaults_to_training_feature_order() {
        let meta = ModelMetadata::new(
            "random_forest_model",
            ModelVersion::new(1, 0, 0),
            ForestParams::default(),
            SplitParams::default(),
        )
        .with_reference_date("2024-10-07".into())
        .with_tag("task", "defaulter");

        assert_eq!(meta.feature_names.len(), 10);
        assert_eq!(meta.feature_names[0], "Age");
        assert_eq!(meta.feature_names[9], "Sex");
        assert_eq!(meta.forest.n_estimators, 100);
        assert_eq!(meta.tags.get("task").map(String::as_str), Some("defaulter"));
    }
}
