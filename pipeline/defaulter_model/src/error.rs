use defaulter_data::DataError;
use thiserror::Error;

/// Errors that can occur while training, persisting or running a model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Cannot split {rows} rows with test ratio {ratio}: one side would be empty")]
    EmptySplit { rows: usize, ratio: f64 },
    #[error("Training data is empty")]
    EmptyTrainingSet,
    #[error("Feature/label length mismatch: {features} rows vs {labels} labels")]
    LengthMismatch { features: usize, labels: usize },
    #[error("Invalid input: expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },
    #[error("Invalid model version '{0}' (expected major.minor.patch)")]
    InvalidVersion(String),
    #[error("Model not fitted")]
    NotFitted,
    #[error("Unsupported artifact version {found} (expected {expected})")]
    ArtifactVersion { found: u32, expected: u32 },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
