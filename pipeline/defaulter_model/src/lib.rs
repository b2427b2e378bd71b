//! Random-forest training, evaluation and model artifacts for
//! appointment-defaulter prediction.
//!
//! The artifact produced by [`Trainer`] carries the forest together with the
//! [`defaulter_data::Codebook`] used to encode the training table, so the
//! evaluator and the web predictor encode categories the same way.

pub mod artifact;
pub mod error;
pub mod evaluator;
pub mod forest;
pub mod metadata;
pub mod metrics;
pub mod split;
pub mod trainer;
pub mod tree;

pub use artifact::{ModelArtifact, ARTIFACT_VERSION, DEFAULT_MODEL_PATH};
pub use error::ModelError;
pub use evaluator::{evaluate, Evaluation, EvaluationScope};
pub use forest::{ForestParams, RandomForest};
pub use metadata::{ModelMetadata, ModelVersion};
pub use metrics::{accuracy, ClassificationReport};
pub use split::{train_test_split, Split, SplitParams};
pub use trainer::{Trainer, TrainingConfig, TrainingOutcome};
