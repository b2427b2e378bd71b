//! The pipeline steps behind each subcommand.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use defaulter_data::clock::FixedClock;
use defaulter_data::{read_csv, DataError, DerivedTable, Encoding, FeatureDeriver};
use defaulter_model::{
    evaluate, Evaluation, EvaluationScope, ModelArtifact, ModelError, Trainer, TrainingConfig,
    TrainingOutcome,
};
use thiserror::Error;

use crate::config::{Config, ConfigError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub fn feature_deriver(config: &Config) -> Result<FeatureDeriver, CommandError> {
    let mut deriver = FeatureDeriver::new(&config.data.reference_date)?
        .with_imputation(config.imputation_table());
    if let Some(now) = config.label_time()? {
        log::info!("Labelling against fixed time {now}");
        deriver = deriver.with_clock(FixedClock(now));
    }
    Ok(deriver)
}

pub fn derive_table(config: &Config, encoding: Encoding<'_>) -> Result<DerivedTable, CommandError> {
    let raw = read_csv(&config.data.input, config.data.header_row)?;
    Ok(feature_deriver(config)?.derive(&raw, encoding)?)
}

/// Derive, split, fit and save. The artifact at `config.model.path` is
/// replaced.
pub fn train(config: &Config) -> Result<TrainingOutcome, CommandError> {
    let deriver = feature_deriver(config)?;
    let raw = read_csv(&config.data.input, config.data.header_row)?;
    let table = deriver.derive(&raw, Encoding::Fit)?;
    let mut tags = BTreeMap::new();
    tags.insert("input".to_string(), config.data.input.display().to_string());
    let trainer = Trainer::new(TrainingConfig {
        version: config.model_version()?,
        forest: config.forest_params(),
        split: config.split_params(),
        reference_date: Some(deriver.reference_date().to_string()),
        tags,
        ..TrainingConfig::default()
    });
    let outcome = trainer.train(&table)?;
    outcome.artifact.save(&config.model.path)?;
    Ok(outcome)
}

pub fn evaluate_saved(config: &Config, scope: EvaluationScope) -> Result<Evaluation, CommandError> {
    let artifact = ModelArtifact::load(&config.model.path)?;
    let table = derive_table(config, Encoding::Use(&artifact.codebook))?;
    Ok(evaluate(&artifact, &table, scope)?)
}

/// Write the derived table as CSV to `output`, or stdout. Returns the row
/// count.
pub fn derive_to(config: &Config, output: Option<&Path>) -> Result<usize, CommandError> {
    let table = derive_table(config, Encoding::Fit)?;
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|source| CommandError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let mut w = BufWriter::new(file);
            table.write_csv(&mut w)?;
            w.flush().map_err(|source| CommandError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        None => table.write_csv(io::stdout().lock())?,
    }
    Ok(table.len())
}

pub async fn serve(config: &Config) -> Result<(), CommandError> {
    let addr = config.server_addr()?;
    let artifact = Arc::new(ModelArtifact::load(&config.model.path)?);
    defaulter_web::serve(addr, artifact)
        .await
        .map_err(|source| CommandError::Io {
            path: addr.to_string(),
            source,
        })
}
