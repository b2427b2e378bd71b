//! `defaulter.toml`: where the data and model live and how to train.

use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, NaiveTime};
use defaulter_data::{dates, ImputationTable, ImputePolicy};
use defaulter_model::{ForestParams, ModelError, ModelVersion, SplitParams, DEFAULT_MODEL_PATH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "defaulter.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid server address '{0}'")]
    InvalidAddr(String),
    #[error("invalid label date '{0}' (expected YYYY-MM-DD or DD/MM/YYYY)")]
    InvalidLabelDate(String),
    #[error("invalid [model] version: {0}")]
    InvalidVersion(#[source] ModelError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub input: PathBuf,
    /// Zero-based line of the header row in the export
    pub header_row: usize,
    pub reference_date: String,
    /// Pins the clock the defaulter label is computed against. Wall-clock time
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_date: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("activeOnART.csv"),
            header_row: 4,
            reference_date: "07/10/2024".to_string(),
            label_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Recorded in the artifact as `major.minor.patch`
    pub version: String,
    pub n_estimators: usize,
    pub seed: u64,
    pub test_ratio: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            version: "1.0.0".to_string(),
            n_estimators: 100,
            seed: 42,
            test_ratio: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub server: ServerConfig,
    /// Per-column overrides on top of the default imputation table
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub imputation: BTreeMap<String, ImputePolicy>,
}

pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(text)
}

impl Config {
    /// Read `path` if given, else `defaulter.toml` in the working directory if
    /// it exists, else the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(CONFIG_FILE);
                if !p.exists() {
                    log::debug!("No {CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                p
            }
        };
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = parse_config(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn imputation_table(&self) -> ImputationTable {
        ImputationTable::default().merged(&self.imputation)
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.model.n_estimators,
            seed: self.model.seed,
            ..ForestParams::default()
        }
    }

    pub fn split_params(&self) -> SplitParams {
        SplitParams {
            test_ratio: self.model.test_ratio,
            seed: self.model.seed,
        }
    }

    pub fn model_version(&self) -> Result<ModelVersion, ConfigError> {
        ModelVersion::parse(&self.model.version).map_err(ConfigError::InvalidVersion)
    }

    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(self.server.addr.clone()))
    }

    /// Midnight of `data.label_date`, if set.
    pub fn label_time(&self) -> Result<Option<NaiveDateTime>, ConfigError> {
        self.data
            .label_date
            .as_deref()
            .map(|s| {
                dates::parse_date(s)
                    .map(|d| d.and_time(NaiveTime::MIN))
                    .ok_or_else(|| ConfigError::InvalidLabelDate(s.to_string()))
            })
            .transpose()
    }
}
