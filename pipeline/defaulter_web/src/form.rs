//! The ten-field prediction form and its conversion into a feature row.

use defaulter_data::{columns, Codebook, DataError};
use defaulter_model::{ModelArtifact, ModelError};
use serde::Deserialize;
use thiserror::Error;

/// Errors turning a submitted form into a prediction
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Field '{field}' is empty")]
    MissingField { field: &'static str },
    #[error("Field '{field}' must be an integer, got '{value}'")]
    NotInteger { field: &'static str, value: String },
    #[error("Field '{field}' must be a number, got '{value}'")]
    NotNumber { field: &'static str, value: String },
    #[error(transparent)]
    Category(#[from] DataError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Raw form submission. Every field arrives as text; conversion happens in
/// [`PredictForm::features`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PredictForm {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub bmi: String,
    #[serde(default)]
    pub systolic_bp: String,
    #[serde(default)]
    pub diastolic_bp: String,
    #[serde(default)]
    pub days_between_next_last: String,
    #[serde(default)]
    pub days_between_last_self: String,
    #[serde(default)]
    pub months_of_prescription: String,
    #[serde(default)]
    pub ahd_client: String,
    #[serde(default)]
    pub medical_cover: String,
    #[serde(default)]
    pub sex: String,
}

fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, PredictError> {
    match value.trim() {
        "" => Err(PredictError::MissingField { field }),
        v => Ok(v),
    }
}

fn integer(field: &'static str, value: &str) -> Result<f64, PredictError> {
    let v = non_empty(field, value)?;
    v.parse::<i64>()
        .map(|n| n as f64)
        .map_err(|_| PredictError::NotInteger {
            field,
            value: v.to_string(),
        })
}

fn number(field: &'static str, value: &str) -> Result<f64, PredictError> {
    let v = non_empty(field, value)?;
    v.parse::<f64>().map_err(|_| PredictError::NotNumber {
        field,
        value: v.to_string(),
    })
}

/// An integer code is taken as-is; anything else must be a label known to the
/// codebook for `column`.
fn category(
    field: &'static str,
    value: &str,
    column: &str,
    codebook: &Codebook,
) -> Result<f64, PredictError> {
    let v = non_empty(field, value)?;
    if let Ok(code) = v.parse::<i64>() {
        return Ok(code as f64);
    }
    Ok(f64::from(codebook.encode(column, v)?))
}

impl PredictForm {
    /// Feature row in training column order.
    pub fn features(&self, codebook: &Codebook) -> Result<Vec<f64>, PredictError> {
        Ok(vec![
            integer("age", &self.age)?,
            number("bmi", &self.bmi)?,
            integer("systolic_bp", &self.systolic_bp)?,
            integer("diastolic_bp", &self.diastolic_bp)?,
            integer("days_between_next_last", &self.days_between_next_last)?,
            integer("days_between_last_self", &self.days_between_last_self)?,
            integer("months_of_prescription", &self.months_of_prescription)?,
            category("ahd_client", &self.ahd_client, columns::AHD_CLIENT, codebook)?,
            category(
                "medical_cover",
                &self.medical_cover,
                columns::MEDICAL_COVER,
                codebook,
            )?,
            category("sex", &self.sex, columns::SEX, codebook)?,
        ])
    }

    pub fn predict(&self, artifact: &ModelArtifact) -> Result<u8, PredictError> {
        let row = self.features(&artifact.codebook)?;
        log::debug!("Predicting for row {row:?}");
        Ok(artifact.predict(&row)?)
    }
}
