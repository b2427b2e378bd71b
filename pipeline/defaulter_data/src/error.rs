use thiserror::Error;

/// Errors raised while reading or deriving a clinic record table.
///
/// Row numbers are 1-based and count data rows only (the header is not a row).
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Column '{0}' not found in the data")]
    MissingColumn(String),
    #[error("Row {row}: missing value in column '{column}'")]
    MissingValue { column: String, row: usize },
    #[error("Row {row}: cannot parse date '{value}' in column '{column}'")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Row {row}: cannot parse number '{value}' in column '{column}'")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Row {row}: blood pressure '{value}' is not of the form systolic/diastolic")]
    InvalidBloodPressure { row: usize, value: String },
    #[error("Unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },
    #[error("Invalid reference date '{0}' (expected DD/MM/YYYY or YYYY-MM-DD)")]
    InvalidReferenceDate(String),
    #[error("Header row {header_row} is past the end of the input")]
    MissingHeader { header_row: usize },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
