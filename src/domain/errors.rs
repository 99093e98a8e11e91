use thiserror::Error;

use crate::domain::forecasting::ModelKind;

/// Errors raised while preparing data, fitting or querying forecasting models.
///
/// All of them are fatal at startup: the forecast bundle is built once and
/// nothing retries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Insufficient data: series has {len} points, need more than {window}")]
    InsufficientData { len: usize, window: usize },

    #[error("Degenerate series: every price equals {value}, min-max range is zero")]
    DegenerateSeries { value: f64 },

    #[error("Window size must be at least 1")]
    InvalidWindow,

    #[error("Invalid price at index {index}: {value}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("Window length mismatch: expected {expected}, got {actual}")]
    WindowMismatch { expected: usize, actual: usize },

    #[error("{model} fit failed: {reason}")]
    ModelFitFailure { model: ModelKind, reason: String },
}

/// Errors related to loading sales records
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read sales data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed sales CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid date '{value}' on row {row}")]
    InvalidDate { row: usize, value: String },

    #[error("No sales records found in {source_name}")]
    Empty { source_name: String },
}
