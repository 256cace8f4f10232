//! Error types for the aq_forecast crate

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the aq_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The observation source is missing, unreadable or malformed
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// The model artifact is missing, malformed or built for another schema
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// The requested date is not a valid calendar date
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The requested date has no feature row
    #[error("No data available for {0}")]
    NotFound(NaiveDate),

    /// The model failed on a structurally valid feature vector
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Writing the feature table failed
    #[error("Export error: {0}")]
    Export(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    /// Whether the error was caused by the caller's request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, ForecastError::InvalidDate(_) | ForecastError::NotFound(_))
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::DataLoad(err.to_string())
    }
}

impl From<aq_math::MathError> for ForecastError {
    fn from(err: aq_math::MathError) -> Self {
        ForecastError::DataLoad(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Export(err.to_string())
    }
}
