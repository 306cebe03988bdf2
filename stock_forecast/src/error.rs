//! Error types for the stock_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the stock_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The provider returned no usable rows for the requested ticker and window
    #[error("No data available for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// The provider's column header cannot be reduced to one field name per column
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// Too few observations to fit a model
    #[error("Insufficient history: need at least {required} observations, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from numeric kernels
    #[error("Math error: {0}")]
    MathError(#[from] series_math::MathError),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl ForecastError {
    /// Shorthand for a [`ForecastError::DataUnavailable`]
    pub fn unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        ForecastError::DataUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}
