//! Error types for the stock_dashboard crate

use stock_forecast::ForecastError;
use thiserror::Error;

/// Custom error types for the stock_dashboard crate
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A user input is outside its allowed options
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Loading, normalizing or forecasting failed
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// The configuration file could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A chart or table could not be produced
    #[error("Render error: {0}")]
    Render(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, DashboardError>;

impl From<toml::de::Error> for DashboardError {
    fn from(err: toml::de::Error) -> Self {
        DashboardError::Config(err.to_string())
    }
}

impl From<polars::prelude::PolarsError> for DashboardError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        DashboardError::Render(err.to_string())
    }
}
