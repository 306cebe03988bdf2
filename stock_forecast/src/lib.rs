//! # Stock Forecast
//!
//! Daily market data acquisition, normalization and time series forecasting.
//!
//! ## Features
//!
//! - Provider abstraction with a Yahoo Finance chart API client and a CSV export reader
//! - Structural header normalization: compound `(field, symbol)` headers are
//!   collapsed to their field names and a date row index becomes a `Date` column
//! - Sorted, de-duplicated daily price series with a Polars view
//! - An additive trend + seasonality forecaster with uncertainty bands
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::{Duration, Local};
//! use stock_forecast::data::project;
//! use stock_forecast::loader::MarketDataLoader;
//! use stock_forecast::models::additive::AdditiveModel;
//! use stock_forecast::models::{ForecastModel, TrainedForecastModel};
//! use stock_forecast::providers::{YahooOptions, YahooProvider};
//! use stock_forecast::Ticker;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = MarketDataLoader::new(YahooProvider::new(YahooOptions::default())?);
//!
//! let today = Local::now().date_naive();
//! let ticker = Ticker::new("AAPL")?;
//! let series = loader.load(&ticker, today - Duration::days(365 * 2), today)?;
//!
//! // Fit on (ds, y) and forecast four weeks
//! let trained = AdditiveModel::default().fit(&project(&series)?)?;
//! let forecast = trained.predict(4 * 7)?;
//! println!("{} rows, last {:?}", forecast.len(), forecast.last_date());
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod frame;
pub mod loader;
pub mod models;
pub mod providers;
pub mod ticker;

// Re-export commonly used types
pub use crate::data::{project, PriceBar, PriceSeries, ToDataFrame};
pub use crate::error::{ForecastError, Result};
pub use crate::frame::{normalize, HeaderShape, RawFrame, RowIndex};
pub use crate::loader::MarketDataLoader;
pub use crate::models::additive::{AdditiveConfig, AdditiveModel};
pub use crate::models::{ForecastModel, ForecastTable, TrainedForecastModel};
pub use crate::providers::{MarketDataProvider, ProviderError};
pub use crate::ticker::Ticker;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
