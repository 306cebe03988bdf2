//! Provider abstraction for market data sources.
//!
//! This module defines the [`MarketDataProvider`] trait, the single seam
//! through which daily bars enter the crate. Each concrete source (the
//! Yahoo chart API, a directory of CSV exports) implements it and returns
//! the table in its own shape as a [`RawFrame`]; reshaping is left to
//! [`crate::frame::normalize`].
//!
//! The trait is object safe so the data source can be chosen at runtime
//! (`Box<dyn MarketDataProvider>`).
//!
//! # Example
//!
//! ```rust
//! use stock_forecast::frame::RawFrame;
//! use stock_forecast::providers::{DownloadRequest, MarketDataProvider, ProviderError};
//!
//! struct NoData;
//!
//! impl MarketDataProvider for NoData {
//!     fn download(&self, _request: &DownloadRequest) -> Result<RawFrame, ProviderError> {
//!         Ok(RawFrame::empty())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "no-data"
//!     }
//! }
//! ```

pub mod csv_file;
pub mod yahoo;

pub use csv_file::CsvProvider;
pub use yahoo::{YahooOptions, YahooProvider};

use crate::frame::RawFrame;
use crate::ticker::Ticker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Corporate action handling for downloaded prices
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Keep the traded Close and report Adj Close as its own column
    #[default]
    Raw,
    /// Rescale Open/High/Low/Close by the adjustment factor and drop Adj Close
    Auto,
}

/// Parameters for a daily bars download
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadRequest {
    /// Symbols to request; one symbol yields a single group in the header
    pub symbols: Vec<Ticker>,
    /// First day of the window (inclusive)
    pub start: NaiveDate,
    /// Last day of the window (exclusive)
    pub end: NaiveDate,
    /// How split and dividend adjustments are applied
    pub adjustment: Adjustment,
}

impl DownloadRequest {
    /// Request unadjusted daily bars for one symbol
    pub fn single(ticker: Ticker, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbols: vec![ticker],
            start,
            end,
            adjustment: Adjustment::Raw,
        }
    }
}

/// Errors that can occur within a `MarketDataProvider` implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider's API returned a specific error message (e.g., unknown symbol).
    #[error("API error: {0}")]
    Api(String),

    /// The request parameters were invalid for this specific provider.
    #[error("Invalid parameters for provider: {0}")]
    Validation(String),

    /// The provider's payload could not be decoded.
    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    /// The provider's table header has a shape that cannot be read.
    #[error("Unreadable header: {0}")]
    MalformedHeader(String),

    /// Reading a local source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV source could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Fetches daily bars from a market data source
pub trait MarketDataProvider {
    /// Download daily bars for the requested symbols and window
    ///
    /// An unknown symbol or a window without trading days may come back as
    /// an error or as an empty frame, depending on the source.
    fn download(&self, request: &DownloadRequest) -> Result<RawFrame, ProviderError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn download(&self, request: &DownloadRequest) -> Result<RawFrame, ProviderError> {
        (**self).download(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
