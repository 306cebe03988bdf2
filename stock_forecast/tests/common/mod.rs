#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stock_forecast::frame::{ColumnData, HeaderShape, RawFrame, RowIndex};
use stock_forecast::providers::{DownloadRequest, MarketDataProvider, ProviderError};

pub const YFINANCE_FIELDS: [&str; 6] = ["Adj Close", "Close", "High", "Low", "Open", "Volume"];

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Consecutive calendar days starting at `start`
pub fn days(start: &str, count: usize) -> Vec<NaiveDate> {
    date(start).iter_days().take(count).collect()
}

/// Cells for the six yfinance fields, derived from one close per row
pub fn yfinance_columns(closes: &[f64]) -> Vec<ColumnData> {
    YFINANCE_FIELDS
        .iter()
        .map(|field| {
            let values = closes
                .iter()
                .map(|c| match *field {
                    "Adj Close" => Some(c * 0.99),
                    "High" => Some(c + 1.0),
                    "Low" => Some(c - 1.0),
                    "Open" => Some(c - 0.5),
                    "Volume" => Some(1_000.0),
                    _ => Some(*c),
                })
                .collect();
            ColumnData::Numbers(values)
        })
        .collect()
}

/// A frame laid out like a yfinance download: `(field, symbol)` header, date index
pub fn compound_frame(symbol: &str, dates: Vec<NaiveDate>, closes: &[f64]) -> RawFrame {
    let header = HeaderShape::Compound(
        YFINANCE_FIELDS
            .iter()
            .map(|f| (f.to_string(), symbol.to_string()))
            .collect(),
    );
    RawFrame::new(header, RowIndex::Dates(dates), yfinance_columns(closes)).unwrap()
}

/// A frame with one header row and dates already in a column
pub fn flat_frame(dates: Vec<NaiveDate>, closes: &[f64]) -> RawFrame {
    let mut fields = vec!["Date".to_string()];
    fields.extend(YFINANCE_FIELDS.iter().map(|f| f.to_string()));
    let mut columns = vec![ColumnData::Dates(dates)];
    columns.extend(yfinance_columns(closes));
    RawFrame::new(HeaderShape::Simple(fields), RowIndex::Positional, columns).unwrap()
}

/// Serves fixed frames per symbol; unknown symbols come back empty
#[derive(Default)]
pub struct FixtureProvider {
    frames: HashMap<String, RawFrame>,
}

impl FixtureProvider {
    pub fn with(mut self, symbol: &str, frame: RawFrame) -> Self {
        self.frames.insert(symbol.to_string(), frame);
        self
    }
}

impl MarketDataProvider for FixtureProvider {
    fn download(&self, request: &DownloadRequest) -> Result<RawFrame, ProviderError> {
        let symbol = request
            .symbols
            .first()
            .ok_or_else(|| ProviderError::Validation("no symbol".to_string()))?;
        Ok(self
            .frames
            .get(symbol.as_str())
            .cloned()
            .unwrap_or_else(RawFrame::empty))
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
