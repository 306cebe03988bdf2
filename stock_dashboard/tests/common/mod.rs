#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use polars::prelude::DataFrame;
use stock_forecast::frame::{ColumnData, HeaderShape, RawFrame, RowIndex};
use stock_forecast::models::{
    ForecastModel, ForecastRow, ForecastTable, History, SeasonalProfile, TrainedForecastModel,
};
use stock_forecast::providers::{DownloadRequest, MarketDataProvider, ProviderError};
use stock_forecast::ForecastError;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// Weekday bars from `start` up to the day before `end`, as a yfinance-style frame
pub fn weekday_frame(symbol: &str, start: NaiveDate, end: NaiveDate) -> RawFrame {
    use chrono::{Datelike, Weekday};

    let dates: Vec<NaiveDate> = start
        .iter_days()
        .take_while(|d| *d < end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect();
    let closes: Vec<f64> = (0..dates.len()).map(|i| 100.0 + (i % 20) as f64).collect();

    let fields = ["Adj Close", "Close", "High", "Low", "Open", "Volume"];
    let header = HeaderShape::Compound(
        fields
            .iter()
            .map(|f| (f.to_string(), symbol.to_string()))
            .collect(),
    );
    let columns = fields
        .iter()
        .map(|_| ColumnData::Numbers(closes.iter().copied().map(Some).collect()))
        .collect();
    RawFrame::new(header, RowIndex::Dates(dates), columns).unwrap()
}

/// Generates weekday bars inside the requested window for known symbols;
/// anything else comes back empty
#[derive(Debug, Default)]
pub struct FixtureProvider {
    symbols: Vec<String>,
}

impl FixtureProvider {
    pub fn with(mut self, symbol: &str) -> Self {
        self.symbols.push(symbol.to_string());
        self
    }
}

impl MarketDataProvider for FixtureProvider {
    fn download(&self, request: &DownloadRequest) -> Result<RawFrame, ProviderError> {
        match request.symbols.first() {
            Some(symbol) if self.symbols.iter().any(|s| s == symbol.as_str()) => Ok(
                weekday_frame(symbol.as_str(), request.start, request.end),
            ),
            _ => Ok(RawFrame::empty()),
        }
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

/// Predicts the last observed value forever, with a fixed ±1 band
#[derive(Debug, Clone, Default)]
pub struct StubModel;

#[derive(Debug)]
pub struct TrainedStub {
    history: History,
}

impl ForecastModel for StubModel {
    type Trained = TrainedStub;

    fn fit(&self, history: &DataFrame) -> stock_forecast::Result<TrainedStub> {
        let history = History::from_dataframe(history)?;
        if history.len() < 2 {
            return Err(ForecastError::InsufficientHistory {
                required: 2,
                actual: history.len(),
            });
        }
        Ok(TrainedStub { history })
    }

    fn name(&self) -> &str {
        "Stub"
    }
}

impl TrainedForecastModel for TrainedStub {
    fn predict(&self, periods: usize) -> stock_forecast::Result<ForecastTable> {
        let first = self.history.first_date().unwrap();
        let last = self.history.last_date().unwrap();
        let level = *self.history.values().last().unwrap();
        let end = last + Days::new(periods as u64);

        let rows = first
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|ds| ForecastRow {
                ds,
                yhat: level,
                yhat_lower: level - 1.0,
                yhat_upper: level + 1.0,
                trend: level,
                trend_lower: level,
                trend_upper: level,
                seasonal: Vec::new(),
            })
            .collect();
        ForecastTable::new(rows, Vec::new(), last)
    }

    fn history(&self) -> &History {
        &self.history
    }

    fn seasonalities(&self) -> Vec<String> {
        Vec::new()
    }

    fn seasonal_profile(&self, _name: &str) -> Option<SeasonalProfile> {
        None
    }

    fn name(&self) -> &str {
        "Stub"
    }
}
