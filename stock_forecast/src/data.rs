//! Normalized daily price data
//!
//! A [`PriceSeries`] is the clean, strictly date-ordered table produced by
//! the loader. Its tabular view always exposes the columns
//! `Date, Open, High, Low, Close, Adj Close, Volume`.

use crate::error::{ForecastError, Result};
use crate::frame::{ColumnData, RawFrame};
use crate::ticker::Ticker;
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, warn};

pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const ADJ_CLOSE: &str = "Adj Close";
pub const VOLUME: &str = "Volume";

/// Numeric fields of a price bar, in output column order
pub const PRICE_FIELDS: [&str; 6] = [OPEN, HIGH, LOW, CLOSE, ADJ_CLOSE, VOLUME];

/// Column names of the forecasting projection
pub const DS: &str = "ds";
pub const Y: &str = "y";

/// Conversion of crate data structures into Polars DataFrames
pub trait ToDataFrame {
    /// Converts the object into a DataFrame
    fn to_dataframe(&self) -> Result<DataFrame>;
}

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Unadjusted close
    pub close: f64,
    /// Close adjusted for splits and dividends
    pub adj_close: f64,
    pub volume: f64,
}

/// Daily price history for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: Ticker,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars, sorting by date and dropping duplicate dates
    ///
    /// When a date occurs more than once the bar delivered last wins.
    pub fn from_bars(ticker: Ticker, mut bars: Vec<PriceBar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(ForecastError::unavailable(
                ticker.as_str(),
                "no price rows in the requested window",
            ));
        }

        if !bars.windows(2).all(|w| w[0].date < w[1].date) {
            debug!(ticker = %ticker, "provider rows not strictly ascending, sorting");
            // Stable sort keeps delivery order among equal dates
            bars.sort_by_key(|bar| bar.date);

            let before = bars.len();
            let mut deduped: Vec<PriceBar> = Vec::with_capacity(before);
            for bar in bars {
                match deduped.last_mut() {
                    Some(last) if last.date == bar.date => *last = bar,
                    _ => deduped.push(bar),
                }
            }
            if deduped.len() != before {
                warn!(
                    ticker = %ticker,
                    dropped = before - deduped.len(),
                    "duplicate dates in provider data, keeping the last row of each"
                );
            }
            bars = deduped;
        }

        Ok(Self { ticker, bars })
    }

    /// Build a series from a normalized provider frame
    ///
    /// The frame must have a single-level header and a `Date` column.
    /// Rows with a missing price are skipped; a missing volume counts as 0.
    pub fn from_frame(ticker: Ticker, frame: &RawFrame) -> Result<Self> {
        if !frame.is_normalized() {
            return Err(ForecastError::MalformedHeader(
                "frame must be normalized before reading prices".to_string(),
            ));
        }

        let dates = match frame.column(DATE) {
            Some(ColumnData::Dates(dates)) => dates,
            Some(ColumnData::Numbers(_)) => {
                return Err(ForecastError::MalformedHeader(format!(
                    "column '{}' does not hold dates",
                    DATE
                )))
            }
            None => {
                return Err(ForecastError::MalformedHeader(format!(
                    "missing '{}' column; found {:?}",
                    DATE,
                    frame.header().fields()
                )))
            }
        };

        let mut fields = Vec::with_capacity(PRICE_FIELDS.len());
        for name in PRICE_FIELDS {
            match frame.column(name) {
                Some(ColumnData::Numbers(values)) => fields.push(values),
                Some(ColumnData::Dates(_)) => {
                    return Err(ForecastError::MalformedHeader(format!(
                        "column '{}' is not numeric",
                        name
                    )))
                }
                None => {
                    return Err(ForecastError::MalformedHeader(format!(
                        "missing '{}' column; found {:?}",
                        name,
                        frame.header().fields()
                    )))
                }
            }
        }

        let mut bars = Vec::with_capacity(dates.len());
        let mut skipped = 0usize;
        for (row, &date) in dates.iter().enumerate() {
            let prices = (
                fields[0][row],
                fields[1][row],
                fields[2][row],
                fields[3][row],
                fields[4][row],
            );
            match prices {
                (Some(open), Some(high), Some(low), Some(close), Some(adj_close)) => {
                    bars.push(PriceBar {
                        date,
                        open,
                        high,
                        low,
                        close,
                        adj_close,
                        volume: fields[5][row].unwrap_or(0.0),
                    })
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(ticker = %ticker, skipped, "skipped rows with missing prices");
        }

        Self::from_bars(ticker, bars)
    }

    /// Ticker the series belongs to
    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// All bars, ascending by date
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Number of trading days
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// First trading day
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    /// Last trading day
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Trading dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Opening prices
    pub fn open_prices(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    /// Unadjusted closing prices
    pub fn close_prices(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Adjusted closing prices
    pub fn adj_close_prices(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.adj_close).collect()
    }
}

impl ToDataFrame for PriceSeries {
    fn to_dataframe(&self) -> Result<DataFrame> {
        let df = df!(
            DATE => self.dates(),
            OPEN => self.open_prices(),
            HIGH => self.bars.iter().map(|b| b.high).collect::<Vec<f64>>(),
            LOW => self.bars.iter().map(|b| b.low).collect::<Vec<f64>>(),
            CLOSE => self.close_prices(),
            ADJ_CLOSE => self.adj_close_prices(),
            VOLUME => self.bars.iter().map(|b| b.volume).collect::<Vec<f64>>(),
        )?;

        Ok(df)
    }
}

/// Two-column `(ds, y)` table the forecasting models consume
///
/// Selects `Date` and `Close` and renames them; values are not transformed.
pub fn project(series: &PriceSeries) -> Result<DataFrame> {
    let mut table = series.to_dataframe()?.select([DATE, CLOSE])?;
    table.rename(DATE, DS.into())?;
    table.rename(CLOSE, Y.into())?;

    Ok(table)
}
