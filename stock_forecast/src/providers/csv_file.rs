//! CSV export provider
//!
//! Reads `<dir>/<SYMBOL>.csv`. Two layouts are understood:
//!
//! ```text
//! Date,Open,High,Low,Close,Adj Close,Volume        one header row,
//! 2024-01-02,187.15,188.44,183.89,185.64,...       dates in a column
//!
//! Price,Adj Close,Close,High,Low,Open,Volume       field row,
//! Ticker,AAPL,AAPL,AAPL,AAPL,AAPL,AAPL             group row,
//! Date,,,,,,                                       index name row,
//! 2024-01-02,184.94,185.64,...                     dates as row labels
//! ```
//!
//! Header rows are told apart from data rows structurally: every leading
//! row whose first cell is not a calendar date belongs to the header.

use crate::frame::{ColumnData, HeaderShape, RawFrame, RowIndex};
use crate::providers::{DownloadRequest, MarketDataProvider, ProviderError};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Daily bars from a directory of CSV exports
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the exports are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }
}

impl MarketDataProvider for CsvProvider {
    fn download(&self, request: &DownloadRequest) -> Result<RawFrame, ProviderError> {
        let ticker = match request.symbols.as_slice() {
            [ticker] => ticker,
            symbols => {
                return Err(ProviderError::Validation(format!(
                    "CSV exports hold one symbol each, {} requested",
                    symbols.len()
                )))
            }
        };
        if request.start >= request.end {
            return Err(ProviderError::Validation(format!(
                "start {} must be before end {}",
                request.start, request.end
            )));
        }

        let path = self.path_for(ticker.as_str());
        debug!(%ticker, path = %path.display(), "reading CSV export");
        let file = File::open(&path)?;

        read_frame(file, request.start, request.end)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    // Timestamped exports carry a time after the calendar day
    let day = cell.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_number(cell: &str, line: usize) -> Result<Option<f64>, ProviderError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| ProviderError::Parse(format!("line {}: '{}' is not a number", line, cell)))
}

fn cells(record: &StringRecord, width: usize) -> Vec<String> {
    (0..width)
        .map(|i| record.get(i).unwrap_or("").to_string())
        .collect()
}

/// Read one CSV export, keeping rows dated within `[start, end)`
pub fn read_frame<R: Read>(
    reader: R,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<RawFrame, ProviderError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut header_rows: Vec<StringRecord> = Vec::new();
    let mut data_rows: Vec<StringRecord> = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let is_data = record.get(0).and_then(parse_date).is_some();
        if is_data {
            data_rows.push(record);
        } else if data_rows.is_empty() {
            header_rows.push(record);
        } else {
            return Err(ProviderError::Parse(format!(
                "row {} does not start with a date",
                header_rows.len() + data_rows.len() + 1
            )));
        }
    }

    let width = header_rows.iter().map(StringRecord::len).max().unwrap_or(0);
    if width < 2 {
        return Err(ProviderError::MalformedHeader(
            "export has no header with value columns".to_string(),
        ));
    }

    // The first column always holds the trading dates
    let first_line = header_rows.len() + 1;
    let mut dates = Vec::with_capacity(data_rows.len());
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(data_rows.len()); width - 1];
    for (offset, record) in data_rows.iter().enumerate() {
        let line = first_line + offset;
        let Some(date) = record.get(0).and_then(parse_date) else {
            continue;
        };
        if date < start || date >= end {
            continue;
        }
        dates.push(date);
        for (col, column) in values.iter_mut().enumerate() {
            column.push(parse_number(record.get(col + 1).unwrap_or(""), line)?);
        }
    }

    let value_columns = values.into_iter().map(ColumnData::Numbers);

    let frame = match header_rows.as_slice() {
        [fields] => {
            let fields = cells(fields, width);
            let mut columns = vec![ColumnData::Dates(dates)];
            columns.extend(value_columns);
            RawFrame::new(HeaderShape::Simple(fields), RowIndex::Positional, columns)
        }
        [fields, groups] => {
            let labels = cells(fields, width)
                .into_iter()
                .zip(cells(groups, width))
                .collect();
            let mut columns = vec![ColumnData::Dates(dates)];
            columns.extend(value_columns);
            RawFrame::new(HeaderShape::Compound(labels), RowIndex::Positional, columns)
        }
        [fields, groups, index_name] => {
            // A third row only names the row index; anything else is a third level
            if index_name.iter().skip(1).any(|cell| !cell.is_empty()) {
                return Err(ProviderError::MalformedHeader(
                    "header has more than two levels".to_string(),
                ));
            }
            let labels = cells(fields, width)
                .into_iter()
                .zip(cells(groups, width))
                .skip(1)
                .collect();
            RawFrame::new(
                HeaderShape::Compound(labels),
                RowIndex::Dates(dates),
                value_columns.collect(),
            )
        }
        [] => {
            return Err(ProviderError::MalformedHeader(
                "export has no header row".to_string(),
            ))
        }
        rows => {
            return Err(ProviderError::MalformedHeader(format!(
                "header has {} rows; at most two levels are supported",
                rows.len()
            )))
        }
    };

    frame.map_err(|e| ProviderError::MalformedHeader(e.to_string()))
}
