//! Yahoo Finance chart API provider
//!
//! Downloads daily bars from the v8 chart endpoint and lays them out the way
//! multi-symbol downloads are usually tabulated: dates as the row index and
//! a `(field, symbol)` column header with fields in alphabetical order.

use crate::frame::{ColumnData, HeaderShape, RawFrame, RowIndex};
use crate::providers::{Adjustment, DownloadRequest, MarketDataProvider, ProviderError};
use crate::ticker::Ticker;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Column order of a download, per adjustment policy
const RAW_FIELDS: [&str; 6] = ["Adj Close", "Close", "High", "Low", "Open", "Volume"];
const ADJUSTED_FIELDS: [&str; 5] = ["Close", "High", "Low", "Open", "Volume"];

/// Connection settings for [`YahooProvider`]
#[derive(Debug, Clone)]
pub struct YahooOptions {
    /// Chart endpoint; symbols are appended as a path segment
    pub base_url: String,
    pub user_agent: String,
    /// Request timeout; `None` keeps the HTTP client's default
    pub timeout: Option<Duration>,
    /// Emit a `(field, symbol)` header even for a single symbol
    pub multi_level_index: bool,
}

impl Default for YahooOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            multi_level_index: true,
        }
    }
}

/// One daily bar as reported by the chart API
#[derive(Debug, Clone, PartialEq)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

impl DailyQuote {
    /// Value of a named output field under the given adjustment policy
    fn field(&self, name: &str, adjustment: Adjustment) -> Option<f64> {
        let factor = match adjustment {
            Adjustment::Raw => Some(1.0),
            Adjustment::Auto => match (self.adj_close, self.close) {
                (Some(adj), Some(close)) if close != 0.0 => Some(adj / close),
                _ => None,
            },
        };

        match name {
            "Adj Close" => self.adj_close,
            "Close" => self.close.zip(factor).map(|(v, f)| v * f),
            "High" => self.high.zip(factor).map(|(v, f)| v * f),
            "Low" => self.low.zip(factor).map(|(v, f)| v * f),
            "Open" => self.open.zip(factor).map(|(v, f)| v * f),
            "Volume" => self.volume,
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Parse a chart API payload into daily quotes
///
/// Timestamps are shifted by the exchange's UTC offset before taking the
/// calendar day, so a bar always lands on its local trading date.
pub fn parse_chart(json: &str) -> Result<Vec<DailyQuote>, ProviderError> {
    let response: ChartResponse =
        serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(ProviderError::Api(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let offset = data.meta.map(|m| m.gmtoffset).unwrap_or(0);
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let at = |values: &Vec<Option<f64>>, i: usize| values.get(i).copied().flatten();

    let mut quotes = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| ProviderError::Parse(format!("timestamp {} out of range", ts)))?
            .date_naive();

        quotes.push(DailyQuote {
            date,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close: at(&quote.close, i),
            adj_close: at(&adjclose, i),
            volume: at(&quote.volume, i),
        });
    }

    Ok(quotes)
}

/// Lay out per-symbol quotes as one table indexed by date
///
/// Dates are the union over all symbols; a symbol without a bar on a date
/// gets empty cells. A single symbol yields a flat header unless
/// `multi_level_index` is set.
pub fn assemble_frame(
    quotes: &[(Ticker, Vec<DailyQuote>)],
    adjustment: Adjustment,
    multi_level_index: bool,
) -> Result<RawFrame, ProviderError> {
    let fields: &[&str] = match adjustment {
        Adjustment::Raw => &RAW_FIELDS,
        Adjustment::Auto => &ADJUSTED_FIELDS,
    };

    let dates: BTreeSet<NaiveDate> = quotes
        .iter()
        .flat_map(|(_, q)| q.iter().map(|bar| bar.date))
        .collect();
    let by_date: Vec<BTreeMap<NaiveDate, &DailyQuote>> = quotes
        .iter()
        .map(|(_, q)| q.iter().map(|bar| (bar.date, bar)).collect())
        .collect();

    let mut labels = Vec::with_capacity(fields.len() * quotes.len());
    let mut columns = Vec::with_capacity(fields.len() * quotes.len());
    for field in fields {
        for ((ticker, _), bars) in quotes.iter().zip(&by_date) {
            labels.push((field.to_string(), ticker.to_string()));
            columns.push(ColumnData::Numbers(
                dates
                    .iter()
                    .map(|d| bars.get(d).and_then(|bar| bar.field(field, adjustment)))
                    .collect(),
            ));
        }
    }

    let header = if multi_level_index || quotes.len() != 1 {
        HeaderShape::Compound(labels)
    } else {
        HeaderShape::Simple(labels.into_iter().map(|(field, _)| field).collect())
    };

    RawFrame::new(header, RowIndex::Dates(dates.into_iter().collect()), columns)
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Daily bars from the Yahoo Finance chart API
#[derive(Debug)]
pub struct YahooProvider {
    client: Client,
    base_url: String,
    multi_level_index: bool,
}

impl YahooProvider {
    /// Create a provider with a blocking HTTP client
    pub fn new(options: YahooOptions) -> Result<Self, ProviderError> {
        let mut builder = Client::builder().user_agent(options.user_agent);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            multi_level_index: options.multi_level_index,
        })
    }

    /// Unix seconds at midnight UTC of `date`
    fn epoch_seconds(date: NaiveDate) -> i64 {
        date.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    fn fetch_symbol(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyQuote>, ProviderError> {
        let url = format!("{}/{}", self.base_url, ticker);
        let query = [
            ("period1", Self::epoch_seconds(start).to_string()),
            ("period2", Self::epoch_seconds(end).to_string()),
            ("interval", "1d".to_string()),
            ("events", "div,splits".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];

        debug!(%ticker, %url, "requesting chart");
        let response = self.client.get(&url).query(&query).send()?;
        let status = response.status();
        let body = response.text()?;

        match parse_chart(&body) {
            Ok(quotes) if status.is_success() => Ok(quotes),
            Ok(_) => Err(ProviderError::Api(format!("HTTP {}", status))),
            Err(ProviderError::Parse(_)) if !status.is_success() => {
                Err(ProviderError::Api(format!("HTTP {}", status)))
            }
            Err(e) => Err(e),
        }
    }
}

impl MarketDataProvider for YahooProvider {
    fn download(&self, request: &DownloadRequest) -> Result<RawFrame, ProviderError> {
        if request.symbols.is_empty() {
            return Err(ProviderError::Validation(
                "at least one symbol is required".to_string(),
            ));
        }
        if request.start >= request.end {
            return Err(ProviderError::Validation(format!(
                "start {} must be before end {}",
                request.start, request.end
            )));
        }

        let mut fetched = Vec::with_capacity(request.symbols.len());
        let mut last_error = None;
        for ticker in &request.symbols {
            match self.fetch_symbol(ticker, request.start, request.end) {
                Ok(quotes) => {
                    info!(%ticker, rows = quotes.len(), "downloaded daily bars");
                    // Bars dated on or after the exclusive end are dropped
                    let quotes = quotes
                        .into_iter()
                        .filter(|q| q.date >= request.start && q.date < request.end)
                        .collect();
                    fetched.push((ticker.clone(), quotes));
                }
                Err(e) => {
                    warn!(%ticker, error = %e, "download failed");
                    last_error = Some(e);
                }
            }
        }

        if fetched.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        assemble_frame(&fetched, request.adjustment, self.multi_level_index)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "gmtoffset": -18000},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open": [187.15, 184.22, null],
                        "high": [188.44, 185.88, 183.09],
                        "low": [183.89, 183.43, 180.88],
                        "close": [185.64, 184.25, 181.91],
                        "volume": [82488700, 58414500, 71983600]
                    }],
                    "adjclose": [{"adjclose": [184.94, 183.56, 181.23]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_uses_exchange_dates() {
        let quotes = parse_chart(SAMPLE).unwrap();

        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(quotes[2].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(quotes[0].close, Some(185.64));
        assert_eq!(quotes[0].adj_close, Some(184.94));
        assert_eq!(quotes[2].open, None);
    }

    #[test]
    fn test_parse_chart_reports_api_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        match parse_chart(body) {
            Err(ProviderError::Api(message)) => assert!(message.contains("Not Found")),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_chart_without_bars() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart(body).unwrap().is_empty());
    }

    #[test]
    fn test_assemble_single_symbol_compound_header() {
        let quotes = parse_chart(SAMPLE).unwrap();
        let ticker = Ticker::new("AAPL").unwrap();
        let frame = assemble_frame(&[(ticker, quotes)], Adjustment::Raw, true).unwrap();

        match frame.header() {
            HeaderShape::Compound(labels) => {
                assert_eq!(labels.len(), 6);
                assert_eq!(labels[0], ("Adj Close".to_string(), "AAPL".to_string()));
                assert_eq!(labels[5], ("Volume".to_string(), "AAPL".to_string()));
            }
            other => panic!("expected compound header, got {:?}", other),
        }
        assert!(matches!(frame.index(), RowIndex::Dates(d) if d.len() == 3));
    }

    #[test]
    fn test_assemble_flat_header_on_request() {
        let quotes = parse_chart(SAMPLE).unwrap();
        let ticker = Ticker::new("AAPL").unwrap();
        let frame = assemble_frame(&[(ticker, quotes)], Adjustment::Raw, false).unwrap();

        assert!(!frame.header().is_compound());
        assert_eq!(
            frame.header().fields(),
            vec!["Adj Close", "Close", "High", "Low", "Open", "Volume"]
        );
    }

    #[test]
    fn test_assemble_auto_adjustment_rescales_prices() {
        let quotes = parse_chart(SAMPLE).unwrap();
        let ticker = Ticker::new("AAPL").unwrap();
        let frame = assemble_frame(&[(ticker, quotes)], Adjustment::Auto, false).unwrap();

        assert_eq!(
            frame.header().fields(),
            vec!["Close", "High", "Low", "Open", "Volume"]
        );
        match frame.column("Close") {
            Some(ColumnData::Numbers(values)) => {
                let close = values[0].unwrap();
                assert!((close - 184.94).abs() < 1e-9);
            }
            other => panic!("unexpected close column {:?}", other),
        }
    }

    #[test]
    fn test_assemble_aligns_symbols_on_union_of_dates() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let quote = |d, close| DailyQuote {
            date: day(d),
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
            adj_close: Some(close),
            volume: Some(1.0),
        };
        let quotes = vec![
            (Ticker::new("AAPL").unwrap(), vec![quote(2, 1.0), quote(3, 2.0)]),
            (Ticker::new("BTC-USD").unwrap(), vec![quote(2, 10.0), quote(6, 11.0)]),
        ];

        let frame = assemble_frame(&quotes, Adjustment::Raw, false).unwrap();

        assert!(frame.header().is_compound());
        assert_eq!(frame.height(), 3);
        assert_eq!(
            frame.columns()[0],
            ColumnData::Numbers(vec![Some(1.0), Some(2.0), None])
        );
    }

    #[test]
    fn test_epoch_seconds() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(YahooProvider::epoch_seconds(date), 1_704_067_200);
    }

    #[test]
    #[ignore]
    fn test_download_live() {
        let provider = YahooProvider::new(YahooOptions::default()).unwrap();
        let request = DownloadRequest::single(
            Ticker::new("AAPL").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        let frame = provider.download(&request).unwrap();
        assert!(frame.height() > 15);
    }
}
