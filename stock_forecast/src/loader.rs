//! Market data loading
//!
//! [`MarketDataLoader::load`] is the contract the dashboard relies on: ask a
//! provider for one ticker's daily bars, normalize whatever table comes back
//! and turn it into a sorted, validated [`PriceSeries`].

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::frame::normalize;
use crate::providers::{DownloadRequest, MarketDataProvider, ProviderError};
use crate::ticker::Ticker;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Loads normalized daily price series through a [`MarketDataProvider`]
#[derive(Debug, Clone)]
pub struct MarketDataLoader<P> {
    provider: P,
}

impl<P: MarketDataProvider> MarketDataLoader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Load daily bars for `ticker` within `[start, end)`
    ///
    /// Close prices are requested unadjusted so `Close` and `Adj Close`
    /// remain distinct columns.
    ///
    /// # Errors
    ///
    /// [`ForecastError::DataUnavailable`] when the window is empty or
    /// inverted, when the provider fails, or when no row survives
    /// validation. [`ForecastError::MalformedHeader`] when the provider's
    /// table cannot be flattened to one field name per column.
    pub fn load(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        if start >= end {
            return Err(ForecastError::unavailable(
                ticker.as_str(),
                format!("start date {} is not before end date {}", start, end),
            ));
        }

        let request = DownloadRequest::single(ticker.clone(), start, end);
        info!(
            %ticker,
            %start,
            %end,
            provider = self.provider.name(),
            "loading daily bars"
        );

        let raw = self.provider.download(&request).map_err(|e| match e {
            ProviderError::MalformedHeader(reason) => ForecastError::MalformedHeader(reason),
            other => {
                warn!(%ticker, error = %other, "provider request failed");
                ForecastError::unavailable(ticker.as_str(), other.to_string())
            }
        })?;

        if raw.is_empty() {
            return Err(ForecastError::unavailable(
                ticker.as_str(),
                "provider returned no rows",
            ));
        }

        debug!(
            %ticker,
            rows = raw.height(),
            compound = raw.header().is_compound(),
            "normalizing provider table"
        );
        let frame = normalize(raw)?;
        let series = PriceSeries::from_frame(ticker.clone(), &frame)?;

        info!(
            %ticker,
            rows = series.len(),
            first = ?series.first_date(),
            last = ?series.last_date(),
            "loaded price series"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{ColumnData, HeaderShape, RawFrame, RowIndex};

    struct StaticProvider(std::result::Result<RawFrame, fn() -> ProviderError>);

    impl MarketDataProvider for StaticProvider {
        fn download(&self, _request: &DownloadRequest) -> std::result::Result<RawFrame, ProviderError> {
            match &self.0 {
                Ok(frame) => Ok(frame.clone()),
                Err(make) => Err(make()),
            }
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn compound_frame(dates: Vec<NaiveDate>, closes: Vec<f64>) -> RawFrame {
        let fields = ["Adj Close", "Close", "High", "Low", "Open", "Volume"];
        let header = HeaderShape::Compound(
            fields
                .iter()
                .map(|f| (f.to_string(), "AAPL".to_string()))
                .collect(),
        );
        let columns = fields
            .iter()
            .map(|_| ColumnData::Numbers(closes.iter().copied().map(Some).collect()))
            .collect();
        RawFrame::new(header, RowIndex::Dates(dates), columns).unwrap()
    }

    #[test]
    fn test_load_compound_frame() {
        let loader = MarketDataLoader::new(StaticProvider(Ok(compound_frame(
            vec![day(2), day(3)],
            vec![1.0, 2.0],
        ))));
        let ticker = Ticker::new("AAPL").unwrap();

        let series = loader.load(&ticker, day(1), day(10)).unwrap();
        assert_eq!(series.dates(), vec![day(2), day(3)]);
        assert_eq!(series.close_prices(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_inverted_window_is_unavailable() {
        let loader = MarketDataLoader::new(StaticProvider(Ok(RawFrame::empty())));
        let ticker = Ticker::new("AAPL").unwrap();

        assert!(matches!(
            loader.load(&ticker, day(10), day(10)),
            Err(ForecastError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_empty_frame_is_unavailable() {
        let loader = MarketDataLoader::new(StaticProvider(Ok(RawFrame::empty())));
        let ticker = Ticker::new("NOPE").unwrap();

        match loader.load(&ticker, day(1), day(10)) {
            Err(ForecastError::DataUnavailable { ticker, .. }) => assert_eq!(ticker, "NOPE"),
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_errors_map_to_unavailable() {
        let loader = MarketDataLoader::new(StaticProvider(Err(|| {
            ProviderError::Api("Not Found".to_string())
        })));
        let ticker = Ticker::new("NOPE").unwrap();

        assert!(matches!(
            loader.load(&ticker, day(1), day(10)),
            Err(ForecastError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_provider_header_errors_stay_malformed() {
        let loader = MarketDataLoader::new(StaticProvider(Err(|| {
            ProviderError::MalformedHeader("three levels".to_string())
        })));
        let ticker = Ticker::new("AAPL").unwrap();

        assert!(matches!(
            loader.load(&ticker, day(1), day(10)),
            Err(ForecastError::MalformedHeader(_))
        ));
    }
}
