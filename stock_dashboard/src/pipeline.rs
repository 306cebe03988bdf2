//! One dashboard run: load, project, fit, predict
//!
//! Stages run in a fixed order with no retries. The first failing stage
//! ends the run and nothing after it is computed.

use crate::error::Result;
use crate::inputs::RunRequest;
use polars::prelude::DataFrame;
use stock_forecast::data::{project, ToDataFrame};
use stock_forecast::models::{ForecastModel, ForecastTable, SeasonalProfile, TrainedForecastModel};
use stock_forecast::providers::MarketDataProvider;
use stock_forecast::{MarketDataLoader, PriceSeries};
use tracing::info;

/// Rows shown in the table previews
pub const PREVIEW_ROWS: usize = 5;

/// Everything the page shows after a successful run
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub request: RunRequest,
    pub series: PriceSeries,
    /// First rows of the normalized price table
    pub raw_preview: DataFrame,
    pub forecast: ForecastTable,
    /// Last rows of the forecast table
    pub forecast_preview: DataFrame,
    pub profiles: Vec<SeasonalProfile>,
    pub model_name: String,
}

/// Loader and forecaster wired together
#[derive(Debug)]
pub struct Pipeline<P, M> {
    loader: MarketDataLoader<P>,
    model: M,
}

impl<P, M> Pipeline<P, M>
where
    P: MarketDataProvider,
    M: ForecastModel,
{
    pub fn new(provider: P, model: M) -> Self {
        Self {
            loader: MarketDataLoader::new(provider),
            model,
        }
    }

    pub fn loader(&self) -> &MarketDataLoader<P> {
        &self.loader
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run every stage for one request
    pub fn run(&self, request: &RunRequest) -> Result<DashboardView> {
        let series = self
            .loader
            .load(&request.ticker, request.start, request.end)?;
        let raw_preview = series.to_dataframe()?.head(Some(PREVIEW_ROWS));

        let history = project(&series)?;
        info!(
            ticker = %request.ticker,
            model = self.model.name(),
            rows = history.height(),
            "fitting forecast model"
        );
        let trained = self.model.fit(&history)?;

        let periods = request.horizon.days();
        let forecast = trained.predict(periods)?;
        let forecast_preview = forecast.to_dataframe()?.tail(Some(PREVIEW_ROWS));
        let profiles = trained
            .seasonalities()
            .iter()
            .filter_map(|name| trained.seasonal_profile(name))
            .collect();

        info!(
            ticker = %request.ticker,
            periods,
            rows = forecast.len(),
            "forecast ready"
        );

        Ok(DashboardView {
            request: request.clone(),
            series,
            raw_preview,
            forecast,
            forecast_preview,
            profiles,
            model_name: trained.name().to_string(),
        })
    }
}
