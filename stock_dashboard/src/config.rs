//! Dashboard configuration
//!
//! Read from a TOML file. Every key is optional:
//!
//! ```toml
//! tickers = ["AAPL", "MSFT", "BTC-USD"]
//! output = "dashboard.html"
//!
//! [provider]
//! kind = "csv"            # or "yahoo"
//! csv_dir = "data"
//! timeout_secs = 30
//!
//! [model]
//! changepoint_prior_scale = 0.1
//! uncertainty_samples = 500
//! seed = 7
//! ```

use crate::error::{DashboardError, Result};
use crate::inputs::TickerChoices;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stock_forecast::models::additive::{AdditiveConfig, AdditiveModel};
use stock_forecast::providers::yahoo::DEFAULT_BASE_URL;
use stock_forecast::providers::{CsvProvider, MarketDataProvider, YahooOptions, YahooProvider};
use stock_forecast::Ticker;
use tracing::info;

/// Environment variable naming a config file when `--config` is not given
pub const CONFIG_ENV_VAR: &str = "STOCK_DASHBOARD_CONFIG";

/// Which market data source to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

/// `[provider]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    /// Directory of `<SYMBOL>.csv` exports for the `csv` provider
    pub csv_dir: PathBuf,
    /// Request timeout; no timeout when unset
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            base_url: DEFAULT_BASE_URL.to_string(),
            csv_dir: PathBuf::from("data"),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

/// Complete dashboard configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub provider: ProviderConfig,
    pub model: AdditiveConfig,
    /// Offered tickers; the built-in list when empty
    pub tickers: Vec<String>,
    /// Where the page is written
    pub output: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            model: AdditiveConfig::default(),
            tickers: Vec::new(),
            output: PathBuf::from("stock_dashboard.html"),
        }
    }
}

impl DashboardConfig {
    /// Parse a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Load from `path`, else from the file named by [`CONFIG_ENV_VAR`], else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        match path {
            Some(path) => {
                info!(path = %path.display(), "reading configuration");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Tickers offered by the ticker control
    pub fn ticker_choices(&self) -> Result<TickerChoices> {
        if self.tickers.is_empty() {
            return Ok(TickerChoices::default());
        }
        let tickers = self
            .tickers
            .iter()
            .map(|s| Ticker::new(s).map_err(|e| DashboardError::Config(e.to_string())))
            .collect::<Result<Vec<_>>>()?;
        TickerChoices::new(tickers)
    }

    /// The configured market data source
    pub fn build_provider(&self) -> Result<Box<dyn MarketDataProvider>> {
        match self.provider.kind {
            ProviderKind::Yahoo => {
                let mut options = YahooOptions {
                    base_url: self.provider.base_url.clone(),
                    timeout: self.provider.timeout_secs.map(Duration::from_secs),
                    ..YahooOptions::default()
                };
                if let Some(agent) = &self.provider.user_agent {
                    options.user_agent = agent.clone();
                }
                let provider = YahooProvider::new(options)
                    .map_err(|e| DashboardError::Config(e.to_string()))?;
                Ok(Box::new(provider))
            }
            ProviderKind::Csv => Ok(Box::new(CsvProvider::new(&self.provider.csv_dir))),
        }
    }

    /// The configured forecaster
    pub fn build_model(&self) -> Result<AdditiveModel> {
        Ok(AdditiveModel::new(self.model.clone())?)
    }
}
