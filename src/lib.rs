//! # Stock Prediction
//!
//! Umbrella crate for the stock prediction workspace.
//!
//! - [`forecast`]: market data providers, header normalization, price series
//!   and the forecasting models
//! - [`dashboard`]: inputs, the load-and-forecast pipeline and the HTML page
//! - [`math`]: numeric kernels behind the additive model
//!
//! ## Example
//!
//! ```
//! use stock_prediction::dashboard::HorizonWeeks;
//! use stock_prediction::forecast::Ticker;
//!
//! let ticker = Ticker::new("btc-usd").unwrap();
//! assert_eq!(ticker.as_str(), "BTC-USD");
//! assert_eq!(HorizonWeeks::new(4).unwrap().days(), 28);
//! ```

pub use series_math as math;
pub use stock_dashboard as dashboard;
pub use stock_forecast as forecast;

pub use stock_dashboard::{DashboardConfig, DashboardError, Pipeline, Session};
pub use stock_forecast::{ForecastError, MarketDataLoader, PriceSeries, Ticker};
