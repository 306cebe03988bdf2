//! # Stock Dashboard
//!
//! `stock_dashboard` turns three inputs (a ticker, how many years of history
//! and a horizon in weeks) into a single HTML page with the raw price
//! chart, the forecast with its uncertainty band and the forecast's trend
//! and seasonal components.
//!
//! ## Example
//!
//! ```no_run
//! use chrono::Local;
//! use stock_dashboard::{DashboardConfig, InputCollector, InputEvent, Pipeline, Session};
//!
//! # fn main() -> stock_dashboard::Result<()> {
//! let config = DashboardConfig::default();
//! let inputs = InputCollector::new(Local::now().date_naive(), config.ticker_choices()?);
//! let pipeline = Pipeline::new(config.build_provider()?, config.build_model()?);
//!
//! let mut session = Session::new(inputs, pipeline, &config.output);
//! session.refresh()?;
//! session.handle(InputEvent::SetWeeks(12))?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod inputs;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod session;

pub use crate::config::DashboardConfig;
pub use crate::error::{DashboardError, Result};
pub use crate::inputs::{HorizonWeeks, InputCollector, InputEvent, RunRequest, Selection, TickerChoices};
pub use crate::pipeline::{DashboardView, Pipeline};
pub use crate::session::{RunOutcome, Session};
