//! Reactive dashboard session
//!
//! Every accepted input change re-runs the whole pipeline and rewrites the
//! page. Runs happen one at a time and nothing is cached between them.

use crate::error::{DashboardError, Result};
use crate::inputs::{InputCollector, InputEvent};
use crate::pipeline::Pipeline;
use crate::render::{failure_page, success_page};
use std::path::{Path, PathBuf};
use stock_forecast::models::ForecastModel;
use stock_forecast::providers::MarketDataProvider;
use stock_forecast::Ticker;
use tracing::{error, info};

/// Result of one run, after the page was written
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Rendered {
        ticker: Ticker,
        history_rows: usize,
        forecast_rows: usize,
        page: PathBuf,
    },
    Failed {
        ticker: Ticker,
        message: String,
        page: PathBuf,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Rendered { .. })
    }

    pub fn page(&self) -> &Path {
        match self {
            RunOutcome::Rendered { page, .. } | RunOutcome::Failed { page, .. } => page,
        }
    }
}

/// Input state plus the pipeline it drives
pub struct Session<P, M> {
    inputs: InputCollector,
    pipeline: Pipeline<P, M>,
    output: PathBuf,
}

impl<P, M> Session<P, M>
where
    P: MarketDataProvider,
    M: ForecastModel,
{
    pub fn new(inputs: InputCollector, pipeline: Pipeline<P, M>, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            pipeline,
            output: output.into(),
        }
    }

    pub fn inputs(&self) -> &InputCollector {
        &self.inputs
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Apply an input change and re-run if it changed anything
    ///
    /// Returns `None` when the selection stayed the same. An invalid input
    /// is an error and triggers no run.
    pub fn handle(&mut self, event: InputEvent) -> Result<Option<RunOutcome>> {
        if self.inputs.apply(event)? {
            self.refresh().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Run the pipeline for the current selection and write the page
    ///
    /// A failing run still writes a page, showing only the error; the
    /// returned error is reserved for failing to write it.
    pub fn refresh(&mut self) -> Result<RunOutcome> {
        let request = self.inputs.resolve()?;
        let ticker = request.ticker.clone();

        let (html, outcome) = match self
            .pipeline
            .run(&request)
            .and_then(|view| Ok((success_page(&self.inputs, &view)?, view)))
        {
            Ok((html, view)) => {
                info!(%ticker, path = %self.output.display(), "dashboard updated");
                let outcome = RunOutcome::Rendered {
                    ticker,
                    history_rows: view.series.len(),
                    forecast_rows: view.forecast.len(),
                    page: self.output.clone(),
                };
                (html, outcome)
            }
            Err(e) => {
                error!(%ticker, error = %e, "dashboard run failed");
                let outcome = RunOutcome::Failed {
                    ticker,
                    message: e.to_string(),
                    page: self.output.clone(),
                };
                (failure_page(&self.inputs, &e), outcome)
            }
        };

        std::fs::write(&self.output, html).map_err(|e| {
            DashboardError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot write {}: {}", self.output.display(), e),
            ))
        })?;
        Ok(outcome)
    }
}
