//! Dashboard inputs
//!
//! The three controls of the page: a start date among the last five
//! year-boundaries, a ticker from a fixed list and a forecast horizon in
//! weeks. Every control only offers valid values, so a [`Selection`] is
//! always runnable; raw user text is checked when it is turned into an
//! [`InputEvent`].

use crate::error::{DashboardError, Result};
use chrono::{Days, NaiveDate};
use stock_forecast::Ticker;
use tracing::debug;

/// Number of start dates offered
pub const START_OPTIONS: usize = 5;

/// Start dates `today − 365·i` for `i = 1..=5`
#[derive(Debug, Clone, PartialEq)]
pub struct StartDateOptions {
    dates: Vec<NaiveDate>,
}

impl StartDateOptions {
    pub fn new(today: NaiveDate) -> Self {
        let dates = (1..=START_OPTIONS as u64)
            .filter_map(|i| today.checked_sub_days(Days::new(365 * i)))
            .collect();
        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Labels as shown to the user, `YYYY-MM-DD`
    pub fn labels(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect()
    }

    /// Start date `years_back` years before today
    pub fn get(&self, years_back: usize) -> Result<NaiveDate> {
        years_back
            .checked_sub(1)
            .and_then(|i| self.dates.get(i))
            .copied()
            .ok_or_else(|| {
                DashboardError::InvalidSelection(format!(
                    "start must be 1 to {} years back, got {}",
                    self.dates.len(),
                    years_back
                ))
            })
    }
}

/// Forecast horizon in weeks, `1..=104`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HorizonWeeks(u32);

impl HorizonWeeks {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 104;

    pub fn new(weeks: u32) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&weeks) {
            return Err(DashboardError::InvalidSelection(format!(
                "horizon must be {} to {} weeks, got {}",
                Self::MIN,
                Self::MAX,
                weeks
            )));
        }
        Ok(Self(weeks))
    }

    pub fn weeks(&self) -> u32 {
        self.0
    }

    /// Horizon in calendar days
    pub fn days(&self) -> usize {
        self.0 as usize * 7
    }
}

impl Default for HorizonWeeks {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

/// Tickers the user can pick from
#[derive(Debug, Clone, PartialEq)]
pub struct TickerChoices {
    tickers: Vec<Ticker>,
}

impl TickerChoices {
    /// Create a choice list, dropping repeated symbols
    pub fn new(tickers: Vec<Ticker>) -> Result<Self> {
        let mut unique: Vec<Ticker> = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            if !unique.contains(&ticker) {
                unique.push(ticker);
            }
        }
        if unique.is_empty() {
            return Err(DashboardError::InvalidSelection(
                "at least one ticker must be offered".to_string(),
            ));
        }
        Ok(Self { tickers: unique })
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers.contains(ticker)
    }

    /// Look up an offered ticker by symbol, case-insensitively
    pub fn find(&self, symbol: &str) -> Result<Ticker> {
        let ticker = Ticker::new(symbol)
            .map_err(|e| DashboardError::InvalidSelection(e.to_string()))?;
        if !self.contains(&ticker) {
            let offered: Vec<&str> = self.tickers.iter().map(Ticker::as_str).collect();
            return Err(DashboardError::InvalidSelection(format!(
                "{} is not offered; choose one of {}",
                ticker,
                offered.join(", ")
            )));
        }
        Ok(ticker)
    }

    fn first(&self) -> Ticker {
        self.tickers[0].clone()
    }
}

impl Default for TickerChoices {
    fn default() -> Self {
        Self {
            tickers: Ticker::defaults(),
        }
    }
}

/// Current value of every control
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub ticker: Ticker,
    /// How many years back the history starts, `1..=5`
    pub years_back: usize,
    pub horizon: HorizonWeeks,
}

/// A change to one control
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    SelectTicker(String),
    SelectStart(usize),
    SetWeeks(u32),
}

/// Everything a pipeline run needs
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub ticker: Ticker,
    pub start: NaiveDate,
    /// Exclusive end of the history window
    pub end: NaiveDate,
    pub horizon: HorizonWeeks,
}

/// Holds the controls' state and turns it into run requests
#[derive(Debug, Clone)]
pub struct InputCollector {
    today: NaiveDate,
    tickers: TickerChoices,
    starts: StartDateOptions,
    selection: Selection,
}

impl InputCollector {
    /// Controls at their first option: first ticker, one year back, one week
    pub fn new(today: NaiveDate, tickers: TickerChoices) -> Self {
        let selection = Selection {
            ticker: tickers.first(),
            years_back: 1,
            horizon: HorizonWeeks::default(),
        };
        Self {
            today,
            tickers,
            starts: StartDateOptions::new(today),
            selection,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn tickers(&self) -> &TickerChoices {
        &self.tickers
    }

    pub fn start_options(&self) -> &StartDateOptions {
        &self.starts
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Apply one change; returns whether the selection changed
    ///
    /// An invalid value leaves the selection untouched.
    pub fn apply(&mut self, event: InputEvent) -> Result<bool> {
        let mut next = self.selection.clone();
        match event {
            InputEvent::SelectTicker(symbol) => next.ticker = self.tickers.find(&symbol)?,
            InputEvent::SelectStart(years_back) => {
                self.starts.get(years_back)?;
                next.years_back = years_back;
            }
            InputEvent::SetWeeks(weeks) => next.horizon = HorizonWeeks::new(weeks)?,
        }

        let changed = next != self.selection;
        if changed {
            debug!(?next, "selection changed");
            self.selection = next;
        }
        Ok(changed)
    }

    /// The run described by the current selection
    pub fn resolve(&self) -> Result<RunRequest> {
        Ok(RunRequest {
            ticker: self.selection.ticker.clone(),
            start: self.starts.get(self.selection.years_back)?,
            end: self.today,
            horizon: self.selection.horizon,
        })
    }
}
