//! Command line arguments and interactive commands

use crate::error::{DashboardError, Result};
use crate::inputs::{HorizonWeeks, InputEvent, START_OPTIONS};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Stock prediction dashboard")]
pub struct Args {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ticker symbol to forecast
    #[arg(long, value_name = "SYMBOL")]
    pub ticker: Option<String>,

    /// Years of history to load
    #[arg(long, value_name = "YEARS", value_parser = clap::value_parser!(u8).range(1..=START_OPTIONS as i64))]
    pub start: Option<u8>,

    /// Forecast horizon in weeks
    #[arg(
        long,
        value_name = "WEEKS",
        value_parser = clap::value_parser!(u32).range(HorizonWeeks::MIN as i64..=HorizonWeeks::MAX as i64)
    )]
    pub weeks: Option<u32>,

    /// Where to write the HTML page
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep reading input changes from stdin
    #[arg(long)]
    pub interactive: bool,
}

impl Args {
    /// Input changes requested by flags, in control order
    pub fn events(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if let Some(years) = self.start {
            events.push(InputEvent::SelectStart(years as usize));
        }
        if let Some(ticker) = &self.ticker {
            events.push(InputEvent::SelectTicker(ticker.clone()));
        }
        if let Some(weeks) = self.weeks {
            events.push(InputEvent::SetWeeks(weeks));
        }
        events
    }
}

/// One line typed in interactive mode
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(InputEvent),
    /// Re-run with the current selection
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "commands:
  ticker <SYMBOL>   select a ticker
  start <1..5>      history starts this many years back
  weeks <1..104>    forecast horizon
  show              re-run with the current selection
  help              this text
  quit              leave";

/// Parse an interactive command line
pub fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or("").to_ascii_lowercase();
    let argument = words.next();
    if words.next().is_some() {
        return Err(DashboardError::InvalidSelection(format!(
            "too many arguments in '{}'",
            line.trim()
        )));
    }

    let number = |name: &str| -> Result<u32> {
        argument
            .ok_or_else(|| DashboardError::InvalidSelection(format!("{} needs a number", name)))?
            .parse::<u32>()
            .map_err(|_| DashboardError::InvalidSelection(format!("{} needs a number", name)))
    };

    match (command.as_str(), argument) {
        ("ticker", Some(symbol)) => Ok(Command::Input(InputEvent::SelectTicker(symbol.to_string()))),
        ("ticker", None) => Err(DashboardError::InvalidSelection(
            "ticker needs a symbol".to_string(),
        )),
        ("start", _) => Ok(Command::Input(InputEvent::SelectStart(number("start")? as usize))),
        ("weeks", _) => Ok(Command::Input(InputEvent::SetWeeks(number("weeks")?))),
        ("show", None) => Ok(Command::Show),
        ("help", None) | ("?", None) => Ok(Command::Help),
        ("quit", None) | ("exit", None) => Ok(Command::Quit),
        _ => Err(DashboardError::InvalidSelection(format!(
            "unknown command '{}'; type 'help'",
            line.trim()
        ))),
    }
}
