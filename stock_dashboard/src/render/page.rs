//! The single dashboard page
//!
//! A self-contained HTML document: the current control values, then either
//! every section of a successful run or only the error of a failed one.

use crate::error::{DashboardError, Result};
use crate::inputs::{HorizonWeeks, InputCollector};
use crate::pipeline::DashboardView;
use crate::render::forecast::{components_chart, forecast_chart, COMPONENTS_TITLE, FORECAST_TITLE};
use crate::render::series::series_chart;
use crate::render::table::{escape, html_table};

pub const PAGE_TITLE: &str = "Stock Prediction App";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = "body { font-family: sans-serif; margin: 2rem auto; max-width: 1100px; }
table.preview { border-collapse: collapse; font-size: 0.85rem; }
table.preview th, table.preview td { border: 1px solid #ddd; padding: 0.25rem 0.5rem; text-align: right; }
.controls dt { font-weight: bold; }
.error { background: #fde8e8; border: 1px solid #f5a3a3; padding: 1rem; }";

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <script src=\"{cdn}\"></script>\n<style>\n{style}\n</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = PAGE_TITLE,
        cdn = PLOTLY_CDN,
        style = STYLE,
        body = body
    )
}

fn options(labels: &[String], selected: usize) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let marker = if i == selected { " selected" } else { "" };
            format!("<option{}>{}</option>", marker, escape(label))
        })
        .collect()
}

/// Current value and choices of every control
fn controls(inputs: &InputCollector) -> String {
    let selection = inputs.selection();
    let tickers: Vec<String> = inputs
        .tickers()
        .tickers()
        .iter()
        .map(|t| t.to_string())
        .collect();
    let ticker_index = inputs
        .tickers()
        .tickers()
        .iter()
        .position(|t| t == &selection.ticker)
        .unwrap_or(0);

    format!(
        "<dl class=\"controls\">\n\
         <dt>Select a start date</dt><dd><select disabled>{starts}</select></dd>\n\
         <dt>Select company for prediction</dt><dd><select disabled>{tickers}</select></dd>\n\
         <dt>Weeks of forecasting:</dt><dd><input type=\"range\" min=\"{min}\" max=\"{max}\" value=\"{weeks}\" disabled> {weeks}</dd>\n\
         </dl>",
        starts = options(&inputs.start_options().labels(), selection.years_back.saturating_sub(1)),
        tickers = options(&tickers, ticker_index),
        min = HorizonWeeks::MIN,
        max = HorizonWeeks::MAX,
        weeks = selection.horizon.weeks()
    )
}

/// Page for a completed run
pub fn success_page(inputs: &InputCollector, view: &DashboardView) -> Result<String> {
    let raw = series_chart(&view.series).to_inline_html(Some("raw-data"));
    let forecast = forecast_chart(&view.series, &view.forecast)?.to_inline_html(Some("forecast"));
    let components =
        components_chart(&view.forecast, &view.profiles)?.to_inline_html(Some("components"));

    let body = format!(
        "{controls}\n<p>Loading data... done!</p>\n\
         <h3>Data after cleaning headers:</h3>\n{raw_table}\n{raw}\n\
         <h2>Forecast data</h2>\n{forecast_table}\n\
         <h2>{forecast_title}</h2>\n{forecast}\n\
         <h2>{components_title}</h2>\n{components}",
        controls = controls(inputs),
        raw_table = html_table(&view.raw_preview)?,
        raw = raw,
        forecast_table = html_table(&view.forecast_preview)?,
        forecast_title = FORECAST_TITLE,
        forecast = forecast,
        components_title = COMPONENTS_TITLE,
        components = components,
    );

    Ok(document(&body))
}

/// Page for a failed run: the controls and the error, no charts
pub fn failure_page(inputs: &InputCollector, error: &DashboardError) -> String {
    let body = format!(
        "{controls}\n<div class=\"error\"><strong>Could not build the forecast for {ticker}.</strong>\
         <p>{message}</p></div>",
        controls = controls(inputs),
        ticker = escape(inputs.selection().ticker.as_str()),
        message = escape(&error.to_string()),
    );
    document(&body)
}
