//! Forecast and component charts

use crate::error::{DashboardError, Result};
use plotly::common::{Fill, Line, Marker, Mode, Title};
use plotly::layout::{Axis, GridPattern, Layout, LayoutGrid, RangeSlider};
use plotly::{Plot, Scatter};
use stock_forecast::models::{ForecastTable, SeasonalProfile};
use stock_forecast::{ForecastError, PriceSeries};

pub const FORECAST_TITLE: &str = "Forecast plot";
pub const COMPONENTS_TITLE: &str = "Forecast components";

const FORECAST_COLOR: &str = "#0072B2";
const BAND_COLOR: &str = "rgba(0, 114, 178, 0.2)";
const OBSERVED_COLOR: &str = "black";

fn date_labels(table: &ForecastTable) -> Vec<String> {
    table.dates().iter().map(|d| d.to_string()).collect()
}

fn require_rows(table: &ForecastTable) -> Result<()> {
    if table.is_empty() {
        return Err(ForecastError::DataError("forecast table has no rows".to_string()).into());
    }
    Ok(())
}

/// Observed closes, the point forecast and its uncertainty band
pub fn forecast_chart(series: &PriceSeries, table: &ForecastTable) -> Result<Plot> {
    require_rows(table)?;
    let ds = date_labels(table);

    let observed = Scatter::new(
        series.dates().iter().map(|d| d.to_string()).collect(),
        series.close_prices(),
    )
    .name("Actual")
    .mode(Mode::Markers)
    .marker(Marker::new().color(OBSERVED_COLOR).size(4));

    // The band is drawn by filling from each trace down to the previous one
    let lower = Scatter::new(ds.clone(), table.yhat_lower())
        .name("Lower bound")
        .mode(Mode::Lines)
        .line(Line::new().width(0.0))
        .show_legend(false);
    let predicted = Scatter::new(ds.clone(), table.yhat())
        .name("Predicted")
        .mode(Mode::Lines)
        .line(Line::new().color(FORECAST_COLOR).width(2.0))
        .fill(Fill::ToNextY)
        .fill_color(BAND_COLOR);
    let upper = Scatter::new(ds, table.yhat_upper())
        .name("Upper bound")
        .mode(Mode::Lines)
        .line(Line::new().width(0.0))
        .fill(Fill::ToNextY)
        .fill_color(BAND_COLOR)
        .show_legend(false);

    let layout = Layout::new()
        .title(Title::with_text(FORECAST_TITLE))
        .x_axis(
            Axis::new()
                .title(Title::with_text("ds"))
                .range_slider(RangeSlider::new().visible(true)),
        )
        .y_axis(Axis::new().title(Title::with_text("y")))
        .height(600);

    let mut plot = Plot::new();
    plot.add_trace(observed);
    plot.add_trace(lower);
    plot.add_trace(predicted);
    plot.add_trace(upper);
    plot.set_layout(layout);
    Ok(plot)
}

/// Axis ids of the `row`-th stacked subplot, counting from 1
fn axis_ids(row: usize) -> (String, String) {
    if row == 1 {
        ("x".to_string(), "y".to_string())
    } else {
        (format!("x{}", row), format!("y{}", row))
    }
}

fn with_axes(layout: Layout, row: usize, x_title: &str, y_title: &str) -> Result<Layout> {
    let x = Axis::new().title(Title::with_text(x_title));
    let y = Axis::new().title(Title::with_text(y_title));
    Ok(match row {
        1 => layout.x_axis(x).y_axis(y),
        2 => layout.x_axis2(x).y_axis2(y),
        3 => layout.x_axis3(x).y_axis3(y),
        4 => layout.x_axis4(x).y_axis4(y),
        _ => {
            return Err(DashboardError::Render(format!(
                "no axis for component row {}",
                row
            )))
        }
    })
}

/// Trend with its band, then one subplot per seasonal profile
pub fn components_chart(table: &ForecastTable, profiles: &[SeasonalProfile]) -> Result<Plot> {
    require_rows(table)?;
    let ds = date_labels(table);
    let rows = 1 + profiles.len();

    let mut plot = Plot::new();
    let trend_lower: Vec<f64> = table.rows().iter().map(|r| r.trend_lower).collect();
    let trend_upper: Vec<f64> = table.rows().iter().map(|r| r.trend_upper).collect();
    plot.add_trace(
        Scatter::new(ds.clone(), trend_lower)
            .mode(Mode::Lines)
            .line(Line::new().width(0.0))
            .show_legend(false),
    );
    plot.add_trace(
        Scatter::new(ds.clone(), table.trend())
            .name("trend")
            .mode(Mode::Lines)
            .line(Line::new().color(FORECAST_COLOR).width(2.0))
            .fill(Fill::ToNextY)
            .fill_color(BAND_COLOR),
    );
    plot.add_trace(
        Scatter::new(ds, trend_upper)
            .mode(Mode::Lines)
            .line(Line::new().width(0.0))
            .fill(Fill::ToNextY)
            .fill_color(BAND_COLOR)
            .show_legend(false),
    );

    let mut layout = Layout::new()
        .title(Title::with_text(COMPONENTS_TITLE))
        .grid(
            LayoutGrid::new()
                .rows(rows)
                .columns(1)
                .pattern(GridPattern::Independent),
        )
        .show_legend(false)
        .height(300 * rows);
    layout = with_axes(layout, 1, "ds", "trend")?;

    for (i, profile) in profiles.iter().enumerate() {
        let row = i + 2;
        let (x_id, y_id) = axis_ids(row);
        plot.add_trace(
            Scatter::new(profile.labels.clone(), profile.values.clone())
                .name(profile.name.as_str())
                .mode(Mode::Lines)
                .line(Line::new().color(FORECAST_COLOR).width(2.0))
                .x_axis(&x_id)
                .y_axis(&y_id),
        );
        let x_title = if profile.labels.len() <= 7 {
            "Day of week"
        } else {
            "Day of year"
        };
        layout = with_axes(layout, row, x_title, &profile.name)?;
    }

    plot.set_layout(layout);
    Ok(plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stock_forecast::models::ForecastRow;
    use stock_forecast::{PriceBar, Ticker};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn table() -> ForecastTable {
        let rows = (1..=10)
            .map(|d| ForecastRow {
                ds: day(d),
                yhat: d as f64,
                yhat_lower: d as f64 - 1.0,
                yhat_upper: d as f64 + 1.0,
                trend: d as f64,
                trend_lower: d as f64,
                trend_upper: d as f64,
                seasonal: vec![0.0],
            })
            .collect();
        ForecastTable::new(rows, vec!["weekly".to_string()], day(7)).unwrap()
    }

    fn series() -> PriceSeries {
        let bars = (1..=7)
            .map(|d| PriceBar {
                date: day(d),
                open: d as f64,
                high: d as f64,
                low: d as f64,
                close: d as f64,
                adj_close: d as f64,
                volume: 1.0,
            })
            .collect();
        PriceSeries::from_bars(Ticker::new("AAPL").unwrap(), bars).unwrap()
    }

    #[test]
    fn test_forecast_chart_traces() {
        let json = forecast_chart(&series(), &table()).unwrap().to_json();
        assert!(json.contains(FORECAST_TITLE));
        assert!(json.contains("Predicted"));
        assert!(json.contains("tonexty"));
    }

    #[test]
    fn test_components_chart_has_one_row_per_profile() {
        let weekly = SeasonalProfile {
            name: "weekly".to_string(),
            period_days: 7.0,
            labels: vec!["Sunday".to_string(), "Monday".to_string()],
            values: vec![0.1, -0.1],
        };
        let json = components_chart(&table(), &[weekly]).unwrap().to_json();

        assert!(json.contains(COMPONENTS_TITLE));
        assert!(json.contains("\"xaxis\":\"x2\""));
        assert!(json.contains("Day of week"));
    }
}
