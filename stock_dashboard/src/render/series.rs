//! Raw price chart

use plotly::common::{Mode, Title};
use plotly::layout::{Axis, Layout, RangeSlider};
use plotly::{Plot, Scatter};
use stock_forecast::PriceSeries;

pub const SERIES_TITLE: &str = "Time Series Data";

/// Open and close prices over time, with a range slider under the x axis
pub fn series_chart(series: &PriceSeries) -> Plot {
    let dates: Vec<String> = series.dates().iter().map(|d| d.to_string()).collect();

    let open = Scatter::new(dates.clone(), series.open_prices())
        .mode(Mode::Lines)
        .name("stock_open");
    let close = Scatter::new(dates, series.close_prices())
        .mode(Mode::Lines)
        .name("stock_close");

    let layout = Layout::new()
        .title(Title::with_text(SERIES_TITLE))
        .x_axis(Axis::new().range_slider(RangeSlider::new().visible(true)));

    let mut plot = Plot::new();
    plot.add_trace(open);
    plot.add_trace(close);
    plot.set_layout(layout);
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stock_forecast::{PriceBar, Ticker};

    #[test]
    fn test_chart_has_open_and_close_traces() {
        let bars = (2..5)
            .map(|d| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                adj_close: 1.4,
                volume: 10.0,
            })
            .collect();
        let series = PriceSeries::from_bars(Ticker::new("AAPL").unwrap(), bars).unwrap();

        let json = series_chart(&series).to_json();
        assert!(json.contains("stock_open"));
        assert!(json.contains("stock_close"));
        assert!(json.contains(SERIES_TITLE));
        assert!(json.contains("rangeslider"));
    }
}
