mod common;

use chrono::Days;
use common::{date, days, flat_frame, FixtureProvider};
use rstest::rstest;
use stock_forecast::data::{project, ToDataFrame};
use stock_forecast::models::additive::{AdditiveConfig, AdditiveModel};
use stock_forecast::models::{ForecastModel, TrainedForecastModel};
use stock_forecast::{ForecastError, MarketDataLoader, PriceSeries, Ticker};

fn load_series(count: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + 0.2 * i as f64 + 3.0 * ((i % 7) as f64 - 3.0).abs())
        .collect();
    let provider = FixtureProvider::default().with("MSFT", flat_frame(days("2023-01-02", count), &closes));
    MarketDataLoader::new(provider)
        .load(&Ticker::new("MSFT").unwrap(), date("2023-01-01"), date("2026-01-01"))
        .unwrap()
}

fn fast_model() -> AdditiveModel {
    AdditiveModel::new(AdditiveConfig {
        uncertainty_samples: 200,
        ..AdditiveConfig::default()
    })
    .unwrap()
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(52)]
#[case(104)]
fn test_horizon_is_weeks_times_seven(#[case] weeks: usize) {
    let series = load_series(90);
    let trained = fast_model().fit(&project(&series).unwrap()).unwrap();

    let table = trained.predict(weeks * 7).unwrap();

    let last = series.last_date().unwrap();
    assert_eq!(table.horizon_days(), weeks * 7);
    assert_eq!(table.last_date(), last.checked_add_days(Days::new(weeks as u64 * 7)));
    assert_eq!(table.first_date(), series.first_date());
    assert!(table
        .dates()
        .windows(2)
        .all(|w| w[0].succ_opt() == Some(w[1])));
}

#[test]
fn test_forecast_table_preview() {
    let series = load_series(45);
    let trained = fast_model().fit(&project(&series).unwrap()).unwrap();
    let table = trained.predict(7).unwrap();

    let df = table.to_dataframe().unwrap();
    let tail = df.tail(Some(5));
    assert_eq!(tail.height(), 5);
    for name in ["ds", "yhat", "yhat_lower", "yhat_upper", "trend", "weekly"] {
        assert!(tail.column(name).is_ok(), "missing column {}", name);
    }
}

#[test]
fn test_single_row_history_is_insufficient() {
    let series = load_series(1);
    let result = fast_model().fit(&project(&series).unwrap());

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientHistory {
            required: 2,
            actual: 1
        })
    ));
}

#[test]
fn test_weekly_component_is_periodic() {
    let series = load_series(120);
    let trained = fast_model().fit(&project(&series).unwrap()).unwrap();
    let table = trained.predict(14).unwrap();

    let weekly = table.component("weekly").unwrap();
    for i in 0..weekly.len() - 7 {
        assert!((weekly[i] - weekly[i + 7]).abs() < 1e-6);
    }
    assert_eq!(trained.history().len(), 120);
}
