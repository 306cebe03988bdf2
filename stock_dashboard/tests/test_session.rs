mod common;

use chrono::Days;
use common::{today, FixtureProvider, StubModel};
use pretty_assertions::assert_eq;
use stock_dashboard::{
    DashboardError, InputCollector, InputEvent, Pipeline, RunOutcome, Session, TickerChoices,
};
use stock_forecast::models::additive::{AdditiveConfig, AdditiveModel};

fn provider() -> FixtureProvider {
    FixtureProvider::default().with("AAPL").with("BTC-USD")
}

fn inputs() -> InputCollector {
    InputCollector::new(today(), TickerChoices::default())
}

#[test]
fn test_pipeline_end_to_end_with_stub_model() {
    let mut inputs = inputs();
    inputs.apply(InputEvent::SelectStart(4)).unwrap();
    inputs.apply(InputEvent::SetWeeks(2)).unwrap();
    let request = inputs.resolve().unwrap();

    let view = Pipeline::new(provider(), StubModel).run(&request).unwrap();

    let last_observed = view.series.last_date().unwrap();
    assert!(last_observed < today());
    assert!(view.series.first_date().unwrap() >= today() - Days::new(365 * 4));
    assert_eq!(view.forecast.horizon_days(), 14);
    assert_eq!(view.forecast.last_date(), Some(last_observed + Days::new(14)));
    assert_eq!(view.raw_preview.height(), 5);
    assert_eq!(view.forecast_preview.height(), 5);
    assert!(view.profiles.is_empty());
    assert_eq!(view.model_name, "Stub");
}

#[test]
fn test_session_writes_page_on_each_change() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("dashboard.html");
    let mut session = Session::new(inputs(), Pipeline::new(provider(), StubModel), &page);

    let outcome = session.refresh().unwrap();
    assert!(outcome.is_success());
    let html = std::fs::read_to_string(&page).unwrap();
    assert!(html.contains("Time Series Data"));
    assert!(html.contains("Forecast plot"));
    assert!(html.contains("Forecast components"));

    // Same value again: nothing to do
    assert_eq!(
        session.handle(InputEvent::SelectTicker("aapl".to_string())).unwrap(),
        None
    );

    let outcome = session
        .handle(InputEvent::SelectTicker("BTC-USD".to_string()))
        .unwrap()
        .unwrap();
    match outcome {
        RunOutcome::Rendered { ticker, .. } => assert_eq!(ticker.as_str(), "BTC-USD"),
        other => panic!("expected a rendered page, got {:?}", other),
    }
}

#[test]
fn test_missing_data_renders_failure_page() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("dashboard.html");
    let mut session = Session::new(inputs(), Pipeline::new(provider(), StubModel), &page);

    let outcome = session
        .handle(InputEvent::SelectTicker("GME".to_string()))
        .unwrap()
        .unwrap();

    assert!(!outcome.is_success());
    let html = std::fs::read_to_string(outcome.page()).unwrap();
    assert!(html.contains("No data available for GME"));
    assert!(!html.contains("Forecast plot"));
}

#[test]
fn test_invalid_input_does_not_run() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("dashboard.html");
    let mut session = Session::new(inputs(), Pipeline::new(provider(), StubModel), &page);

    assert!(matches!(
        session.handle(InputEvent::SetWeeks(500)),
        Err(DashboardError::InvalidSelection(_))
    ));
    assert!(!page.exists());
}

#[test]
fn test_additive_model_components_reach_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("dashboard.html");
    let model = AdditiveModel::new(AdditiveConfig {
        uncertainty_samples: 100,
        ..AdditiveConfig::default()
    })
    .unwrap();
    let mut session = Session::new(inputs(), Pipeline::new(provider(), model), &page);

    let outcome = session.handle(InputEvent::SelectStart(3)).unwrap().unwrap();
    assert!(outcome.is_success());

    let html = std::fs::read_to_string(&page).unwrap();
    assert!(html.contains("Day of week"));
    assert!(html.contains("Day of year"));
}
