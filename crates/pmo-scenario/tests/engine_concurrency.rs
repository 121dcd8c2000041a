//! Batch and timeout helpers over a shared prepared portfolio.

use pmo_scenario::{ScenarioConfig, ScenarioEngine, ScenarioError};
use pmo_test_utils::{reference_date, sample_portfolio, synthetic_portfolio};
use std::sync::Arc;
use std::time::Duration;

fn engine() -> ScenarioEngine {
    ScenarioEngine::new(ScenarioConfig::new().with_reference_date(reference_date()))
}

#[test]
fn batch_matches_sequential_runs() {
    let engine = engine();
    let prepared = engine.prepare(synthetic_portfolio(40, 3));
    let texts: Vec<String> = (0..40)
        .map(|i| format!("delay Project {i:04} by 2 weeks"))
        .collect();

    let batch = engine.run_batch(&prepared, &texts);
    for (text, parallel) in texts.iter().zip(&batch) {
        let sequential = engine.run(&prepared, text).unwrap();
        assert_eq!(parallel.as_ref().unwrap(), &sequential);
    }
}

#[test]
fn prepared_portfolio_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<pmo_scenario::PreparedPortfolio>();
    assert_send_sync::<pmo_scenario::ScenarioResult>();
}

#[tokio::test]
async fn timeout_surfaces_as_retryable_error() {
    let engine = engine();
    let prepared = Arc::new(engine.prepare(synthetic_portfolio(2_000, 4)));

    let result = engine
        .run_with_timeout(prepared, "remove Project 0000", Duration::ZERO)
        .await;
    match result {
        Err(err @ ScenarioError::Timeout { duration_ms: 0 }) => assert!(err.is_retryable()),
        // The worker may finish before the timer is first polled.
        Ok(result) => assert!(!result.dependents().is_empty()),
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn timeout_wrapper_propagates_parse_errors() {
    let engine = engine();
    let prepared = Arc::new(engine.prepare(sample_portfolio()));

    let err = engine
        .run_with_timeout(prepared, "remove Zeta", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ScenarioError::UnknownProject { .. }));
}
