mod common;

use approx::assert_relative_eq;
use common::{date, fixed_clock, synthetic_series, today};
use forecast_math::AccuracyVector;
use pretty_assertions::assert_eq;
use price_forecast::calendar::{shift_days, working_days};
use price_forecast::catalog::ModelKind;
use price_forecast::engine::{FittedForecaster, ForecastEngine, NativeArimaEngine};
use price_forecast::error::{ForecastError, Result};
use price_forecast::metrics::{REGRESSION_METRIC_NAMES, TIME_SERIES_METRIC_NAMES};
use price_forecast::models::{
    Backend, ForecastTarget, ModelBackend, RegressionBackend, TimeSeriesBackend,
};
use price_forecast::series::{PricePoint, PriceSeries};
use rstest::rstest;
use std::sync::Arc;

fn time_series_backend() -> TimeSeriesBackend {
    TimeSeriesBackend::new(Arc::new(NativeArimaEngine::default()), fixed_clock(), 100)
}

fn linear_series() -> PriceSeries {
    working_days(date(2024, 1, 1), date(2024, 4, 1))
        .into_iter()
        .map(|d| {
            let days = d.signed_duration_since(date(2024, 1, 1)).num_days() as f64;
            PricePoint::new(d, 50.0 + 0.25 * days).unwrap()
        })
        .collect()
}

#[rstest]
#[case(Backend::Regression(RegressionBackend::default()))]
#[case(Backend::TimeSeries(time_series_backend()))]
fn test_evaluate_before_fit_is_not_fitted(#[case] backend: Backend) {
    assert!(!backend.is_fitted());
    assert!(matches!(
        backend.evaluate(),
        Err(ForecastError::ModelNotFitted(_))
    ));
    assert!(matches!(
        backend.predict(&ForecastTarget::Horizon(3)),
        Err(ForecastError::ModelNotFitted(_))
    ));
}

#[test]
fn test_backend_kinds() {
    assert_eq!(
        Backend::from(RegressionBackend::default()).kind(),
        ModelKind::Regression
    );
    assert_eq!(
        Backend::from(time_series_backend()).kind(),
        ModelKind::TimeSeries
    );
}

#[test]
fn test_time_series_backend_keeps_seasonal_period() {
    let backend = TimeSeriesBackend::new(Arc::new(ConstantEngine), fixed_clock(), 20);
    assert_eq!(backend.period(), 20);
    assert_eq!(time_series_backend().period(), 100);
}

#[test]
fn test_regression_recovers_linear_trend() {
    let mut backend = RegressionBackend::default();
    backend.fit(&linear_series()).unwrap();

    let (slope, _) = backend.coefficients().unwrap();
    assert_relative_eq!(slope * 86_400.0, 0.25, max_relative = 1e-6);

    let target = working_days(date(2024, 4, 1), date(2024, 4, 8));
    let forecast = backend
        .predict(&ForecastTarget::Dates(target.clone()))
        .unwrap();

    assert_eq!(forecast.dates(), target);
    assert_relative_eq!(
        forecast.get(&date(2024, 4, 2)).unwrap(),
        50.0 + 0.25 * 92.0,
        max_relative = 1e-6
    );
}

#[test]
fn test_regression_evaluate_is_deterministic() {
    let mut backend = RegressionBackend::default();
    backend.fit(&synthetic_series(today(), 5 * 365)).unwrap();

    let first = backend.evaluate().unwrap();
    let second = backend.evaluate().unwrap();

    let first_bits: Vec<u64> = first.iter().map(|(_, v)| v.to_bits()).collect();
    let second_bits: Vec<u64> = second.iter().map(|(_, v)| v.to_bits()).collect();
    assert_eq!(first_bits, second_bits);
    assert_eq!(first.names(), REGRESSION_METRIC_NAMES.to_vec());
    assert_eq!(first.get("Error Rate"), first.get("Root Mean Squared Error"));
}

#[test]
fn test_regression_refit_gives_same_metrics() {
    let series = synthetic_series(today(), 2 * 365);

    let mut a = RegressionBackend::default();
    let mut b = RegressionBackend::default();
    a.fit(&series).unwrap();
    b.fit(&series).unwrap();

    assert_eq!(a.evaluate().unwrap(), b.evaluate().unwrap());
}

#[test]
fn test_regression_rejects_horizon_target() {
    let mut backend = RegressionBackend::default();
    backend.fit(&linear_series()).unwrap();

    assert!(matches!(
        backend.predict(&ForecastTarget::Horizon(7)),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_regression_failed_fit_leaves_backend_unfitted() {
    let mut backend = RegressionBackend::default();
    backend.fit(&linear_series()).unwrap();
    assert!(backend.is_fitted());

    let single: PriceSeries = vec![PricePoint::new(today(), 10.0).unwrap()]
        .into_iter()
        .collect();
    assert!(matches!(backend.fit(&single), Err(ForecastError::ModelFit(_))));
    assert!(!backend.is_fitted());
    assert!(matches!(
        backend.evaluate(),
        Err(ForecastError::ModelNotFitted(_))
    ));
}

#[test]
fn test_regression_evaluate_needs_enough_instances() {
    let series: PriceSeries = vec![
        PricePoint::new(date(2024, 1, 2), 10.0).unwrap(),
        PricePoint::new(date(2024, 1, 3), 11.0).unwrap(),
    ]
    .into_iter()
    .collect();

    let mut backend = RegressionBackend::default();
    backend.fit(&series).unwrap();
    assert!(matches!(backend.evaluate(), Err(ForecastError::ModelFit(_))));
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(30)]
fn test_time_series_predicts_consecutive_days_from_fit_date(#[case] horizon: usize) {
    let mut backend = time_series_backend();
    backend.fit(&synthetic_series(today(), 2 * 365)).unwrap();
    assert_eq!(backend.fitted_on(), Some(today()));

    let forecast = backend.predict(&ForecastTarget::Horizon(horizon)).unwrap();
    assert_eq!(forecast.len(), horizon);

    let expected: Vec<_> = (0..horizon as i64).map(|i| shift_days(today(), i)).collect();
    assert_eq!(forecast.dates(), expected);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_time_series_evaluate_reports_accuracy_vector() {
    let mut backend = time_series_backend();
    backend.fit(&synthetic_series(today(), 2 * 365)).unwrap();

    let metrics = backend.evaluate().unwrap();
    assert_eq!(metrics.names(), TIME_SERIES_METRIC_NAMES.to_vec());
    assert!(metrics.get("Root Mean Squared Error").unwrap() > 0.0);
    assert!(backend.description().unwrap().starts_with("ARIMA("));
}

#[test]
fn test_time_series_short_series_is_fit_error() {
    let mut backend = time_series_backend();
    let result = backend.fit(&synthetic_series(today(), 90));

    assert!(matches!(result, Err(ForecastError::ModelFit(_))));
    assert!(!backend.is_fitted());
}

#[test]
fn test_time_series_rejects_date_target() {
    let mut backend = time_series_backend();
    backend.fit(&synthetic_series(today(), 2 * 365)).unwrap();

    assert!(matches!(
        backend.predict(&ForecastTarget::Dates(vec![today()])),
        Err(ForecastError::InvalidParameter(_))
    ));
}

/// Engine that always rejects its input with a non-fit error
#[derive(Debug)]
struct RejectingEngine;

impl ForecastEngine for RejectingEngine {
    fn name(&self) -> &'static str {
        "rejecting"
    }

    fn fit(&self, _values: &[f64], _period: usize) -> Result<Box<dyn FittedForecaster>> {
        Err(ForecastError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "engine went away",
        )))
    }
}

/// Engine returning a constant forecast
#[derive(Debug)]
struct ConstantEngine;

#[derive(Debug)]
struct ConstantForecaster;

impl ForecastEngine for ConstantEngine {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn fit(&self, _values: &[f64], _period: usize) -> Result<Box<dyn FittedForecaster>> {
        Ok(Box::new(ConstantForecaster))
    }
}

impl FittedForecaster for ConstantForecaster {
    fn description(&self) -> String {
        "constant".to_string()
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        Ok(vec![42.0; horizon])
    }

    fn accuracy(&self) -> AccuracyVector {
        AccuracyVector {
            me: 0.0,
            rmse: 1.0,
            mae: 1.0,
            mpe: 0.0,
            mape: 1.0,
            mase: 0.5,
            acf1: 0.1,
        }
    }
}

#[test]
fn test_engine_failure_maps_to_fit_error() {
    let mut backend = TimeSeriesBackend::new(Arc::new(RejectingEngine), fixed_clock(), 100);
    let result = backend.fit(&linear_series());
    assert!(matches!(result, Err(ForecastError::ModelFit(_))));
}

#[test]
fn test_engine_output_is_dated_and_formatted() {
    let mut backend = TimeSeriesBackend::new(Arc::new(ConstantEngine), fixed_clock(), 100);
    backend.fit(&linear_series()).unwrap();

    let forecast = backend.predict(&ForecastTarget::Horizon(3)).unwrap();
    assert_eq!(
        forecast.dates(),
        vec![today(), date(2024, 6, 15), date(2024, 6, 16)]
    );
    assert_eq!(forecast.values(), vec![42.0; 3]);

    let formatted = backend.evaluate().unwrap().formatted();
    assert_eq!(formatted["Mean Absolute Scaled Error"], "0.50");
    assert_eq!(formatted["Autocorrelation of Errors at Lag 1"], "0.10");
}
