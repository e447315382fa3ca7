//! Forecasting backends over a daily price series

use crate::catalog::ModelKind;
use crate::error::Result;
use crate::metrics::EvaluationMetrics;
use crate::series::{ForecastResult, PriceSeries};
use chrono::NaiveDate;
use std::fmt::Debug;

pub mod regression;
pub mod time_series;

pub use regression::RegressionBackend;
pub use time_series::TimeSeriesBackend;

/// What a backend is asked to predict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastTarget {
    /// One prediction per listed date
    Dates(Vec<NaiveDate>),
    /// A number of consecutive steps after the training data
    Horizon(usize),
}

/// Fit/predict/evaluate contract shared by every backend
pub trait ModelBackend: Debug {
    /// Which kind of model this is
    fn kind(&self) -> ModelKind;

    /// Fit on `series`, replacing any earlier fit.
    ///
    /// On failure the backend is left unfitted.
    fn fit(&mut self, series: &PriceSeries) -> Result<()>;

    /// Predict the requested target
    fn predict(&self, target: &ForecastTarget) -> Result<ForecastResult>;

    /// Metrics describing the current fit
    fn evaluate(&self) -> Result<EvaluationMetrics>;

    /// True after a successful fit
    fn is_fitted(&self) -> bool;
}

/// The closed set of backends
#[derive(Debug)]
pub enum Backend {
    Regression(RegressionBackend),
    TimeSeries(TimeSeriesBackend),
}

impl Backend {
    /// Borrow the selected variant through the common contract
    fn as_model(&self) -> &dyn ModelBackend {
        match self {
            Backend::Regression(backend) => backend,
            Backend::TimeSeries(backend) => backend,
        }
    }

    fn as_model_mut(&mut self) -> &mut dyn ModelBackend {
        match self {
            Backend::Regression(backend) => backend,
            Backend::TimeSeries(backend) => backend,
        }
    }
}

impl ModelBackend for Backend {
    fn kind(&self) -> ModelKind {
        self.as_model().kind()
    }

    fn fit(&mut self, series: &PriceSeries) -> Result<()> {
        self.as_model_mut().fit(series)
    }

    fn predict(&self, target: &ForecastTarget) -> Result<ForecastResult> {
        self.as_model().predict(target)
    }

    fn evaluate(&self) -> Result<EvaluationMetrics> {
        self.as_model().evaluate()
    }

    fn is_fitted(&self) -> bool {
        self.as_model().is_fitted()
    }
}

impl From<RegressionBackend> for Backend {
    fn from(backend: RegressionBackend) -> Self {
        Backend::Regression(backend)
    }
}

impl From<TimeSeriesBackend> for Backend {
    fn from(backend: TimeSeriesBackend) -> Self {
        Backend::TimeSeries(backend)
    }
}
