//! Seasonal ARIMA over the ordered sequence of closes
//!
//! Dates are dropped and the closes are treated as a plain sequence with a
//! fixed seasonal period. Fitting is delegated to a [`ForecastEngine`].

use super::{ForecastTarget, ModelBackend};
use crate::calendar::{calendar_days, Clock, SystemClock};
use crate::catalog::ModelKind;
use crate::engine::{FittedForecaster, ForecastEngine, NativeArimaEngine};
use crate::error::{ForecastError, Result};
use crate::metrics::EvaluationMetrics;
use crate::series::{ForecastResult, PriceSeries};
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;

/// Assumed number of observations in one season
pub const DEFAULT_SEASONAL_PERIOD: usize = 100;

#[derive(Debug)]
struct TimeSeriesFit {
    forecaster: Box<dyn FittedForecaster>,
    fitted_on: NaiveDate,
}

/// Horizon-driven backend over a [`ForecastEngine`]
#[derive(Debug)]
pub struct TimeSeriesBackend {
    engine: Arc<dyn ForecastEngine>,
    clock: Arc<dyn Clock>,
    period: usize,
    fit: Option<TimeSeriesFit>,
}

impl Default for TimeSeriesBackend {
    fn default() -> Self {
        Self::new(
            Arc::new(NativeArimaEngine::default()),
            Arc::new(SystemClock),
            DEFAULT_SEASONAL_PERIOD,
        )
    }
}

impl TimeSeriesBackend {
    pub fn new(engine: Arc<dyn ForecastEngine>, clock: Arc<dyn Clock>, period: usize) -> Self {
        Self {
            engine,
            clock,
            period,
            fit: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Date the current fit completed
    pub fn fitted_on(&self) -> Option<NaiveDate> {
        self.fit.as_ref().map(|fit| fit.fitted_on)
    }

    /// Description of the fitted model, e.g. its order
    pub fn description(&self) -> Option<String> {
        self.fit.as_ref().map(|fit| fit.forecaster.description())
    }

    fn fitted(&self) -> Result<&TimeSeriesFit> {
        self.fit.as_ref().ok_or_else(|| {
            ForecastError::ModelNotFitted("ARIMA model has not been fitted".to_string())
        })
    }
}

impl ModelBackend for TimeSeriesBackend {
    fn kind(&self) -> ModelKind {
        ModelKind::TimeSeries
    }

    fn fit(&mut self, series: &PriceSeries) -> Result<()> {
        self.fit = None;

        let values = series.closes();
        let forecaster = self
            .engine
            .fit(&values, self.period)
            .map_err(|err| match err {
                ForecastError::ModelFit(_) => err,
                other => ForecastError::ModelFit(other.to_string()),
            })?;

        let fitted_on = self.clock.today();
        info!(
            "{} fitted {} on {} closes",
            self.engine.name(),
            forecaster.description(),
            values.len()
        );

        self.fit = Some(TimeSeriesFit {
            forecaster,
            fitted_on,
        });
        Ok(())
    }

    fn predict(&self, target: &ForecastTarget) -> Result<ForecastResult> {
        let fit = self.fitted()?;
        let horizon = match target {
            ForecastTarget::Horizon(horizon) => *horizon,
            ForecastTarget::Dates(_) => {
                return Err(ForecastError::InvalidParameter(
                    "ARIMA predicts a horizon, not explicit dates".to_string(),
                ))
            }
        };

        let values = fit.forecaster.forecast(horizon)?;
        let dates = calendar_days(fit.fitted_on, horizon);
        ForecastResult::from_pairs(&dates, &values)
            .map_err(|err| ForecastError::ModelFit(err.to_string()))
    }

    fn evaluate(&self) -> Result<EvaluationMetrics> {
        let fit = self.fitted()?;
        Ok(EvaluationMetrics::from(fit.forecaster.accuracy()))
    }

    fn is_fitted(&self) -> bool {
        self.fit.is_some()
    }
}
