//! Linear regression of closing price on time
//!
//! Each date becomes one instance whose single feature is the Unix
//! timestamp (midnight UTC, in seconds) and whose target is the close.

use super::{ForecastTarget, ModelBackend};
use crate::calendar::unix_seconds;
use crate::catalog::ModelKind;
use crate::error::{ForecastError, Result};
use crate::metrics::EvaluationMetrics;
use crate::series::{ForecastResult, PriceSeries};
use forecast_math::{cross_validate, LinearRegression};
use log::{debug, info, warn};

/// Default number of cross-validation folds
pub const DEFAULT_FOLDS: usize = 3;

/// Default cross-validation shuffle seed
pub const DEFAULT_SEED: u64 = 141;

#[derive(Debug, Clone)]
struct RegressionFit {
    model: LinearRegression,
    features: Vec<f64>,
    targets: Vec<f64>,
}

/// Ordinary least squares backend with k-fold evaluation
#[derive(Debug, Clone)]
pub struct RegressionBackend {
    folds: usize,
    seed: u64,
    fit: Option<RegressionFit>,
}

impl Default for RegressionBackend {
    fn default() -> Self {
        Self::new(DEFAULT_FOLDS, DEFAULT_SEED)
    }
}

impl RegressionBackend {
    pub fn new(folds: usize, seed: u64) -> Self {
        Self {
            folds,
            seed,
            fit: None,
        }
    }

    /// Fitted slope and intercept
    pub fn coefficients(&self) -> Option<(f64, f64)> {
        self.fit
            .as_ref()
            .map(|fit| (fit.model.slope(), fit.model.intercept()))
    }

    fn fitted(&self) -> Result<&RegressionFit> {
        self.fit.as_ref().ok_or_else(|| {
            ForecastError::ModelNotFitted("Linear regression has not been fitted".to_string())
        })
    }
}

impl ModelBackend for RegressionBackend {
    fn kind(&self) -> ModelKind {
        ModelKind::Regression
    }

    fn fit(&mut self, series: &PriceSeries) -> Result<()> {
        self.fit = None;

        let (features, targets): (Vec<f64>, Vec<f64>) = series
            .iter()
            .map(|point| (unix_seconds(point.date) as f64, point.close))
            .unzip();

        let model = LinearRegression::fit(&features, &targets)?;
        info!(
            "Fitted linear regression on {} closes (slope {:.6e})",
            model.observations(),
            model.slope()
        );

        self.fit = Some(RegressionFit {
            model,
            features,
            targets,
        });
        Ok(())
    }

    fn predict(&self, target: &ForecastTarget) -> Result<ForecastResult> {
        let fit = self.fitted()?;
        let dates = match target {
            ForecastTarget::Dates(dates) => dates,
            ForecastTarget::Horizon(_) => {
                return Err(ForecastError::InvalidParameter(
                    "Linear regression predicts explicit dates, not a horizon".to_string(),
                ))
            }
        };

        let mut forecast = ForecastResult::new();
        for date in dates {
            let value = fit.model.predict(unix_seconds(*date) as f64);
            if value.is_finite() {
                forecast.insert(*date, value);
            } else {
                warn!("Skipping non-finite prediction for {}", date);
            }
        }

        debug!("Predicted {} of {} dates", forecast.len(), dates.len());
        Ok(forecast)
    }

    fn evaluate(&self) -> Result<EvaluationMetrics> {
        let fit = self.fitted()?;
        let evaluation = cross_validate(&fit.features, &fit.targets, self.folds, self.seed)?;
        Ok(EvaluationMetrics::from(&evaluation))
    }

    fn is_fitted(&self) -> bool {
        self.fit.is_some()
    }
}
