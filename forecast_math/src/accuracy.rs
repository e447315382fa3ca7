//! Training-set accuracy of a fitted forecaster

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Seven accuracy measures of one-step in-sample forecasts.
///
/// Errors are `actual - fitted`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyVector {
    /// Mean Error
    pub me: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Percentage Error
    pub mpe: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Mean Absolute Scaled Error
    pub mase: f64,
    /// Lag-1 autocorrelation of the errors
    pub acf1: f64,
}

impl AccuracyVector {
    /// Compute the vector from actual values and their one-step errors.
    ///
    /// `scale` is the in-sample mean absolute error of the seasonal naive
    /// forecast, used for MASE.
    pub fn from_errors(actual: &[f64], errors: &[f64], scale: f64) -> Result<Self> {
        if actual.len() != errors.len() || errors.is_empty() {
            return Err(MathError::InvalidInput(
                "Actual values and errors must have the same non-zero length".to_string(),
            ));
        }

        let n = errors.len() as f64;
        let me = errors.mean();
        let rmse = (errors.iter().map(|e| e.powi(2)).sum::<f64>() / n).sqrt();
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        // Percentage errors are undefined where the actual value is zero
        let percentages: Vec<f64> = actual
            .iter()
            .zip(errors.iter())
            .filter(|(&a, _)| a != 0.0)
            .map(|(&a, &e)| 100.0 * e / a)
            .collect();
        let (mpe, mape) = if percentages.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            (
                percentages.iter().mean(),
                percentages.iter().map(|p| p.abs()).mean(),
            )
        };

        Ok(Self {
            me,
            rmse,
            mae,
            mpe,
            mape,
            mase: mae / scale,
            acf1: lag_one_autocorrelation(errors),
        })
    }

    /// Values in reporting order: ME, RMSE, MAE, MPE, MAPE, MASE, ACF1
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.me, self.rmse, self.mae, self.mpe, self.mape, self.mase, self.acf1,
        ]
    }
}

/// Mean absolute difference between observations `lag` steps apart
pub fn seasonal_naive_scale(values: &[f64], lag: usize) -> f64 {
    let lag = lag.max(1);
    if values.len() <= lag {
        return f64::NAN;
    }

    values
        .windows(lag + 1)
        .map(|w| (w[lag] - w[0]).abs())
        .mean()
}

/// Sample autocorrelation of a series at lag one
pub fn lag_one_autocorrelation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }

    let mean = values.mean();
    let denominator: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if denominator == 0.0 {
        return f64::NAN;
    }

    let numerator: f64 = values
        .windows(2)
        .map(|w| (w[0] - mean) * (w[1] - mean))
        .sum();

    numerator / denominator
}
