//! Automatic seasonal ARIMA fitting and forecasting
//!
//! The fitter works on `ARIMA(p,d,q)(0,D,0)[m]` models:
//!
//! 1. The series is seasonally differenced `D` times at lag `m`.
//! 2. The regular differencing order `d` is the one (up to `max_d`) giving
//!    the smallest sample variance.
//! 3. Every `ARMA(p,q)` up to `(max_p, max_q)` is estimated with the
//!    two-stage Hannan–Rissanen least-squares method and the order with the
//!    lowest AIC is kept. A constant is estimated only when `d == 0`.
//!
//! Forecasts recurse on the differenced scale with future innovations set
//! to zero and are then integrated back to the original scale.

use crate::accuracy::{seasonal_naive_scale, AccuracyVector};
use crate::linalg::least_squares;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

/// Observations that must remain after all differencing
pub const MIN_DIFFERENCED_OBSERVATIONS: usize = 10;

/// Upper bound on the long autoregression of the first Hannan–Rissanen stage
const MAX_LONG_AR: usize = 10;

/// Selected model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Regular differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
    /// Seasonal differencing order
    pub seasonal_d: usize,
    /// Seasonal period
    pub period: usize,
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ARIMA({},{},{})(0,{},0)[{}]",
            self.p, self.d, self.q, self.seasonal_d, self.period
        )
    }
}

/// Order search configuration
#[derive(Debug, Clone)]
pub struct AutoArima {
    period: usize,
    seasonal_differences: usize,
    max_p: usize,
    max_d: usize,
    max_q: usize,
}

/// One fitted ARMA candidate on the differenced scale
#[derive(Debug, Clone)]
struct ArmaCandidate {
    ar: Vec<f64>,
    ma: Vec<f64>,
    residuals: Vec<f64>,
    sigma2: f64,
    aic: f64,
}

impl AutoArima {
    /// Create a search with one seasonal difference at lag `period`
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Seasonal period must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            period,
            seasonal_differences: 1,
            max_p: 3,
            max_d: 2,
            max_q: 2,
        })
    }

    /// Limit the searched AR, differencing and MA orders
    pub fn with_max_order(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set how many seasonal differences are taken
    pub fn with_seasonal_differences(mut self, differences: usize) -> Self {
        self.seasonal_differences = differences;
        self
    }

    /// Get the seasonal period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Shortest series this search can fit
    pub fn minimum_observations(&self) -> usize {
        self.period * self.seasonal_differences + MIN_DIFFERENCED_OBSERVATIONS
    }

    /// Select an order for `values` and fit it
    pub fn fit(&self, values: &[f64]) -> Result<ArimaFit> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Series contains non-finite values".to_string(),
            ));
        }

        if values.len() < self.minimum_observations() {
            return Err(MathError::InsufficientData(format!(
                "Series of length {} is too short for seasonal period {} (need at least {})",
                values.len(),
                self.period,
                self.minimum_observations()
            )));
        }

        let mut seasonal_levels = vec![values.to_vec()];
        for _ in 0..self.seasonal_differences {
            let next = difference(&seasonal_levels[seasonal_levels.len() - 1], self.period);
            seasonal_levels.push(next);
        }

        let base = seasonal_levels[self.seasonal_differences].clone();
        let d = self.select_differencing(&base);

        let mut regular_levels = vec![base];
        for _ in 0..d {
            let next = difference(&regular_levels[regular_levels.len() - 1], 1);
            regular_levels.push(next);
        }

        let differenced = &regular_levels[d];
        let include_mean = d == 0;
        let mean = if include_mean {
            differenced.iter().mean()
        } else {
            0.0
        };
        let centred: Vec<f64> = differenced.iter().map(|v| v - mean).collect();

        // Residual sums start at a common index so AIC values are comparable
        let common_start = self.max_p.max(self.max_q);
        let extra_params = usize::from(include_mean) + 1;

        let mut best: Option<(usize, usize, ArmaCandidate)> = None;
        for p in 0..=self.max_p {
            for q in 0..=self.max_q {
                let candidate = match fit_arma(&centred, p, q, common_start, extra_params) {
                    Ok(candidate) => candidate,
                    Err(_) => continue,
                };

                let better = best
                    .as_ref()
                    .map_or(true, |(_, _, current)| candidate.aic < current.aic);
                if better {
                    best = Some((p, q, candidate));
                }
            }
        }

        let (p, q, candidate) = best.ok_or_else(|| {
            MathError::CalculationError("No ARMA candidate could be fitted".to_string())
        })?;

        Ok(ArimaFit {
            order: ArimaOrder {
                p,
                d,
                q,
                seasonal_d: self.seasonal_differences,
                period: self.period,
            },
            mean,
            ar: candidate.ar,
            ma: candidate.ma,
            sigma2: candidate.sigma2,
            aic: candidate.aic,
            residual_start: p.max(q),
            residuals: candidate.residuals,
            seasonal_levels,
            regular_levels,
        })
    }

    /// Regular differencing order with the smallest sample variance
    fn select_differencing(&self, series: &[f64]) -> usize {
        let mut best_d = 0;
        let mut best_variance = series.variance();
        let mut current = series.to_vec();

        for d in 1..=self.max_d {
            current = difference(&current, 1);
            if current.len() < MIN_DIFFERENCED_OBSERVATIONS {
                break;
            }

            let variance = current.iter().variance();
            if variance < best_variance {
                best_variance = variance;
                best_d = d;
            }
        }

        best_d
    }
}

/// Fitted seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct ArimaFit {
    order: ArimaOrder,
    mean: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma2: f64,
    aic: f64,
    residuals: Vec<f64>,
    residual_start: usize,
    /// `[0]` is the original series, `[k]` its k-th seasonal difference
    seasonal_levels: Vec<Vec<f64>>,
    /// `[0]` is the fully seasonally differenced series, `[k]` its k-th difference
    regular_levels: Vec<Vec<f64>>,
}

impl ArimaFit {
    /// Get the selected order
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Get the AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// Get the MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Constant of the differenced series (zero when `d > 0`)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Innovation variance estimate
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Akaike information criterion of the selected order
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Number of observations the model was fitted on
    pub fn observations(&self) -> usize {
        self.seasonal_levels[0].len()
    }

    /// One-step in-sample errors
    pub fn residuals(&self) -> &[f64] {
        &self.residuals[self.residual_start..]
    }

    /// Forecast `horizon` values past the end of the series
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        if horizon == 0 {
            return Vec::new();
        }

        let differenced = &self.regular_levels[self.order.d];
        let fitted_len = differenced.len();

        let mut centred: Vec<f64> = differenced.iter().map(|v| v - self.mean).collect();
        let mut innovations = self.residuals.clone();

        for _ in 0..horizon {
            let t = centred.len();
            let ar_part: f64 = self
                .ar
                .iter()
                .enumerate()
                .map(|(i, phi)| phi * centred[t - 1 - i])
                .sum();
            let ma_part: f64 = self
                .ma
                .iter()
                .enumerate()
                .map(|(j, theta)| theta * innovations[t - 1 - j])
                .sum();

            centred.push(ar_part + ma_part);
            innovations.push(0.0);
        }

        let mut values: Vec<f64> = centred[fitted_len..]
            .iter()
            .map(|v| v + self.mean)
            .collect();

        for level in (0..self.order.d).rev() {
            values = integrate(&self.regular_levels[level], &values, 1);
        }
        for level in (0..self.order.seasonal_d).rev() {
            values = integrate(&self.seasonal_levels[level], &values, self.order.period);
        }

        values
    }

    /// Training-set accuracy of the one-step in-sample forecasts
    pub fn accuracy(&self) -> Result<AccuracyVector> {
        let observations = &self.seasonal_levels[0];
        let offset = self.order.period * self.order.seasonal_d + self.order.d;

        let errors = self.residuals();
        let actual = &observations[offset + self.residual_start..];

        let lag = if self.order.seasonal_d > 0 {
            self.order.period
        } else {
            1
        };

        AccuracyVector::from_errors(actual, errors, seasonal_naive_scale(observations, lag))
    }
}

/// Lagged difference `x[t] - x[t - lag]`
pub fn difference(values: &[f64], lag: usize) -> Vec<f64> {
    if values.len() <= lag {
        return Vec::new();
    }

    values.windows(lag + 1).map(|w| w[lag] - w[0]).collect()
}

/// Undo one lagged difference for values following `history`
fn integrate(history: &[f64], increments: &[f64], lag: usize) -> Vec<f64> {
    let mut extended = history.to_vec();
    for &increment in increments {
        let value = extended[extended.len() - lag] + increment;
        extended.push(value);
    }

    extended.split_off(history.len())
}

/// Estimate `ARMA(p, q)` on a zero-mean series
fn fit_arma(
    series: &[f64],
    p: usize,
    q: usize,
    common_start: usize,
    extra_params: usize,
) -> Result<ArmaCandidate> {
    let len = series.len();
    let start = p.max(q);

    let (ar, ma) = if q == 0 {
        if p == 0 {
            (Vec::new(), Vec::new())
        } else {
            if len <= 2 * p + 2 {
                return Err(MathError::InsufficientData(format!(
                    "Too few observations for AR({})",
                    p
                )));
            }
            let (design, target) = lagged_design(series, None, p, 0, p);
            (least_squares(&design, &target)?, Vec::new())
        }
    } else {
        // Stage one: long autoregression to approximate the innovations
        let long_order = (start + 2).max(4).min(MAX_LONG_AR);
        if len <= 2 * long_order + p + q + 2 {
            return Err(MathError::InsufficientData(format!(
                "Too few observations for ARMA({},{})",
                p, q
            )));
        }

        let (design, target) = lagged_design(series, None, long_order, 0, long_order);
        let long_ar = least_squares(&design, &target)?;

        let mut innovations = vec![0.0; len];
        for t in long_order..len {
            let predicted: f64 = long_ar
                .iter()
                .enumerate()
                .map(|(i, phi)| phi * series[t - 1 - i])
                .sum();
            innovations[t] = series[t] - predicted;
        }

        // Stage two: regress on lagged values and lagged innovations
        let (design, target) =
            lagged_design(series, Some(innovations.as_slice()), p, q, long_order + q);
        let coefficients = least_squares(&design, &target)?;
        let (ar, ma) = coefficients.split_at(p);
        (ar.to_vec(), ma.to_vec())
    };

    if ar.iter().map(|c| c.abs()).sum::<f64>() >= 1.0 {
        return Err(MathError::CalculationError(
            "AR coefficients outside the stationarity bound".to_string(),
        ));
    }
    if ma.iter().map(|c| c.abs()).sum::<f64>() >= 1.0 {
        return Err(MathError::CalculationError(
            "MA coefficients outside the invertibility bound".to_string(),
        ));
    }

    let mut residuals = vec![0.0; len];
    for t in start..len {
        let ar_part: f64 = ar
            .iter()
            .enumerate()
            .map(|(i, phi)| phi * series[t - 1 - i])
            .sum();
        let ma_part: f64 = ma
            .iter()
            .enumerate()
            .map(|(j, theta)| theta * residuals[t - 1 - j])
            .sum();
        residuals[t] = series[t] - ar_part - ma_part;
    }

    let from = common_start.max(start).min(len);
    let effective = (len - from).max(1) as f64;
    let sse: f64 = residuals[from..].iter().map(|e| e.powi(2)).sum();
    let sigma2 = (sse / effective).max(f64::MIN_POSITIVE);
    let aic = effective * sigma2.ln() + 2.0 * (p + q + extra_params) as f64;

    if !aic.is_finite() {
        return Err(MathError::CalculationError(
            "Non-finite information criterion".to_string(),
        ));
    }

    Ok(ArmaCandidate {
        ar,
        ma,
        residuals,
        sigma2,
        aic,
    })
}

/// Rows `[x[t-1..=t-p], e[t-1..=t-q]]` with target `x[t]` for `t >= first`
fn lagged_design(
    series: &[f64],
    innovations: Option<&[f64]>,
    p: usize,
    q: usize,
    first: usize,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut design = Vec::with_capacity(series.len().saturating_sub(first));
    let mut target = Vec::with_capacity(series.len().saturating_sub(first));

    for t in first..series.len() {
        let mut row: Vec<f64> = (1..=p).map(|i| series[t - i]).collect();
        if let Some(innovations) = innovations {
            row.extend((1..=q).map(|j| innovations[t - j]));
        }
        design.push(row);
        target.push(series[t]);
    }

    (design, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use std::f64::consts::PI;

    fn seasonal_series(n: usize, period: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 0.3).unwrap();
        (0..n)
            .map(|t| {
                let t = t as f64;
                100.0 + 0.2 * t + 5.0 * (2.0 * PI * t / period as f64).sin() + noise.sample(&mut rng)
            })
            .collect()
    }

    #[test]
    fn test_difference() {
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 1), vec![3.0, 5.0, 7.0]);
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 2), vec![8.0, 12.0]);
        assert!(difference(&[1.0, 2.0], 2).is_empty());
    }

    #[test]
    fn test_linear_series_is_extended_exactly() {
        let values: Vec<f64> = (0..40).map(|t| 10.0 + t as f64).collect();
        let fit = AutoArima::new(5).unwrap().fit(&values).unwrap();

        let forecast = fit.forecast(3);

        assert_eq!(forecast.len(), 3);
        for (value, expected) in forecast.iter().zip([50.0, 51.0, 52.0]) {
            assert!((value - expected).abs() < 1e-6, "{} vs {}", value, expected);
        }
    }

    #[test]
    fn test_seasonal_forecast_tracks_pattern() {
        let period = 12;
        let values = seasonal_series(240, period, 3);
        let fit = AutoArima::new(period).unwrap().fit(&values).unwrap();

        assert_eq!(fit.order().seasonal_d, 1);
        assert_eq!(fit.observations(), 240);

        let forecast = fit.forecast(period);
        assert_eq!(forecast.len(), period);

        let mean_abs_error: f64 = forecast
            .iter()
            .enumerate()
            .map(|(k, value)| {
                let t = (240 + k) as f64;
                let truth = 100.0 + 0.2 * t + 5.0 * (2.0 * PI * t / period as f64).sin();
                (value - truth).abs()
            })
            .sum::<f64>()
            / period as f64;
        assert!(mean_abs_error < 2.0, "mean abs error {}", mean_abs_error);
    }

    #[test]
    fn test_accuracy_vector() {
        let values = seasonal_series(300, 100, 11);
        let fit = AutoArima::new(100).unwrap().fit(&values).unwrap();

        let accuracy = fit.accuracy().unwrap();

        assert!(accuracy.rmse > 0.0 && accuracy.rmse.is_finite());
        assert!(accuracy.mae <= accuracy.rmse);
        assert!(accuracy.mase.is_finite());
        assert_eq!(accuracy.as_array().len(), 7);
        assert_eq!(fit.forecast(7).len(), 7);
    }

    #[test]
    fn test_short_series_is_rejected() {
        let values = seasonal_series(105, 100, 5);
        let result = AutoArima::new(100).unwrap().fit(&values);
        assert!(matches!(result, Err(MathError::InsufficientData(_))));
    }

    #[test]
    fn test_invalid_input() {
        assert!(AutoArima::new(0).is_err());

        let mut values = seasonal_series(60, 4, 1);
        values[10] = f64::NAN;
        assert!(matches!(
            AutoArima::new(4).unwrap().fit(&values),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_without_seasonal_differencing() {
        let search = AutoArima::new(4)
            .unwrap()
            .with_seasonal_differences(0)
            .with_max_order(2, 1, 1);
        assert_eq!(search.period(), 4);
        assert_eq!(search.minimum_observations(), MIN_DIFFERENCED_OBSERVATIONS);
        assert_eq!(
            AutoArima::new(4).unwrap().minimum_observations(),
            4 + MIN_DIFFERENCED_OBSERVATIONS
        );

        let fit = search.fit(&seasonal_series(120, 4, 7)).unwrap();
        let order = fit.order();

        assert_eq!(order.seasonal_d, 0);
        assert_eq!(order.period, 4);
        assert!(order.p <= 2 && order.d <= 1 && order.q <= 1);
        assert_eq!(fit.ar_coefficients().len(), order.p);
        assert_eq!(fit.ma_coefficients().len(), order.q);
        assert_eq!(fit.forecast(4).len(), 4);
    }

    #[test]
    fn test_order_display() {
        let order = ArimaOrder {
            p: 1,
            d: 1,
            q: 0,
            seasonal_d: 1,
            period: 100,
        };
        assert_eq!(order.to_string(), "ARIMA(1,1,0)(0,1,0)[100]");
    }
}
