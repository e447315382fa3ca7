//! Ordinary least squares regression on a single numeric feature

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Fitted simple linear regression `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    slope: f64,
    intercept: f64,
    observations: usize,
}

impl LinearRegression {
    /// Fit the regression of `targets` on `features` by least squares
    pub fn fit(features: &[f64], targets: &[f64]) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "Feature length ({}) doesn't match target length ({})",
                features.len(),
                targets.len()
            )));
        }

        if features.len() < 2 {
            return Err(MathError::InsufficientData(
                "Need at least 2 observations for linear regression".to_string(),
            ));
        }

        if features
            .iter()
            .chain(targets.iter())
            .any(|value| !value.is_finite())
        {
            return Err(MathError::InvalidInput(
                "Regression input contains non-finite values".to_string(),
            ));
        }

        let n = features.len() as f64;

        // Centre on the means so large features (Unix timestamps) keep precision
        let x_mean = features.iter().sum::<f64>() / n;
        let y_mean = targets.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (&x, &y) in features.iter().zip(targets.iter()) {
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        if denominator.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: feature values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        Ok(Self {
            slope,
            intercept,
            observations: features.len(),
        })
    }

    /// Evaluate the fitted line at a single feature value
    pub fn predict(&self, feature: f64) -> f64 {
        self.slope * feature + self.intercept
    }

    /// Get the fitted slope
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Get the fitted intercept
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of observations the model was fitted on
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Coefficient of determination on the given data
    pub fn r_squared(&self, features: &[f64], targets: &[f64]) -> Result<f64> {
        if features.len() != targets.len() || targets.is_empty() {
            return Err(MathError::InvalidInput(
                "Features and targets must have the same non-zero length".to_string(),
            ));
        }

        let y_mean = targets.iter().sum::<f64>() / targets.len() as f64;

        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;

        for (&x, &y) in features.iter().zip(targets.iter()) {
            ss_total += (y - y_mean).powi(2);
            ss_residual += (y - self.predict(x)).powi(2);
        }

        if ss_total.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate R-squared: total sum of squares is too small".to_string(),
            ));
        }

        Ok(1.0 - (ss_residual / ss_total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_exact_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 5.0, 7.0, 9.0, 11.0];

        let model = LinearRegression::fit(&x, &y).unwrap();

        assert_relative_eq!(model.slope(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(model.intercept(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(model.predict(10.0), 21.0, epsilon = 1e-9);
        assert_relative_eq!(model.r_squared(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(model.observations(), 5);
    }

    #[test]
    fn test_fit_on_unix_timestamps() {
        // One point per day, price rising by one each day
        let x: Vec<f64> = (0..30).map(|i| 1_700_000_000.0 + i as f64 * 86_400.0).collect();
        let y: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();

        let model = LinearRegression::fit(&x, &y).unwrap();

        assert_relative_eq!(model.slope() * 86_400.0, 1.0, epsilon = 1e-9);
        assert_relative_eq!(model.predict(x[29] + 86_400.0), 130.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fit_rejects_degenerate_input() {
        assert!(matches!(
            LinearRegression::fit(&[1.0], &[1.0]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            LinearRegression::fit(&[1.0, 2.0], &[1.0]),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            LinearRegression::fit(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Err(MathError::CalculationError(_))
        ));
        assert!(matches!(
            LinearRegression::fit(&[1.0, f64::NAN], &[1.0, 2.0]),
            Err(MathError::InvalidInput(_))
        ));
    }
}
