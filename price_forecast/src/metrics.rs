//! Evaluation metrics reported by a fitted backend

use forecast_math::{AccuracyVector, RegressionEvaluation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Names of the cross-validation metrics of the regression backend, in report order
pub const REGRESSION_METRIC_NAMES: [&str; 7] = [
    "Root Mean Squared Error",
    "Root Relative Squared Error",
    "Root Mean Prior Squared Error",
    "Mean Absolute Error",
    "Mean Prior Absolute Error",
    "Correlation Coefficient",
    "Error Rate",
];

/// Names of the training-set accuracy metrics of the time-series backend, in report order
pub const TIME_SERIES_METRIC_NAMES: [&str; 7] = [
    "Mean Error",
    "Root Mean Squared Error",
    "Mean Absolute Error",
    "Mean Percentage Error",
    "Mean Absolute Percentage Error",
    "Mean Absolute Scaled Error",
    "Autocorrelation of Errors at Lag 1",
];

/// Ordered list of named metric values
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    entries: Vec<(String, f64)>,
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: f64) {
        self.entries.push((name.to_string(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the metric called `name`
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| *value)
    }

    /// Metric names in report order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Metric name to value rounded to two decimals
    pub fn formatted(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), format!("{:.2}", value)))
            .collect()
    }
}

impl From<&RegressionEvaluation> for EvaluationMetrics {
    fn from(eval: &RegressionEvaluation) -> Self {
        let values = [
            eval.root_mean_squared_error,
            eval.root_relative_squared_error,
            eval.root_mean_prior_squared_error,
            eval.mean_absolute_error,
            eval.mean_prior_absolute_error,
            eval.correlation_coefficient,
            eval.error_rate,
        ];
        let mut metrics = EvaluationMetrics::new();
        for (name, value) in REGRESSION_METRIC_NAMES.iter().zip(values) {
            metrics.push(name, value);
        }
        metrics
    }
}

impl From<AccuracyVector> for EvaluationMetrics {
    fn from(accuracy: AccuracyVector) -> Self {
        let mut metrics = EvaluationMetrics::new();
        for (name, value) in TIME_SERIES_METRIC_NAMES.iter().zip(accuracy.as_array()) {
            metrics.push(name, value);
        }
        metrics
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{}: {:.2}", name, value)?;
        }
        Ok(())
    }
}
