//! Seeded k-fold cross-validation of a single-feature linear regression
//!
//! Instances are shuffled once with a seeded RNG and split into `folds`
//! contiguous partitions. Every partition is predicted by a regression
//! fitted on the remaining partitions, and the pooled out-of-fold errors
//! are compared against a "prior" predictor that always answers with the
//! mean target of the training partitions.

use crate::regression::LinearRegression;
use crate::{MathError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Pooled out-of-fold error statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionEvaluation {
    /// Number of instances evaluated
    pub instances: usize,
    /// Number of folds
    pub folds: usize,
    /// Root Mean Squared Error
    pub root_mean_squared_error: f64,
    /// RMSE relative to the prior predictor, in percent
    pub root_relative_squared_error: f64,
    /// RMSE of the prior predictor
    pub root_mean_prior_squared_error: f64,
    /// Mean Absolute Error
    pub mean_absolute_error: f64,
    /// MAE of the prior predictor
    pub mean_prior_absolute_error: f64,
    /// Pearson correlation between predictions and actual values
    pub correlation_coefficient: f64,
    /// Error rate; for a numeric target this is the RMSE
    pub error_rate: f64,
}

/// Sizes of each fold when `instances` are split into `folds` partitions.
///
/// The first `instances % folds` partitions receive one extra instance.
pub fn fold_sizes(instances: usize, folds: usize) -> Vec<usize> {
    if folds == 0 {
        return Vec::new();
    }

    let base = instances / folds;
    let extra = instances % folds;

    (0..folds)
        .map(|fold| if fold < extra { base + 1 } else { base })
        .collect()
}

/// Cross-validate a linear regression of `targets` on `features`
pub fn cross_validate(
    features: &[f64],
    targets: &[f64],
    folds: usize,
    seed: u64,
) -> Result<RegressionEvaluation> {
    if features.len() != targets.len() {
        return Err(MathError::InvalidInput(format!(
            "Feature length ({}) doesn't match target length ({})",
            features.len(),
            targets.len()
        )));
    }

    if folds < 2 {
        return Err(MathError::InvalidInput(
            "Cross-validation needs at least 2 folds".to_string(),
        ));
    }

    let n = features.len();
    if n < folds {
        return Err(MathError::InsufficientData(format!(
            "Number of folds ({}) exceeds number of instances ({})",
            folds, n
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut predictions = Vec::with_capacity(n);
    let mut actuals = Vec::with_capacity(n);
    let mut sum_abs_error = 0.0;
    let mut sum_sq_error = 0.0;
    let mut sum_abs_prior = 0.0;
    let mut sum_sq_prior = 0.0;

    let mut start = 0;
    for size in fold_sizes(n, folds) {
        let end = start + size;
        let test = &order[start..end];

        let (train_x, train_y): (Vec<f64>, Vec<f64>) = order[..start]
            .iter()
            .chain(order[end..].iter())
            .map(|&i| (features[i], targets[i]))
            .unzip();

        let model = LinearRegression::fit(&train_x, &train_y)?;
        let prior = train_y.iter().sum::<f64>() / train_y.len() as f64;

        for &i in test {
            let predicted = model.predict(features[i]);
            let actual = targets[i];

            sum_abs_error += (predicted - actual).abs();
            sum_sq_error += (predicted - actual).powi(2);
            sum_abs_prior += (prior - actual).abs();
            sum_sq_prior += (prior - actual).powi(2);

            predictions.push(predicted);
            actuals.push(actual);
        }

        start = end;
    }

    let count = n as f64;
    let root_mean_squared_error = (sum_sq_error / count).sqrt();
    let root_mean_prior_squared_error = (sum_sq_prior / count).sqrt();
    let mean_absolute_error = sum_abs_error / count;
    let mean_prior_absolute_error = sum_abs_prior / count;

    Ok(RegressionEvaluation {
        instances: n,
        folds,
        root_mean_squared_error,
        root_relative_squared_error: 100.0 * root_mean_squared_error
            / root_mean_prior_squared_error,
        root_mean_prior_squared_error,
        mean_absolute_error,
        mean_prior_absolute_error,
        correlation_coefficient: correlation(&predictions, &actuals),
        error_rate: root_mean_squared_error,
    })
}

/// Pearson correlation, zero when either side has no variance
fn correlation(predictions: &[f64], actuals: &[f64]) -> f64 {
    if predictions.len() < 2 {
        return 0.0;
    }

    let predicted_sd = predictions.std_dev();
    let actual_sd = actuals.std_dev();
    if predicted_sd * actual_sd <= 0.0 || !(predicted_sd * actual_sd).is_finite() {
        return 0.0;
    }

    predictions.iter().covariance(actuals.iter()) / (predicted_sd * actual_sd)
}
