//! # Forecast Math
//!
//! Numerical building blocks for closing-price forecasting.
//! This crate has no I/O: it fits models to plain `f64` slices and
//! reports their error statistics.
//!
//! - [`regression`]: single-feature ordinary least squares
//! - [`cross_validation`]: seeded k-fold evaluation of the regression
//! - [`linalg`]: dense least-squares solver used by the ARIMA fitter
//! - [`arima`]: automatic seasonal ARIMA order selection and forecasting
//! - [`accuracy`]: training-set accuracy vector of a fitted forecaster

use thiserror::Error;

pub mod accuracy;
pub mod arima;
pub mod cross_validation;
pub mod linalg;
pub mod regression;

pub use accuracy::AccuracyVector;
pub use arima::{ArimaFit, ArimaOrder, AutoArima};
pub use cross_validation::{cross_validate, RegressionEvaluation};
pub use regression::LinearRegression;

/// Errors that can occur in forecasting calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;
