//! Error types for the price_forecast crate

use forecast_math::MathError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Market data could not be fetched or was unusable
    #[error("Data source error: {0}")]
    DataSource(String),

    /// The fitting engine rejected the input
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// predict/evaluate was called before a successful fit
    #[error("Model not fitted: {0}")]
    ModelNotFitted(String),

    /// The ticker is not in the registry
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::ModelFit(err.to_string())
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::DataSource(err.to_string())
    }
}

impl ForecastError {
    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::DataSource(detail) => {
                format!("Price data is currently unavailable: {}", detail)
            }
            ForecastError::ModelFit(detail) => {
                format!("A forecast could not be produced for this stock: {}", detail)
            }
            ForecastError::ModelNotFitted(_) => "Please choose a stock and a prediction window \
                 and generate a forecast before requesting evaluation metrics."
                .to_string(),
            ForecastError::InvalidTicker(ticker) => {
                format!("'{}' is not a supported stock ticker.", ticker)
            }
            other => other.to_string(),
        }
    }
}
