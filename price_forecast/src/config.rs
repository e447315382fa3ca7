//! Application configuration
//!
//! Settings come either from a JSON file or from environment variables
//! (with `.env` support). The market data API key has no default.

use crate::catalog::ModelKind;
use crate::engine::EngineKind;
use crate::error::{ForecastError, Result};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Top level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Market data service
    pub data_source: DataSourceConfig,

    /// Model fitting
    pub models: ModelConfig,

    /// Result shaping
    pub output: OutputConfig,

    /// Logging
    pub logging: LoggingConfig,
}

/// Market data service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    /// REST base URL
    pub base_url: String,

    /// API token
    pub api_key: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Days covered by one request
    pub window_days: u32,
}

/// Model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Years of history for the regression backend
    pub regression_lookback_years: u32,

    /// Years of history for the ARIMA backend
    pub time_series_lookback_years: u32,

    /// Seasonal period of the ARIMA backend
    pub seasonal_period: usize,

    /// Cross-validation folds
    pub cv_folds: usize,

    /// Cross-validation shuffle seed
    pub cv_seed: u64,

    /// ARIMA engine
    pub engine: EngineKind,

    /// Rscript executable for the external engine
    pub rscript_path: PathBuf,

    /// Timeout of one external engine run in seconds
    pub engine_timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Append the first forecast point to the historic series
    pub splice_forecast: bool,

    /// CSV file of supported tickers
    pub ticker_file: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://finnhub.io/api/v1".to_string(),
            api_key: String::new(),
            request_timeout_secs: 20,
            window_days: crate::data::DEFAULT_WINDOW_DAYS,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            regression_lookback_years: ModelKind::Regression.default_lookback_years(),
            time_series_lookback_years: ModelKind::TimeSeries.default_lookback_years(),
            seasonal_period: crate::models::time_series::DEFAULT_SEASONAL_PERIOD,
            cv_folds: crate::models::regression::DEFAULT_FOLDS,
            cv_seed: crate::models::regression::DEFAULT_SEED,
            engine: EngineKind::Native,
            rscript_path: PathBuf::from("Rscript"),
            engine_timeout_secs: 120,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            splice_forecast: true,
            ticker_file: PathBuf::from("companies.csv"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            to_file: false,
            file_path: None,
        }
    }
}

impl DataSourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ModelConfig {
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a key lookup, defaulting absent keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let data_source = DataSourceConfig {
            base_url: lookup("FINNHUB_BASE_URL").unwrap_or(defaults.data_source.base_url),
            api_key: lookup("FINNHUB_API_KEY").ok_or_else(|| {
                ForecastError::Config("Missing FINNHUB_API_KEY environment variable".to_string())
            })?,
            request_timeout_secs: parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                defaults.data_source.request_timeout_secs,
            )?,
            window_days: parse_or(&lookup, "FETCH_WINDOW_DAYS", defaults.data_source.window_days)?,
        };

        let engine = match lookup("FORECAST_ENGINE") {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "native" => EngineKind::Native,
                "rscript" => EngineKind::Rscript,
                other => {
                    return Err(ForecastError::Config(format!(
                        "Unknown FORECAST_ENGINE '{}'; expected native or rscript",
                        other
                    )))
                }
            },
            None => defaults.models.engine,
        };

        let models = ModelConfig {
            regression_lookback_years: parse_or(
                &lookup,
                "REGRESSION_LOOKBACK_YEARS",
                defaults.models.regression_lookback_years,
            )?,
            time_series_lookback_years: parse_or(
                &lookup,
                "ARIMA_LOOKBACK_YEARS",
                defaults.models.time_series_lookback_years,
            )?,
            seasonal_period: parse_or(&lookup, "SEASONAL_PERIOD", defaults.models.seasonal_period)?,
            cv_folds: parse_or(&lookup, "CV_FOLDS", defaults.models.cv_folds)?,
            cv_seed: parse_or(&lookup, "CV_SEED", defaults.models.cv_seed)?,
            engine,
            rscript_path: lookup("RSCRIPT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.models.rscript_path),
            engine_timeout_secs: parse_or(
                &lookup,
                "ENGINE_TIMEOUT_SECS",
                defaults.models.engine_timeout_secs,
            )?,
        };

        let output = OutputConfig {
            splice_forecast: parse_or(&lookup, "SPLICE_FORECAST", defaults.output.splice_forecast)?,
            ticker_file: lookup("TICKER_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.output.ticker_file),
        };

        let logging = LoggingConfig {
            level: lookup("LOG_LEVEL").unwrap_or(defaults.logging.level),
            to_file: parse_or(&lookup, "LOG_TO_FILE", defaults.logging.to_file)?,
            file_path: lookup("LOG_FILE_PATH"),
        };

        let config = AppConfig {
            data_source,
            models,
            output,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path.as_ref()).map_err(|e| {
            ForecastError::Config(format!(
                "Failed to open config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ForecastError::Config(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&contents)
            .map_err(|e| ForecastError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.data_source.window_days == 0 {
            return Err(ForecastError::Config(
                "window_days must be at least 1".to_string(),
            ));
        }
        if self.models.regression_lookback_years == 0 || self.models.time_series_lookback_years == 0
        {
            return Err(ForecastError::Config(
                "Lookback must be at least one year".to_string(),
            ));
        }
        if self.models.seasonal_period < 2 {
            return Err(ForecastError::Config(
                "seasonal_period must be at least 2".to_string(),
            ));
        }
        if self.models.cv_folds < 2 {
            return Err(ForecastError::Config(
                "cv_folds must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    /// Log level filter named by `logging.level`, `Info` when unrecognized
    pub fn log_level(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> Result<()> {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(self.log_level());

        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    ForecastError::Config(format!("Failed to create log file: {}", e))
                })?;
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder
            .try_init()
            .map_err(|e| ForecastError::Config(format!("Logger already initialized: {}", e)))
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            ForecastError::Config(format!("Invalid value '{}' for {}", raw, key))
        }),
        None => Ok(default),
    }
}
