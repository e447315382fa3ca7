//! # Price Forecast
//!
//! Forecasts a stock's near-future closing prices from its daily history.
//!
//! ## Features
//!
//! - Multi-year daily history assembled from a market-data REST service
//! - Two interchangeable backends: linear regression on time, and
//!   automatic seasonal ARIMA
//! - Business-day and calendar-day horizon arithmetic
//! - Cross-validated and training-set evaluation metrics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use price_forecast::config::AppConfig;
//! use price_forecast::data::FinnhubSource;
//! use price_forecast::registry::StaticTickerRegistry;
//! use price_forecast::{ForecastOrchestrator, ModelKind, PredictionWindow};
//!
//! let config = AppConfig::from_env()?;
//! let source = FinnhubSource::new(
//!     &config.data_source.base_url,
//!     &config.data_source.api_key,
//!     config.data_source.request_timeout(),
//! )?;
//! let registry = StaticTickerRegistry::from_csv(&config.output.ticker_file)?;
//!
//! let mut orchestrator = ForecastOrchestrator::from_config(source, registry, &config)?;
//! let run = orchestrator.run("AAPL", PredictionWindow::OneWeek, ModelKind::TimeSeries)?;
//! for (date, price) in run.forecast.iter() {
//!     println!("{} {:.2}", date, price);
//! }
//! println!("{}", orchestrator.evaluate()?);
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod calendar;
pub mod catalog;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod registry;
pub mod series;

// Re-export commonly used types
pub use crate::catalog::{ModelKind, PredictionWindow};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::EvaluationMetrics;
pub use crate::models::{Backend, ForecastTarget, ModelBackend};
pub use crate::orchestrator::{ForecastOrchestrator, ForecastRun, OrchestratorSettings};
pub use crate::series::{ForecastResult, PricePoint, PriceSeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
