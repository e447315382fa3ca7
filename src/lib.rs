//! # Stock Predictor
//!
//! Facade over the workspace crates.
//!
//! - [`forecast_math`]: regression, cross-validation and automatic ARIMA on plain slices
//! - [`price_forecast`]: the forecast pipeline from ticker to dated predictions
//!
//! ## Example
//!
//! ```
//! use stock_predictor_workspace::price_forecast::calendar::working_days;
//! use chrono::NaiveDate;
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let next_monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
//! assert_eq!(working_days(monday, next_monday).len(), 4);
//! ```

pub use forecast_math;
pub use price_forecast;
