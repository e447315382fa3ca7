//! Configuration tables for prediction windows and model kinds
//!
//! Both enumerations are closed. Each variant maps to a row holding a
//! stable key, a display name and its numeric attributes, and lookups in
//! either direction are plain functions over the table.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizon over which prices are forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionWindow {
    OneDay,
    OneWeek,
    OneMonth,
    OneYear,
}

/// Attributes of a prediction window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub window: PredictionWindow,
    pub key: &'static str,
    pub display_name: &'static str,
    pub days: u32,
    pub seconds: i64,
}

/// Every prediction window, shortest first
pub const PREDICTION_WINDOWS: [WindowSpec; 4] = [
    WindowSpec {
        window: PredictionWindow::OneDay,
        key: "1d",
        display_name: "1 Day",
        days: 1,
        seconds: 86_400,
    },
    WindowSpec {
        window: PredictionWindow::OneWeek,
        key: "7d",
        display_name: "7 Days",
        days: 7,
        seconds: 604_800,
    },
    WindowSpec {
        window: PredictionWindow::OneMonth,
        key: "30d",
        display_name: "30 Days",
        days: 30,
        seconds: 2_592_000,
    },
    WindowSpec {
        window: PredictionWindow::OneYear,
        key: "365d",
        display_name: "365 Days",
        days: 365,
        seconds: 31_536_000,
    },
];

impl PredictionWindow {
    /// Table row for this window
    pub fn spec(self) -> &'static WindowSpec {
        match self {
            PredictionWindow::OneDay => &PREDICTION_WINDOWS[0],
            PredictionWindow::OneWeek => &PREDICTION_WINDOWS[1],
            PredictionWindow::OneMonth => &PREDICTION_WINDOWS[2],
            PredictionWindow::OneYear => &PREDICTION_WINDOWS[3],
        }
    }

    /// Length in calendar days
    pub fn days(self) -> u32 {
        self.spec().days
    }

    /// Length in seconds
    pub fn seconds(self) -> i64 {
        self.spec().seconds
    }

    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }
}

/// Look a window up by its display name, e.g. `"7 Days"`
pub fn window_from_display_name(name: &str) -> Option<PredictionWindow> {
    PREDICTION_WINDOWS
        .iter()
        .find(|spec| spec.display_name == name)
        .map(|spec| spec.window)
}

/// Look a window up by its stable key, e.g. `"7d"`
pub fn window_from_key(key: &str) -> Option<PredictionWindow> {
    PREDICTION_WINDOWS
        .iter()
        .find(|spec| spec.key.eq_ignore_ascii_case(key))
        .map(|spec| spec.window)
}

/// Display names in table order
pub fn window_display_names() -> Vec<&'static str> {
    PREDICTION_WINDOWS.iter().map(|spec| spec.display_name).collect()
}

impl fmt::Display for PredictionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PredictionWindow {
    type Err = ForecastError;

    /// Accepts either the key or the display name
    fn from_str(s: &str) -> Result<Self> {
        window_from_key(s.trim())
            .or_else(|| window_from_display_name(s.trim()))
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Unknown prediction window '{}'; expected one of {:?}",
                    s,
                    window_display_names()
                ))
            })
    }
}

/// Forecasting backend family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Regression,
    TimeSeries,
}

/// Attributes of a model kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub key: &'static str,
    pub display_name: &'static str,
    /// Years of history fetched before fitting
    pub default_lookback_years: u32,
}

/// Every model kind
pub const MODEL_KINDS: [ModelSpec; 2] = [
    ModelSpec {
        kind: ModelKind::Regression,
        key: "regression",
        display_name: "Linear Regression",
        default_lookback_years: 5,
    },
    ModelSpec {
        kind: ModelKind::TimeSeries,
        key: "arima",
        display_name: "ARIMA",
        default_lookback_years: 2,
    },
];

impl ModelKind {
    /// Table row for this kind
    pub fn spec(self) -> &'static ModelSpec {
        match self {
            ModelKind::Regression => &MODEL_KINDS[0],
            ModelKind::TimeSeries => &MODEL_KINDS[1],
        }
    }

    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn default_lookback_years(self) -> u32 {
        self.spec().default_lookback_years
    }
}

/// Look a model kind up by its display name, e.g. `"ARIMA"`
pub fn model_from_display_name(name: &str) -> Option<ModelKind> {
    MODEL_KINDS
        .iter()
        .find(|spec| spec.display_name == name)
        .map(|spec| spec.kind)
}

/// Look a model kind up by its stable key, e.g. `"arima"`
pub fn model_from_key(key: &str) -> Option<ModelKind> {
    MODEL_KINDS
        .iter()
        .find(|spec| spec.key.eq_ignore_ascii_case(key))
        .map(|spec| spec.kind)
}

/// Display names in table order
pub fn model_display_names() -> Vec<&'static str> {
    MODEL_KINDS.iter().map(|spec| spec.display_name).collect()
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    /// Accepts either the key or the display name
    fn from_str(s: &str) -> Result<Self> {
        model_from_key(s.trim())
            .or_else(|| model_from_display_name(s.trim()))
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Unknown model '{}'; expected one of {:?}",
                    s,
                    model_display_names()
                ))
            })
    }
}
