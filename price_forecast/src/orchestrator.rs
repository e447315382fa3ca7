//! End-to-end forecast requests
//!
//! [`ForecastOrchestrator::run`] validates the ticker, fetches history,
//! fits a fresh backend of the requested kind and predicts over the
//! requested window. The fitted backend stays available to
//! [`ForecastOrchestrator::evaluate`] until the next run.

use crate::calendar::{shift_days, working_days, Clock, SystemClock};
use crate::catalog::{ModelKind, PredictionWindow};
use crate::config::AppConfig;
use crate::data::{HistoricalDataProvider, MarketDataSource};
use crate::engine::{build_engine, ForecastEngine, NativeArimaEngine};
use crate::error::{ForecastError, Result};
use crate::metrics::EvaluationMetrics;
use crate::models::{
    Backend, ForecastTarget, ModelBackend, RegressionBackend, TimeSeriesBackend,
};
use crate::registry::TickerRegistry;
use crate::series::{ForecastResult, PricePoint, PriceSeries};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tunables of a forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub regression_lookback_years: u32,
    pub time_series_lookback_years: u32,
    pub seasonal_period: usize,
    pub cv_folds: usize,
    pub cv_seed: u64,
    /// Append the first forecast point to the returned historic series
    pub splice_forecast: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for OrchestratorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            regression_lookback_years: config.models.regression_lookback_years,
            time_series_lookback_years: config.models.time_series_lookback_years,
            seasonal_period: config.models.seasonal_period,
            cv_folds: config.models.cv_folds,
            cv_seed: config.models.cv_seed,
            splice_forecast: config.output.splice_forecast,
        }
    }
}

impl OrchestratorSettings {
    fn lookback_years(&self, kind: ModelKind) -> u32 {
        match kind {
            ModelKind::Regression => self.regression_lookback_years,
            ModelKind::TimeSeries => self.time_series_lookback_years,
        }
    }
}

/// Outcome of one successful run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    pub ticker: String,
    pub window: PredictionWindow,
    pub kind: ModelKind,
    /// Fetched history, plus the first forecast point when splicing is on
    pub historic: PriceSeries,
    pub forecast: ForecastResult,
}

impl ForecastRun {
    /// History followed by the forecast, in date order
    pub fn combined(&self) -> BTreeMap<NaiveDate, f64> {
        let mut combined = self.historic.as_map().clone();
        combined.extend(self.forecast.iter());
        combined
    }
}

/// Drives fetch, fit and predict for one ticker at a time
#[derive(Debug)]
pub struct ForecastOrchestrator<S, R> {
    provider: HistoricalDataProvider<S>,
    registry: R,
    engine: Arc<dyn ForecastEngine>,
    clock: Arc<dyn Clock>,
    settings: OrchestratorSettings,
    backend: Option<Backend>,
    series: Option<PriceSeries>,
}

impl<S: MarketDataSource, R: TickerRegistry> ForecastOrchestrator<S, R> {
    /// Orchestrator on the system clock with the in-process ARIMA engine
    pub fn new(source: S, registry: R, settings: OrchestratorSettings) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            provider: HistoricalDataProvider::new(source).with_clock(clock.clone()),
            registry,
            engine: Arc::new(NativeArimaEngine::default()),
            clock,
            settings,
            backend: None,
            series: None,
        }
    }

    /// Orchestrator wired from application configuration
    pub fn from_config(source: S, registry: R, config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let mut orchestrator = Self::new(source, registry, OrchestratorSettings::from(config))
            .with_engine(build_engine(
                config.models.engine,
                &config.models.rscript_path,
                config.models.engine_timeout(),
            ));
        orchestrator.provider = orchestrator
            .provider
            .with_window_days(config.data_source.window_days)?;
        Ok(orchestrator)
    }

    /// Replace the clock used for fetch windows and forecast dates
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.provider = self.provider.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn ForecastEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn provider(&self) -> &HistoricalDataProvider<S> {
        &self.provider
    }

    /// Backend of the last successful fit
    pub fn backend(&self) -> Option<&Backend> {
        self.backend.as_ref()
    }

    /// History the current backend was fitted on
    pub fn current_series(&self) -> Option<&PriceSeries> {
        self.series.as_ref()
    }

    /// Forecast `ticker` over `window` with a fresh backend of `kind`
    pub fn run(
        &mut self,
        ticker: &str,
        window: PredictionWindow,
        kind: ModelKind,
    ) -> Result<ForecastRun> {
        self.backend = None;
        self.series = None;

        let ticker = ticker.trim();
        if !self.registry.is_valid(ticker) {
            warn!("Rejected unknown ticker '{}'", ticker);
            return Err(ForecastError::InvalidTicker(ticker.to_string()));
        }
        let ticker = self
            .registry
            .lookup(ticker)
            .map(|stock| stock.ticker)
            .unwrap_or_else(|| ticker.to_string());

        info!("Forecasting {} over {} with {}", ticker, window, kind);

        let series = self
            .provider
            .fetch_series(&ticker, self.settings.lookback_years(kind))?;

        let mut backend = self.new_backend(kind);
        backend.fit(&series)?;

        // A fitted backend stays evaluable even if the prediction below fails
        let target = self.target_for(kind, window);
        debug!("Prediction target: {:?}", target);
        let forecast = self.backend.insert(backend).predict(&target);
        self.series = Some(series.clone());
        let forecast = forecast?;

        let mut historic = series;
        if self.settings.splice_forecast {
            if let Some((date, close)) = forecast.first() {
                historic.insert(PricePoint { date, close });
            }
        }

        info!("Produced {} forecast points for {}", forecast.len(), ticker);
        Ok(ForecastRun {
            ticker,
            window,
            kind,
            historic,
            forecast,
        })
    }

    /// Metrics of the backend fitted by the last successful run
    pub fn evaluate(&self) -> Result<EvaluationMetrics> {
        match &self.backend {
            Some(backend) => backend.evaluate(),
            None => Err(ForecastError::ModelNotFitted(
                "No forecast has been generated yet".to_string(),
            )),
        }
    }

    fn new_backend(&self, kind: ModelKind) -> Backend {
        match kind {
            ModelKind::Regression => {
                RegressionBackend::new(self.settings.cv_folds, self.settings.cv_seed).into()
            }
            ModelKind::TimeSeries => TimeSeriesBackend::new(
                self.engine.clone(),
                self.clock.clone(),
                self.settings.seasonal_period,
            )
            .into(),
        }
    }

    fn target_for(&self, kind: ModelKind, window: PredictionWindow) -> ForecastTarget {
        match kind {
            ModelKind::Regression => {
                let today = self.clock.today();
                let end = shift_days(today, i64::from(window.days()));
                ForecastTarget::Dates(working_days(today, end))
            }
            ModelKind::TimeSeries => ForecastTarget::Horizon(window.days() as usize),
        }
    }
}
