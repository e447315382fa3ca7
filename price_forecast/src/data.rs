//! Historical price acquisition
//!
//! A [`MarketDataSource`] answers one daily-candle query at a time. The
//! upstream API limits how much history a single query may cover, so
//! [`HistoricalDataProvider`] plans a chain of fixed-length windows walking
//! backward from today and merges the answers into one [`PriceSeries`].

use crate::calendar::{shift_days, unix_seconds, Clock, SystemClock};
use crate::error::{ForecastError, Result};
use crate::series::{PricePoint, PriceSeries};
use chrono::{DateTime, NaiveDate};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Days covered by one upstream query
pub const DEFAULT_WINDOW_DAYS: u32 = 365;

const SECONDS_PER_DAY: i64 = 86_400;

/// Daily candle payload; only closes and timestamps are kept
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CandleResponse {
    /// Closing prices
    #[serde(default)]
    pub c: Vec<f64>,
    /// Unix timestamps in seconds, parallel to `c`
    #[serde(default)]
    pub t: Vec<i64>,
    /// Status, `"ok"` or `"no_data"`
    #[serde(default)]
    pub s: String,
}

impl CandleResponse {
    /// Pair closes with their dates.
    ///
    /// `no_data` yields an empty list. Mismatched arrays and unknown
    /// statuses are data-source errors.
    pub fn into_points(self) -> Result<Vec<(NaiveDate, f64)>> {
        match self.s.as_str() {
            "no_data" => return Ok(Vec::new()),
            "ok" => {}
            other => {
                return Err(ForecastError::DataSource(format!(
                    "Unexpected candle status '{}'",
                    other
                )))
            }
        }

        if self.c.len() != self.t.len() {
            return Err(ForecastError::DataSource(format!(
                "Candle arrays differ in length: {} closes, {} timestamps",
                self.c.len(),
                self.t.len()
            )));
        }

        self.t
            .into_iter()
            .zip(self.c)
            .map(|(ts, close)| {
                DateTime::from_timestamp(ts, 0)
                    .map(|dt| (dt.date_naive(), close))
                    .ok_or_else(|| {
                        ForecastError::DataSource(format!("Timestamp {} out of range", ts))
                    })
            })
            .collect()
    }
}

/// Blocking daily-candle query against a market-data service
pub trait MarketDataSource {
    /// Daily candles for `ticker` between two Unix timestamps, inclusive
    fn daily_candles(&self, ticker: &str, from: i64, to: i64) -> Result<CandleResponse>;
}

impl<S: MarketDataSource + ?Sized> MarketDataSource for &S {
    fn daily_candles(&self, ticker: &str, from: i64, to: i64) -> Result<CandleResponse> {
        (**self).daily_candles(ticker, from, to)
    }
}

impl<S: MarketDataSource + ?Sized> MarketDataSource for Arc<S> {
    fn daily_candles(&self, ticker: &str, from: i64, to: i64) -> Result<CandleResponse> {
        (**self).daily_candles(ticker, from, to)
    }
}

impl<S: MarketDataSource + ?Sized> MarketDataSource for Box<S> {
    fn daily_candles(&self, ticker: &str, from: i64, to: i64) -> Result<CandleResponse> {
        (**self).daily_candles(ticker, from, to)
    }
}

/// Finnhub REST client
#[derive(Debug, Clone)]
pub struct FinnhubSource {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl FinnhubSource {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ForecastError::Config(
                "A market data API key is required".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl MarketDataSource for FinnhubSource {
    fn daily_candles(&self, ticker: &str, from: i64, to: i64) -> Result<CandleResponse> {
        let url = format!("{}/stock/candle", self.base_url);
        let from = from.to_string();
        let to = to.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", ticker),
                ("resolution", "D"),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("token", self.api_key.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::DataSource(format!(
                "Market data request for {} failed with status {}",
                ticker, status
            )));
        }

        Ok(response.json::<CandleResponse>()?)
    }
}

/// One query range, both dates inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    /// Unix seconds of 00:00:00 UTC on the first day
    pub fn from_timestamp(&self) -> i64 {
        unix_seconds(self.start)
    }

    /// Unix seconds of 23:59:59 UTC on the last day
    pub fn to_timestamp(&self) -> i64 {
        unix_seconds(self.end) + SECONDS_PER_DAY - 1
    }
}

/// Assembles multi-year daily series from a [`MarketDataSource`]
#[derive(Debug)]
pub struct HistoricalDataProvider<S> {
    source: S,
    clock: Arc<dyn Clock>,
    window_days: u32,
}

impl<S: MarketDataSource> HistoricalDataProvider<S> {
    /// Provider using the system clock and yearly windows
    pub fn new(source: S) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Change the span of a single query; zero is rejected
    pub fn with_window_days(mut self, window_days: u32) -> Result<Self> {
        if window_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "Fetch window must span at least one day".to_string(),
            ));
        }
        self.window_days = window_days;
        Ok(self)
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Plan `years_back` windows, newest first.
    ///
    /// The first window ends today. Each next window ends the day before
    /// the previous one starts.
    pub fn windows(&self, years_back: u32) -> Vec<FetchWindow> {
        let mut windows = Vec::with_capacity(years_back as usize);
        let mut end = self.clock.today();

        for _ in 0..years_back {
            let start = shift_days(end, -i64::from(self.window_days));
            windows.push(FetchWindow { start, end });
            end = shift_days(start, -1);
        }

        debug!(
            "Planned {} fetch windows of {} days",
            windows.len(),
            self.window_days
        );
        windows
    }

    /// Fetch and merge `years_back` windows of daily closes for `ticker`.
    ///
    /// The first failing window aborts the fetch and nothing is returned.
    /// A fetch that completes without any point is also an error.
    pub fn fetch_series(&self, ticker: &str, years_back: u32) -> Result<PriceSeries> {
        if years_back == 0 {
            return Err(ForecastError::InvalidParameter(
                "At least one year of history must be requested".to_string(),
            ));
        }

        info!("Fetching {} years of daily closes for {}", years_back, ticker);
        let mut series = PriceSeries::new();

        for window in self.windows(years_back) {
            let points = self
                .source
                .daily_candles(ticker, window.from_timestamp(), window.to_timestamp())
                .and_then(CandleResponse::into_points)
                .map_err(|err| {
                    error!(
                        "Fetch for {} aborted at window {} to {}: {}",
                        ticker, window.start, window.end, err
                    );
                    match err {
                        ForecastError::DataSource(_) => err,
                        other => ForecastError::DataSource(other.to_string()),
                    }
                })?;

            debug!(
                "Window {} to {} returned {} candles",
                window.start,
                window.end,
                points.len()
            );

            for (date, close) in points {
                match PricePoint::new(date, close) {
                    Ok(point) => series.insert(point),
                    Err(err) => warn!("Skipping candle for {}: {}", ticker, err),
                }
            }
        }

        if series.is_empty() {
            return Err(ForecastError::DataSource(format!(
                "No price data available for {}",
                ticker
            )));
        }

        info!("Assembled {} daily closes for {}", series.len(), ticker);
        Ok(series)
    }
}
