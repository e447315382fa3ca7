#![allow(dead_code)]

use chrono::{DateTime, NaiveDate};
use price_forecast::calendar::{is_business_day, unix_seconds, FixedClock};
use price_forecast::data::{CandleResponse, MarketDataSource};
use price_forecast::error::{ForecastError, Result};
use price_forecast::registry::{StaticTickerRegistry, Stock};
use price_forecast::series::{PricePoint, PriceSeries};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::cell::RefCell;
use std::sync::Arc;

/// Friday 2024-06-14
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(today()))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Trend plus a 100-observation cycle plus seeded noise, keyed by date
pub fn synthetic_close(day: NaiveDate) -> f64 {
    let index = (unix_seconds(day) / 86_400) as f64;
    let mut rng = StdRng::seed_from_u64(index as u64);
    let noise = Normal::new(0.0, 0.5).unwrap().sample(&mut rng);
    100.0 + 0.02 * index - 300.0 + 4.0 * (2.0 * std::f64::consts::PI * index / 100.0).sin() + noise
}

/// Business-day series ending at `end`
pub fn synthetic_series(end: NaiveDate, calendar_days: i64) -> PriceSeries {
    let start = end - chrono::Duration::days(calendar_days);
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .map(|d| PricePoint::new(d, synthetic_close(d)).unwrap())
        .collect()
}

/// Market data stub recording every query
#[derive(Debug, Default)]
pub struct StubSource {
    pub calls: RefCell<Vec<(String, i64, i64)>>,
    /// Zero-based call index that fails
    pub fail_on_call: Option<usize>,
    /// Answer every query with `no_data`
    pub empty: bool,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self {
            empty: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl MarketDataSource for StubSource {
    fn daily_candles(&self, ticker: &str, from: i64, to: i64) -> Result<CandleResponse> {
        let call = self.call_count();
        self.calls.borrow_mut().push((ticker.to_string(), from, to));

        if self.fail_on_call == Some(call) {
            return Err(ForecastError::DataSource("connection reset".to_string()));
        }
        if self.empty {
            return Ok(CandleResponse {
                s: "no_data".to_string(),
                ..CandleResponse::default()
            });
        }

        let first = DateTime::from_timestamp(from, 0).unwrap().date_naive();
        let last = DateTime::from_timestamp(to, 0).unwrap().date_naive();
        let days: Vec<NaiveDate> = first
            .iter_days()
            .take_while(|d| *d <= last)
            .filter(|d| is_business_day(*d))
            .collect();

        Ok(CandleResponse {
            c: days.iter().map(|d| synthetic_close(*d)).collect(),
            t: days.iter().map(|d| unix_seconds(*d)).collect(),
            s: "ok".to_string(),
        })
    }
}

pub fn registry() -> StaticTickerRegistry {
    StaticTickerRegistry::new(vec![
        Stock {
            ticker: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
        },
        Stock {
            ticker: "MSFT".to_string(),
            name: "Microsoft Corporation".to_string(),
        },
    ])
}
