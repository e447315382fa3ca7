//! Date-keyed price series
//!
//! Both the historic input of a model and its forecast are ordered maps
//! from calendar date to closing price. Keys are unique and iterate in
//! ascending order.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// One daily closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    /// Create a point, rejecting non-finite or negative prices
    pub fn new(date: NaiveDate, close: f64) -> Result<Self> {
        if !close.is_finite() || close < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Invalid closing price {} on {}",
                close, date
            )));
        }
        Ok(Self { date, close })
    }
}

/// Historic daily closing prices keyed by date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point; a later insert for the same date replaces the earlier one
    pub fn insert(&mut self, point: PricePoint) {
        self.points.insert(point.date, point.close);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.points.get(date).copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    /// Dates in ascending order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.keys().copied().collect()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.points
            .iter()
            .map(|(date, close)| PricePoint { date: *date, close: *close })
    }

    /// Borrow the underlying ordered map
    pub fn as_map(&self) -> &BTreeMap<NaiveDate, f64> {
        &self.points
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        let mut series = PriceSeries::new();
        for point in iter {
            series.insert(point);
        }
        series
    }
}

impl Extend<PricePoint> for PriceSeries {
    fn extend<I: IntoIterator<Item = PricePoint>>(&mut self, iter: I) {
        for point in iter {
            self.insert(point);
        }
    }
}

impl IntoIterator for PriceSeries {
    type Item = (NaiveDate, f64);
    type IntoIter = btree_map::IntoIter<NaiveDate, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

/// Predicted closing prices keyed by future date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    predictions: BTreeMap<NaiveDate, f64>,
}

impl ForecastResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair dates with values one to one.
    ///
    /// Dates must be strictly increasing and the two lengths must agree.
    pub fn from_pairs(dates: &[NaiveDate], values: &[f64]) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        if dates.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ForecastError::InvalidParameter(
                "Forecast dates must be strictly increasing".to_string(),
            ));
        }

        Ok(Self {
            predictions: dates.iter().copied().zip(values.iter().copied()).collect(),
        })
    }

    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        self.predictions.insert(date, value);
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.predictions.get(date).copied()
    }

    /// Earliest predicted point
    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        self.predictions.iter().next().map(|(d, v)| (*d, *v))
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.predictions.keys().copied().collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.predictions.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.predictions.iter().map(|(d, v)| (*d, *v))
    }

    pub fn as_map(&self) -> &BTreeMap<NaiveDate, f64> {
        &self.predictions
    }
}
