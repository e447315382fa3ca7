//! Supported tickers

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// A listed company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub ticker: String,
    pub name: String,
}

/// Lookup of the tickers a forecast may be requested for
pub trait TickerRegistry {
    /// True if `ticker` is known
    fn is_valid(&self, ticker: &str) -> bool;

    /// Full record for `ticker`
    fn lookup(&self, ticker: &str) -> Option<Stock>;

    /// All known tickers in ascending order
    fn tickers(&self) -> Vec<String>;
}

impl<R: TickerRegistry + ?Sized> TickerRegistry for &R {
    fn is_valid(&self, ticker: &str) -> bool {
        (**self).is_valid(ticker)
    }

    fn lookup(&self, ticker: &str) -> Option<Stock> {
        (**self).lookup(ticker)
    }

    fn tickers(&self) -> Vec<String> {
        (**self).tickers()
    }
}

/// Registry loaded once from a `ticker,name` table.
///
/// Tickers are compared case-insensitively and stored upper case.
#[derive(Debug, Clone, Default)]
pub struct StaticTickerRegistry {
    stocks: BTreeMap<String, Stock>,
}

impl StaticTickerRegistry {
    pub fn new<I: IntoIterator<Item = Stock>>(stocks: I) -> Self {
        let stocks = stocks
            .into_iter()
            .map(|stock| {
                let ticker = normalize(&stock.ticker);
                (ticker.clone(), Stock { ticker, name: stock.name })
            })
            .collect();
        Self { stocks }
    }

    /// Load from a CSV file with a `ticker,name` header
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::read_records(reader)
    }

    /// Load from any reader producing `ticker,name` CSV
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::read_records(csv::Reader::from_reader(reader))
    }

    fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut stocks = Vec::new();
        for record in reader.deserialize::<Stock>() {
            let stock = record?;
            if !stock.ticker.trim().is_empty() {
                stocks.push(stock);
            }
        }
        Ok(Self::new(stocks))
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}

impl TickerRegistry for StaticTickerRegistry {
    fn is_valid(&self, ticker: &str) -> bool {
        self.stocks.contains_key(&normalize(ticker))
    }

    fn lookup(&self, ticker: &str) -> Option<Stock> {
        self.stocks.get(&normalize(ticker)).cloned()
    }

    fn tickers(&self) -> Vec<String> {
        self.stocks.keys().cloned().collect()
    }
}

fn normalize(ticker: &str) -> String {
    ticker.trim().to_ascii_uppercase()
}
