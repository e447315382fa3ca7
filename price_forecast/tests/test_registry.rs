use pretty_assertions::assert_eq;
use price_forecast::error::ForecastError;
use price_forecast::registry::{StaticTickerRegistry, Stock, TickerRegistry};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_registry_from_csv_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ticker,name").unwrap();
    writeln!(file, "AAPL,Apple Inc.").unwrap();
    writeln!(file, "MSFT,Microsoft Corporation").unwrap();
    writeln!(file, "\"BRK.B\",\"Berkshire Hathaway, Inc.\"").unwrap();
    file.flush().unwrap();

    let registry = StaticTickerRegistry::from_csv(file.path()).unwrap();

    assert_eq!(registry.len(), 3);
    assert!(registry.is_valid("AAPL"));
    assert!(registry.is_valid("msft"));
    assert!(!registry.is_valid("UNKNOWN_TICKER"));
    assert_eq!(
        registry.lookup("brk.b"),
        Some(Stock {
            ticker: "BRK.B".to_string(),
            name: "Berkshire Hathaway, Inc.".to_string(),
        })
    );
    assert_eq!(registry.tickers(), vec!["AAPL", "BRK.B", "MSFT"]);
}

#[test]
fn test_registry_from_reader_skips_blank_tickers() {
    let data = "ticker,name\nGOOG,Alphabet Inc.\n,Nameless\n";
    let registry = StaticTickerRegistry::from_reader(data.as_bytes()).unwrap();

    assert_eq!(registry.tickers(), vec!["GOOG"]);
    assert_eq!(registry.lookup("GOOG").unwrap().name, "Alphabet Inc.");
}

#[test]
fn test_registry_missing_file_is_csv_error() {
    let result = StaticTickerRegistry::from_csv("/nonexistent/companies.csv");
    assert!(matches!(result, Err(ForecastError::Csv(_))));
}

#[test]
fn test_registry_malformed_row() {
    let data = "ticker,name\nAAPL\n";
    assert!(StaticTickerRegistry::from_reader(data.as_bytes()).is_err());
}

#[test]
fn test_empty_registry_rejects_everything() {
    let registry = StaticTickerRegistry::default();
    assert!(registry.is_empty());
    assert!(!registry.is_valid("AAPL"));
    assert_eq!(registry.lookup("AAPL"), None);
}
