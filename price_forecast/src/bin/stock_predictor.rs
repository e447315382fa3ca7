//! Command line front end for the forecast pipeline
//!
//! ```text
//! stock_predictor AAPL --window 7d --model arima --evaluate
//! ```

use clap::Parser;
use log::error;
use price_forecast::config::AppConfig;
use price_forecast::data::FinnhubSource;
use price_forecast::registry::{StaticTickerRegistry, TickerRegistry};
use price_forecast::{ForecastError, ForecastOrchestrator, ModelKind, PredictionWindow, Result};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Forecast a stock's closing price")]
struct Args {
    /// Ticker symbol, e.g. AAPL
    ticker: Option<String>,

    /// Prediction window: 1d, 7d, 30d, 365d or a display name such as "7 Days"
    #[arg(short, long, default_value = "7d")]
    window: String,

    /// Model: regression, arima or a display name such as "Linear Regression"
    #[arg(short, long, default_value = "regression")]
    model: String,

    /// Print evaluation metrics after the forecast
    #[arg(short, long)]
    evaluate: bool,

    /// JSON configuration file; environment variables are used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV file of supported tickers, overriding the configured one
    #[arg(short, long)]
    tickers: Option<PathBuf>,

    /// List supported tickers and exit
    #[arg(long)]
    list: bool,

    /// Print the historic and forecast series as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };
    if let Some(path) = args.tickers {
        config.output.ticker_file = path;
    }
    config.init_logging()?;

    let registry = StaticTickerRegistry::from_csv(&config.output.ticker_file)?;
    if args.list {
        for ticker in registry.tickers() {
            if let Some(stock) = registry.lookup(&ticker) {
                println!("{:<8} {}", stock.ticker, stock.name);
            }
        }
        return Ok(());
    }

    let ticker = args.ticker.ok_or_else(|| {
        ForecastError::InvalidParameter("A ticker symbol is required".to_string())
    })?;
    let window: PredictionWindow = args.window.parse()?;
    let kind: ModelKind = args.model.parse()?;

    let source = FinnhubSource::new(
        &config.data_source.base_url,
        &config.data_source.api_key,
        config.data_source.request_timeout(),
    )?;
    let mut orchestrator = ForecastOrchestrator::from_config(source, registry, &config)?;
    let run = orchestrator.run(&ticker, window, kind)?;

    if args.json {
        let output = serde_json::json!({
            "ticker": run.ticker,
            "window": run.window.display_name(),
            "model": run.kind.display_name(),
            "historic": run.historic.as_map(),
            "forecast": run.forecast.as_map(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} forecast for {} over {}", run.kind, run.ticker, run.window);
        if run.forecast.is_empty() {
            println!("(no business days in the window)");
        }
        for (date, price) in run.forecast.iter() {
            println!("{}  {:>10.2}", date, price);
        }
    }

    if args.evaluate {
        match orchestrator.evaluate() {
            Ok(metrics) => {
                println!();
                for (name, value) in metrics.iter() {
                    println!("{:<36} {:.2}", name, value);
                }
            }
            Err(err) => eprintln!("{}", err.user_message()),
        }
    }

    Ok(())
}
