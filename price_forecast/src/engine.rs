//! Forecasting engines behind the time-series backend
//!
//! An engine fits a seasonal model to a plain sequence of closes and hands
//! back a [`FittedForecaster`]. Two engines exist: the in-process
//! [`NativeArimaEngine`] and [`RscriptEngine`], which runs
//! `forecast::auto.arima` in an external R process.

use crate::error::{ForecastError, Result};
use forecast_math::{AccuracyVector, ArimaFit, AutoArima};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Fits a forecaster to an ordered sequence with a seasonal period
pub trait ForecastEngine: Debug + Send + Sync {
    /// Short engine name used in logs
    fn name(&self) -> &'static str;

    /// Fit a model to `values`
    fn fit(&self, values: &[f64], period: usize) -> Result<Box<dyn FittedForecaster>>;
}

/// A fitted model that can extend its training sequence
pub trait FittedForecaster: Debug + Send {
    /// Human readable model description, e.g. the selected order
    fn description(&self) -> String;

    /// Mean forecast of exactly `horizon` values
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Training-set accuracy
    fn accuracy(&self) -> AccuracyVector;
}

/// Which engine the time-series backend uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Native,
    Rscript,
}

/// Build the configured engine
pub fn build_engine(
    kind: EngineKind,
    rscript_path: &Path,
    timeout: Duration,
) -> Arc<dyn ForecastEngine> {
    match kind {
        EngineKind::Native => Arc::new(NativeArimaEngine::default()),
        EngineKind::Rscript => Arc::new(RscriptEngine::new(rscript_path, timeout)),
    }
}

/// In-process automatic seasonal ARIMA
#[derive(Debug, Clone, Default)]
pub struct NativeArimaEngine {
    max_order: Option<(usize, usize, usize)>,
}

impl NativeArimaEngine {
    /// Limit the order search to `ARIMA(max_p, max_d, max_q)`
    pub fn with_max_order(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self {
            max_order: Some((max_p, max_d, max_q)),
        }
    }
}

impl ForecastEngine for NativeArimaEngine {
    fn name(&self) -> &'static str {
        "native-arima"
    }

    fn fit(&self, values: &[f64], period: usize) -> Result<Box<dyn FittedForecaster>> {
        let mut fitter = AutoArima::new(period)?;
        if let Some((p, d, q)) = self.max_order {
            fitter = fitter.with_max_order(p, d, q);
        }

        let fit = fitter.fit(values)?;
        let accuracy = fit.accuracy()?;
        debug!("Selected {} with AIC {:.3}", fit.order(), fit.aic());

        Ok(Box::new(NativeForecaster { fit, accuracy }))
    }
}

#[derive(Debug)]
struct NativeForecaster {
    fit: ArimaFit,
    accuracy: AccuracyVector,
}

impl FittedForecaster for NativeForecaster {
    fn description(&self) -> String {
        self.fit.order().to_string()
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let values = self.fit.forecast(horizon);
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "{} produced a non-finite forecast",
                self.fit.order()
            )));
        }
        Ok(values)
    }

    fn accuracy(&self) -> AccuracyVector {
        self.accuracy
    }
}

const R_SCRIPT: &str = r#"args <- commandArgs(trailingOnly = TRUE)
x <- read.csv(args[1])$close
h <- as.integer(args[2])
m <- as.integer(args[3])
fit <- forecast::auto.arima(ts(x, frequency = m), D = 1)
cat("order", forecast::arimaorder(fit), "\n")
acc <- forecast::accuracy(fit)[1, c("ME", "RMSE", "MAE", "MPE", "MAPE", "MASE", "ACF1")]
cat("accuracy", acc, "\n")
if (h > 0) cat("mean", as.numeric(forecast::forecast(fit, h = h)$mean), "\n")
"#;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Parsed stdout of one R run
#[derive(Debug, Clone, PartialEq)]
pub struct RscriptOutput {
    pub order: Option<String>,
    pub accuracy: AccuracyVector,
    pub mean: Vec<f64>,
}

/// Parse the `order`, `accuracy` and `mean` lines printed by the R script.
///
/// `NA` reads as NaN. `accuracy` must hold exactly seven values and
/// `mean` exactly `horizon`.
pub fn parse_rscript_output(stdout: &str, horizon: usize) -> Result<RscriptOutput> {
    let mut order = None;
    let mut accuracy = None;
    let mut mean = Vec::new();

    for line in stdout.lines() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("order") => order = Some(fields.collect::<Vec<_>>().join(",")),
            Some("accuracy") => accuracy = Some(parse_numbers(fields)?),
            Some("mean") => mean = parse_numbers(fields)?,
            _ => {}
        }
    }

    let accuracy = match accuracy.as_deref() {
        Some([me, rmse, mae, mpe, mape, mase, acf1]) => AccuracyVector {
            me: *me,
            rmse: *rmse,
            mae: *mae,
            mpe: *mpe,
            mape: *mape,
            mase: *mase,
            acf1: *acf1,
        },
        Some(other) => {
            return Err(ForecastError::ModelFit(format!(
                "Expected 7 accuracy values from R, got {}",
                other.len()
            )))
        }
        None => {
            return Err(ForecastError::ModelFit(
                "R output contained no accuracy line".to_string(),
            ))
        }
    };

    if mean.len() != horizon {
        return Err(ForecastError::ModelFit(format!(
            "Expected {} forecast values from R, got {}",
            horizon,
            mean.len()
        )));
    }

    Ok(RscriptOutput {
        order,
        accuracy,
        mean,
    })
}

fn parse_numbers<'a>(fields: impl Iterator<Item = &'a str>) -> Result<Vec<f64>> {
    fields
        .map(|field| {
            if field == "NA" {
                Ok(f64::NAN)
            } else {
                field.parse::<f64>().map_err(|_| {
                    ForecastError::ModelFit(format!("Unparseable number '{}' in R output", field))
                })
            }
        })
        .collect()
}

/// `auto.arima` through an external `Rscript` process
#[derive(Debug, Clone)]
pub struct RscriptEngine {
    rscript: PathBuf,
    timeout: Duration,
    temp_dir: Option<PathBuf>,
}

impl RscriptEngine {
    pub fn new<P: AsRef<Path>>(rscript: P, timeout: Duration) -> Self {
        Self {
            rscript: rscript.as_ref().to_path_buf(),
            timeout,
            temp_dir: None,
        }
    }

    /// Write the per-run data and script files under `dir` instead of the
    /// system temp directory
    pub fn with_temp_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.temp_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    fn temp_file(&self, prefix: &str, suffix: &str) -> Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(suffix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }

    /// Run the script once. The data and script files live only for the call.
    fn run(&self, values: &[f64], period: usize, horizon: usize) -> Result<RscriptOutput> {
        let mut data = self.temp_file("closes", ".csv")?;
        {
            let mut writer = csv::Writer::from_writer(data.as_file_mut());
            writer.write_record(["close"])?;
            for value in values {
                writer.write_record([value.to_string()])?;
            }
            writer.flush()?;
        }

        let mut script = self.temp_file("auto_arima", ".R")?;
        script.write_all(R_SCRIPT.as_bytes())?;
        script.flush()?;

        let mut child = Command::new(&self.rscript)
            .arg(script.path())
            .arg(data.path())
            .arg(horizon.to_string())
            .arg(period.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                ForecastError::ModelFit(format!(
                    "Could not start {}: {}",
                    self.rscript.display(),
                    err
                ))
            })?;

        // Drained concurrently: the child blocks once a pipe buffer is full
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break Some(status);
            }
            if Instant::now() >= deadline {
                child.kill()?;
                child.wait()?;
                break None;
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;

        let status = match status {
            Some(status) => status,
            None => {
                return Err(ForecastError::ModelFit(format!(
                    "R process exceeded its {:?} timeout",
                    self.timeout
                )))
            }
        };
        if !status.success() {
            return Err(ForecastError::ModelFit(format!(
                "R exited with {}: {}",
                status,
                stderr.trim()
            )));
        }
        debug!("R wrote {} bytes to stderr", stderr.len());

        parse_rscript_output(&stdout, horizon)
    }
}

type PipeReader = Option<thread::JoinHandle<io::Result<String>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> PipeReader {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            pipe.read_to_end(&mut buffer)?;
            Ok(String::from_utf8_lossy(&buffer).into_owned())
        })
    })
}

fn collect(reader: PipeReader) -> Result<String> {
    match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| ForecastError::ModelFit("R output reader panicked".to_string()))?
            .map_err(ForecastError::from),
        None => Ok(String::new()),
    }
}

impl ForecastEngine for RscriptEngine {
    fn name(&self) -> &'static str {
        "rscript"
    }

    fn fit(&self, values: &[f64], period: usize) -> Result<Box<dyn FittedForecaster>> {
        info!("Fitting auto.arima in {}", self.rscript.display());
        let output = self.run(values, period, 0)?;

        Ok(Box::new(RscriptForecaster {
            engine: self.clone(),
            values: values.to_vec(),
            period,
            order: output.order.unwrap_or_else(|| "auto.arima".to_string()),
            accuracy: output.accuracy,
        }))
    }
}

#[derive(Debug)]
struct RscriptForecaster {
    engine: RscriptEngine,
    values: Vec<f64>,
    period: usize,
    order: String,
    accuracy: AccuracyVector,
}

impl FittedForecaster for RscriptForecaster {
    fn description(&self) -> String {
        format!("ARIMA({})[{}]", self.order, self.period)
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Ok(Vec::new());
        }
        Ok(self.engine.run(&self.values, self.period, horizon)?.mean)
    }

    fn accuracy(&self) -> AccuracyVector {
        self.accuracy
    }
}
