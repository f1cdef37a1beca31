use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};
use serde_json::Value;

use super::{alphavantage, SeriesSource, DEFAULT_CLOSE_COLUMN};
use crate::error::{ForecastError, Result};

const DATE_COLUMNS: [&str; 3] = ["date", "timestamp", "time"];

/// Closing prices from a CSV file with a header row
///
/// The close column is matched case-insensitively. When the file also has a
/// `date`/`timestamp` column whose values all parse as `YYYY-MM-DD`, rows
/// are sorted oldest first; many exports list the newest day first.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub column: String,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CsvSource {
            path: path.as_ref().to_path_buf(),
            column: DEFAULT_CLOSE_COLUMN.to_string(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Parse CSV text from any reader.
    pub fn parse<R: Read>(reader: R, column: &str) -> Result<Vec<f64>> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let value_idx = find_column(&headers, &[column]).ok_or_else(|| {
            ForecastError::DataSource(format!("column '{}' not found in header {:?}", column, headers))
        })?;
        let date_idx = find_column(&headers, &DATE_COLUMNS);

        let mut rows: Vec<(Option<NaiveDate>, f64)> = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record?;
            let raw = record.get(value_idx).unwrap_or("");
            let value: f64 = raw.parse().map_err(|_| {
                ForecastError::DataSource(format!("row {}: invalid {} value '{}'", line + 1, column, raw))
            })?;
            let date = date_idx.and_then(|i| record.get(i)).and_then(parse_date);
            rows.push((date, value));
        }

        Ok(in_date_order(rows))
    }
}

impl SeriesSource for CsvSource {
    fn fetch(&self) -> Result<Vec<f64>> {
        let file = File::open(&self.path)
            .map_err(|e| ForecastError::DataSource(format!("{}: {}", self.path.display(), e)))?;
        let series = Self::parse(file, &self.column)?;
        info!("read {} values from {}", series.len(), self.path.display());
        Ok(series)
    }

    fn describe(&self) -> String {
        format!("csv:{}[{}]", self.path.display(), self.column)
    }
}

/// Closing prices from a JSON file
///
/// Accepted layouts: an array of numbers, an array of objects carrying a
/// `close` field (number or numeric string), an object with a `close`
/// array, or a saved Alpha Vantage daily response. Objects that all carry a
/// `date`/`timestamp` are put in date order like CSV rows.
#[derive(Debug, Clone)]
pub struct JsonSource {
    pub path: PathBuf,
}

impl JsonSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonSource { path: path.as_ref().to_path_buf() }
    }

    pub fn parse(body: &str) -> Result<Vec<f64>> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ForecastError::DataSource(format!("invalid JSON: {}", e)))?;

        match &value {
            Value::Array(items) => {
                let rows = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let number = match item {
                            Value::Object(_) => close_field(item),
                            other => as_number(other),
                        };
                        number.map(|v| (date_field(item), v)).ok_or_else(|| {
                            ForecastError::DataSource(format!("element {} has no numeric close value", i))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(in_date_order(rows))
            }
            Value::Object(map) if map.keys().any(|k| k.starts_with("Time Series")) => {
                alphavantage::parse_daily(body)
            }
            Value::Object(_) => match close_field(&value) {
                Some(_) => Err(ForecastError::DataSource("'close' must be an array of values".to_string())),
                None => match lookup_close(&value) {
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|v| as_number(v).ok_or_else(|| {
                            ForecastError::DataSource(format!("non-numeric close value {}", v))
                        }))
                        .collect(),
                    _ => Err(ForecastError::DataSource("no 'close' array found".to_string())),
                },
            },
            _ => Err(ForecastError::DataSource("expected a JSON array or object".to_string())),
        }
    }
}

impl SeriesSource for JsonSource {
    fn fetch(&self) -> Result<Vec<f64>> {
        let body = std::fs::read_to_string(&self.path)
            .map_err(|e| ForecastError::DataSource(format!("{}: {}", self.path.display(), e)))?;
        let series = Self::parse(&body)?;
        info!("read {} values from {}", series.len(), self.path.display());
        Ok(series)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

// Values oldest first when every row carries a date, otherwise as given.
fn in_date_order(mut rows: Vec<(Option<NaiveDate>, f64)>) -> Vec<f64> {
    if !rows.is_empty() && rows.iter().all(|(d, _)| d.is_some()) {
        let sorted = rows.windows(2).all(|w| w[0].0 <= w[1].0);
        if !sorted {
            debug!("reordering {} rows by date", rows.len());
            rows.sort_by_key(|(d, _)| *d);
        }
    }
    rows.into_iter().map(|(_, v)| v).collect()
}

fn date_field(value: &Value) -> Option<NaiveDate> {
    value
        .as_object()?
        .iter()
        .find(|(k, _)| DATE_COLUMNS.iter().any(|n| k.eq_ignore_ascii_case(n)))
        .and_then(|(_, v)| v.as_str())
        .and_then(parse_date)
}

fn lookup_close(value: &Value) -> Option<&Value> {
    value
        .as_object()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(DEFAULT_CLOSE_COLUMN))
        .map(|(_, v)| v)
}

// Scalar close value of an object element, if it has one.
fn close_field(value: &Value) -> Option<f64> {
    lookup_close(value).and_then(as_number)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
