use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use log::info;
use serde::Deserialize;

use super::SeriesSource;
use crate::error::{ForecastError, Result};

pub const BASE_URL: &str = "https://www.alphavantage.co/query";
pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How much history `TIME_SERIES_DAILY` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 trading days.
    #[default]
    Compact,
    /// Full history.
    Full,
}

impl OutputSize {
    fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily closing prices for one symbol from the Alpha Vantage HTTP API
///
/// Requests are blocking and always carry a timeout.
#[derive(Debug, Clone)]
pub struct AlphaVantageSource {
    pub symbol: String,
    pub api_key: String,
    pub output_size: OutputSize,
    pub timeout: Duration,
    pub base_url: String,
}

impl AlphaVantageSource {
    pub fn new(symbol: impl Into<String>, api_key: impl Into<String>) -> Self {
        AlphaVantageSource {
            symbol: symbol.into(),
            api_key: api_key.into(),
            output_size: OutputSize::Compact,
            timeout: DEFAULT_TIMEOUT,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Reads the key from `ALPHAVANTAGE_API_KEY`.
    pub fn from_env(symbol: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| ForecastError::Config(format!("{} is not set", API_KEY_ENV)))?;
        Ok(Self::new(symbol, api_key))
    }

    pub fn with_output_size(mut self, output_size: OutputSize) -> Self {
        self.output_size = output_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn query_params(&self) -> [(&'static str, &str); 4] {
        [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", self.symbol.as_str()),
            ("outputsize", self.output_size.as_str()),
            ("apikey", self.api_key.as_str()),
        ]
    }
}

impl SeriesSource for AlphaVantageSource {
    fn fetch(&self) -> Result<Vec<f64>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout.min(Duration::from_secs(10)))
            .build()?;

        info!("fetching daily series for {} ({})", self.symbol, self.output_size);
        let response = client
            .get(&self.base_url)
            .query(&self.query_params())
            .send()?
            .error_for_status()?;
        let body = response.text()?;

        let series = parse_daily(&body)?;
        info!("received {} daily closes for {}", series.len(), self.symbol);
        Ok(series)
    }

    fn describe(&self) -> String {
        format!("alphavantage:{}", self.symbol)
    }
}

#[derive(Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

#[derive(Deserialize)]
struct DailyResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: Option<BTreeMap<NaiveDate, DailyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// Parse a `TIME_SERIES_DAILY` JSON body into closes, oldest first.
pub fn parse_daily(body: &str) -> Result<Vec<f64>> {
    let response: DailyResponse = serde_json::from_str(body)
        .map_err(|e| ForecastError::DataSource(format!("unexpected Alpha Vantage response: {}", e)))?;

    if let Some(message) = response.error_message.or(response.note).or(response.information) {
        return Err(ForecastError::DataSource(message));
    }
    let series = response
        .series
        .ok_or_else(|| ForecastError::DataSource("response has no daily time series".to_string()))?;

    // BTreeMap keys iterate in ascending date order
    series
        .into_iter()
        .map(|(date, bar)| {
            bar.close.trim().parse::<f64>().map_err(|_| {
                ForecastError::DataSource(format!("{}: invalid close '{}'", date, bar.close))
            })
        })
        .collect()
}
