use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::{ForecastError, Result};
use crate::source::{
    AlphaVantageSource, CsvSource, JsonSource, OutputSize, SeriesSource, DEFAULT_CLOSE_COLUMN,
};

pub const DEFAULT_TIME_STEP: usize = 100;
pub const DEFAULT_FUTURE_DAYS: usize = 30;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the series comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Json,
    AlphaVantage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub path: Option<PathBuf>,
    #[serde(default = "default_column")]
    pub column: String,
    pub symbol: Option<String>,
    #[serde(default)]
    pub output_size: OutputSize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SourceConfig {
    pub fn csv<P: AsRef<Path>>(path: P) -> Self {
        Self::with_kind(SourceKind::Csv, Some(path.as_ref().to_path_buf()), None)
    }

    pub fn json<P: AsRef<Path>>(path: P) -> Self {
        Self::with_kind(SourceKind::Json, Some(path.as_ref().to_path_buf()), None)
    }

    pub fn alpha_vantage(symbol: impl Into<String>) -> Self {
        Self::with_kind(SourceKind::AlphaVantage, None, Some(symbol.into()))
    }

    fn with_kind(kind: SourceKind, path: Option<PathBuf>, symbol: Option<String>) -> Self {
        SourceConfig {
            kind,
            path,
            column: default_column(),
            symbol,
            output_size: OutputSize::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    fn require_path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .ok_or_else(|| ForecastError::Config(format!("{:?} source needs a path", self.kind)))
    }

    /// Build the configured source. The Alpha Vantage key comes from the environment.
    pub fn build(&self) -> Result<Box<dyn SeriesSource>> {
        let source: Box<dyn SeriesSource> = match self.kind {
            SourceKind::Csv => Box::new(CsvSource::new(self.require_path()?).with_column(self.column.clone())),
            SourceKind::Json => Box::new(JsonSource::new(self.require_path()?)),
            SourceKind::AlphaVantage => {
                let symbol = self
                    .symbol
                    .as_deref()
                    .ok_or_else(|| ForecastError::Config("alphavantage source needs a symbol".to_string()))?;
                Box::new(
                    AlphaVantageSource::from_env(symbol)?
                        .with_output_size(self.output_size)
                        .with_timeout(Duration::from_secs(self.timeout_secs)),
                )
            }
        };
        debug!("configured source {}", source.describe());
        Ok(source)
    }
}

/// Top-level forecast configuration, usually read from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    pub model_path: PathBuf,
    #[serde(default = "default_time_step")]
    pub time_step: usize,
    #[serde(default = "default_future_days")]
    pub future_days: usize,
    pub source: Option<SourceConfig>,
}

impl ForecastConfig {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Self {
        ForecastConfig {
            model_path: model_path.as_ref().to_path_buf(),
            time_step: DEFAULT_TIME_STEP,
            future_days: DEFAULT_FUTURE_DAYS,
            source: None,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ForecastConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ForecastError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_step == 0 {
            return Err(ForecastError::InvalidWindow(self.time_step));
        }
        if self.future_days == 0 {
            return Err(ForecastError::InvalidHorizon(self.future_days));
        }
        if let Some(source) = &self.source {
            if source.timeout_secs == 0 {
                return Err(ForecastError::Config("timeout_secs must be positive".to_string()));
            }
        }
        Ok(())
    }
}

fn default_column() -> String {
    DEFAULT_CLOSE_COLUMN.to_string()
}

fn default_time_step() -> usize {
    DEFAULT_TIME_STEP
}

fn default_future_days() -> usize {
    DEFAULT_FUTURE_DAYS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
