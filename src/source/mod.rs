//! Providers of raw closing-price series.
//!
//! The forecasting core never fetches data itself; callers pick a source,
//! fetch once and hand the resulting slice to the forecaster.

pub mod alphavantage;
pub mod file;

pub use alphavantage::{AlphaVantageSource, OutputSize};
pub use file::{CsvSource, JsonSource};

use crate::error::Result;

/// Column name used when none is configured.
pub const DEFAULT_CLOSE_COLUMN: &str = "close";

/// Something that yields closing prices in chronological order (oldest first).
pub trait SeriesSource {
    fn fetch(&self) -> Result<Vec<f64>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

impl<S: SeriesSource + ?Sized> SeriesSource for Box<S> {
    fn fetch(&self) -> Result<Vec<f64>> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
