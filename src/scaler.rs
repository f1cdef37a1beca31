use log::warn;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Min-max scaler fit once over a series
///
/// Maps `[data_min, data_max]` linearly onto `[feature_min, feature_max]`
/// and back. The value is immutable after [`MinMaxScaler::fit`]; fitting
/// again means building a new scaler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: f64,
    data_max: f64,
    feature_min: f64,
    feature_max: f64,
}

impl MinMaxScaler {
    /// Fit to the unit interval `[0, 1]`.
    pub fn fit(series: &[f64]) -> Result<Self> {
        Self::fit_with_range(series, (0.0, 1.0))
    }

    pub fn fit_with_range(series: &[f64], feature_range: (f64, f64)) -> Result<Self> {
        if series.is_empty() {
            return Err(ForecastError::InsufficientData { required: 1, actual: 0 });
        }
        if let Some(index) = series.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::NonFiniteValue { index });
        }
        let (feature_min, feature_max) = feature_range;
        if !(feature_min < feature_max) {
            return Err(ForecastError::Config(format!(
                "feature range ({}, {}) is empty",
                feature_min, feature_max
            )));
        }

        let data_min = series.iter().copied().fold(f64::INFINITY, f64::min);
        let data_max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if data_min == data_max {
            warn!("series is constant at {}, scaling with a unit data range", data_min);
        }

        Ok(MinMaxScaler { data_min, data_max, feature_min, feature_max })
    }

    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    pub fn data_max(&self) -> f64 {
        self.data_max
    }

    pub fn feature_range(&self) -> (f64, f64) {
        (self.feature_min, self.feature_max)
    }

    // A constant series has no spread; treat its range as 1 so it maps to feature_min.
    fn data_range(&self) -> f64 {
        let range = self.data_max - self.data_min;
        if range == 0.0 { 1.0 } else { range }
    }

    fn scale(&self) -> f64 {
        (self.feature_max - self.feature_min) / self.data_range()
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.data_min) * self.scale() + self.feature_min
    }

    pub fn inverse_transform(&self, value: f64) -> f64 {
        (value - self.feature_min) / self.scale() + self.data_min
    }

    pub fn transform_all(&self, values: &[f64]) -> Array1<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    pub fn inverse_transform_all(&self, values: &[f64]) -> Array1<f64> {
        values.iter().map(|&v| self.inverse_transform(v)).collect()
    }
}
