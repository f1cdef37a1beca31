use thiserror::Error;

use crate::persistence::PersistenceError;

/// Errors surfaced by data preparation, forecasting and the series sources.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("window length must be positive, got {0}")]
    InvalidWindow(usize),

    #[error("forecast horizon must be positive, got {0}")]
    InvalidHorizon(usize),

    #[error("model expects input shape {expected}, window has shape {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("failed to load model: {0}")]
    ModelLoad(#[from] PersistenceError),

    #[error("series contains a non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    #[error("data source error: {0}")]
    DataSource(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for ForecastError {
    fn from(error: csv::Error) -> Self {
        ForecastError::DataSource(error.to_string())
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(error: reqwest::Error) -> Self {
        ForecastError::DataSource(error.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(error: toml::de::Error) -> Self {
        ForecastError::Config(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ForecastError::InsufficientData { required: 11, actual: 10 };
        assert_eq!(err.to_string(), "insufficient data: need at least 11 observations, got 10");

        let err = ForecastError::ShapeMismatch {
            expected: "(1, 60, 1)".to_string(),
            actual: "(1, 30, 1)".to_string(),
        };
        assert!(err.to_string().contains("(1, 60, 1)"));
    }

    #[test]
    fn test_persistence_error_converts_to_model_load() {
        let err: ForecastError = PersistenceError::InvalidModel("bad head".to_string()).into();
        assert!(matches!(err, ForecastError::ModelLoad(_)));
    }
}
