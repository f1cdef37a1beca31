//! # LSTM Forecast
//!
//! Multi-step forecasting of a univariate time series (daily closing prices)
//! with a pre-trained LSTM model.
//!
//! ## Core Components
//!
//! - **Scaler**: immutable min-max transform fit on the whole series
//! - **Windowing**: sliding-window (window, next value) dataset generator
//! - **Preparation**: scaling plus an order-preserving 80/20 train/test split
//! - **Forecaster**: rolling-window autoregressive loop over any [`Predictor`]
//! - **Models**: stacked LSTM with a dense head, loaded from JSON or bincode
//! - **Sources**: CSV, JSON and Alpha Vantage providers of closing prices
//!
//! ## Quick Start
//!
//! ```rust
//! use lstm_forecast::{predict_future, MeanPredictor};
//!
//! let closes: Vec<f64> = (1..=30).map(|v| 100.0 + v as f64).collect();
//! let forecast = predict_future(&mut MeanPredictor, &closes, 10, 5).unwrap();
//!
//! assert_eq!(forecast.predictions.len(), 5);
//! assert_eq!(forecast.message, "Prediction successful!");
//! ```

pub mod utils;
pub mod layers;
pub mod models;
pub mod predictor;
pub mod persistence;
pub mod scaler;
pub mod windowing;
pub mod preparation;
pub mod metrics;
pub mod forecaster;
pub mod source;
pub mod config;
pub mod error;

// Re-export commonly used items
pub use error::{ForecastError, Result};
pub use forecaster::{predict_future, Evaluation, Forecast, Forecaster, SUCCESS_MESSAGE};
pub use models::lstm_network::LSTMNetwork;
pub use models::regressor::SequenceRegressor;
pub use persistence::{ModelMetadata, ModelPersistence, PersistenceError, PersistentModel};
pub use predictor::{ConstantPredictor, InputShape, LastValuePredictor, MeanPredictor, Predictor};
pub use preparation::{prepare, PreparedData};
pub use scaler::MinMaxScaler;
pub use source::SeriesSource;
pub use windowing::{create_dataset, WindowedDataset};
pub use config::ForecastConfig;
