//! Recursive multi-step forecasting.
//!
//! The forecaster scales the series, takes its last `time_step` values as
//! the first window and then repeatedly predicts one step, drops the oldest
//! value and appends the prediction. Every step after the first is
//! conditioned on earlier predictions, so errors compound over the horizon.

use std::path::Path;

use log::{debug, info};
use ndarray::{Array1, Array3, s};

use crate::error::{ForecastError, Result};
use crate::metrics::{ErrorMetric, MAE, MSE, RMSE};
use crate::models::regressor::SequenceRegressor;
use crate::persistence::PersistentModel;
use crate::predictor::Predictor;
use crate::preparation::{min_len_for_test_windows, prepare, DEFAULT_TRAIN_RATIO};
use crate::scaler::MinMaxScaler;

/// Status message returned with every successful forecast.
pub const SUCCESS_MESSAGE: &str = "Prediction successful!";

/// Result of a forecast call
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Forecast values in original units, one per future step.
    pub predictions: Vec<f64>,
    /// The same values as the model produced them, in scaled units.
    pub scaled_predictions: Vec<f64>,
    pub message: String,
}

/// One-step-ahead accuracy over the held-out test segment, in original units
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub samples: usize,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub predictions: Vec<f64>,
    pub actual: Vec<f64>,
}

/// Owns a model and runs forecasts against it
pub struct Forecaster<P: Predictor> {
    model: P,
}

impl Forecaster<SequenceRegressor> {
    /// Load a saved [`SequenceRegressor`] (`.json` or bincode) and wrap it.
    pub fn from_model_file<Q: AsRef<Path>>(path: Q) -> Result<Self> {
        let path = path.as_ref();
        let (model, metadata) = SequenceRegressor::load(path)?;
        info!(
            "loaded model '{}' from {} ({} layers, hidden size {}, input {})",
            metadata.model_name,
            path.display(),
            metadata.num_layers,
            metadata.hidden_size,
            model.input_shape()
        );
        Ok(Forecaster::new(model))
    }
}

impl<P: Predictor> Forecaster<P> {
    pub fn new(model: P) -> Self {
        Forecaster { model }
    }

    pub fn model(&self) -> &P {
        &self.model
    }

    pub fn into_inner(self) -> P {
        self.model
    }

    /// Forecast `future_days` values past the end of `series`.
    pub fn predict_future(&mut self, series: &[f64], time_step: usize, future_days: usize) -> Result<Forecast> {
        predict_future(&mut self.model, series, time_step, future_days)
    }

    /// Score one-step predictions on the last 20% of `series`.
    pub fn evaluate(&mut self, series: &[f64], time_step: usize) -> Result<Evaluation> {
        let prepared = prepare(series, time_step)?;
        if prepared.test.is_empty() {
            // Report the whole-series length that leaves one test window
            return Err(ForecastError::InsufficientData {
                required: min_len_for_test_windows(time_step, DEFAULT_TRAIN_RATIO).unwrap_or(usize::MAX),
                actual: series.len(),
            });
        }
        self.model.input_shape().check((1, time_step, 1))?;

        let tensor = prepared.test.to_tensor();
        let scaled: Vec<f64> = (0..prepared.test.len())
            .map(|i| {
                let window = tensor.slice(s![i..i + 1, .., ..]).to_owned();
                self.model.predict(&window)
            })
            .collect();

        let predictions = prepared.scaler.inverse_transform_all(&scaled);
        let actual = prepared
            .scaler
            .inverse_transform_all(&prepared.test.targets.to_vec());

        let evaluation = Evaluation {
            samples: predictions.len(),
            mse: MSE.compute(&predictions, &actual),
            rmse: RMSE.compute(&predictions, &actual),
            mae: MAE.compute(&predictions, &actual),
            predictions: predictions.to_vec(),
            actual: actual.to_vec(),
        };
        info!(
            "evaluated {} test windows: rmse {:.4}, mae {:.4}",
            evaluation.samples, evaluation.rmse, evaluation.mae
        );
        Ok(evaluation)
    }
}

/// Recursive forecast with any predictor
///
/// Fails before calling the model when the horizon is zero, when the series
/// holds no more than `time_step` values, or when the model's declared input
/// shape does not accept `(1, time_step, 1)`.
pub fn predict_future<P: Predictor + ?Sized>(
    model: &mut P,
    series: &[f64],
    time_step: usize,
    future_days: usize,
) -> Result<Forecast> {
    if future_days == 0 {
        return Err(ForecastError::InvalidHorizon(future_days));
    }
    if time_step == 0 {
        return Err(ForecastError::InvalidWindow(time_step));
    }
    if time_step >= series.len() {
        return Err(ForecastError::InsufficientData {
            required: time_step.saturating_add(1),
            actual: series.len(),
        });
    }
    model.input_shape().check((1, time_step, 1))?;

    // Fit fresh on every call
    let scaler = MinMaxScaler::fit(series)?;
    let scaled = scaler.transform_all(series);
    info!(
        "forecasting {} steps from {} observations with time step {}",
        future_days,
        series.len(),
        time_step
    );

    let start = scaled.len() - time_step;
    let mut window = Array3::from_shape_fn((1, time_step, 1), |(_, t, _)| scaled[start + t]);

    let mut scaled_predictions = Vec::with_capacity(future_days);
    for step in 0..future_days {
        let predicted = model.predict(&window);
        debug!("step {}/{}: scaled prediction {:.6}", step + 1, future_days, predicted);
        scaled_predictions.push(predicted);
        window = slide_window(&window, predicted);
    }

    let predictions = scaler.inverse_transform_all(&scaled_predictions).to_vec();
    Ok(Forecast {
        predictions,
        scaled_predictions,
        message: SUCCESS_MESSAGE.to_string(),
    })
}

/// Drop the oldest value and append `value`; the length is unchanged.
///
/// An empty window stays empty.
pub(crate) fn slide_window(window: &Array3<f64>, value: f64) -> Array3<f64> {
    let time_step = window.shape()[1];
    if time_step == 0 {
        return window.clone();
    }
    let mut next = Array3::zeros(window.raw_dim());
    next.slice_mut(s![.., ..time_step - 1, ..])
        .assign(&window.slice(s![.., 1.., ..]));
    next[[0, time_step - 1, 0]] = value;
    next
}

/// Scaled window contents as a flat vector.
pub fn window_values(window: &Array3<f64>) -> Array1<f64> {
    window.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{ConstantPredictor, InputShape, MeanPredictor};

    /// Records every window it is shown and predicts the mean.
    struct RecordingPredictor {
        windows: Vec<Vec<f64>>,
    }

    impl Predictor for RecordingPredictor {
        fn predict(&mut self, window: &Array3<f64>) -> f64 {
            self.windows.push(window_values(window).to_vec());
            window.mean().unwrap_or(0.0)
        }
    }

    struct FixedShape(usize);

    impl Predictor for FixedShape {
        fn input_shape(&self) -> InputShape {
            InputShape::fixed(self.0)
        }

        fn predict(&mut self, _window: &Array3<f64>) -> f64 {
            panic!("must not be called on a shape mismatch");
        }
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_mean_predictor_windows_by_hand() {
        // Series 0..=4 scales to [0, .25, .5, .75, 1]
        let series = [0.0, 1.0, 2.0, 3.0, 4.0];
        let mut model = RecordingPredictor { windows: Vec::new() };

        let forecast = predict_future(&mut model, &series, 3, 5).unwrap();

        // Each mean is appended to the window that produced it
        let m1 = (0.5 + 0.75 + 1.0) / 3.0;
        let m2 = (0.75 + 1.0 + m1) / 3.0;
        let m3 = (1.0 + m1 + m2) / 3.0;
        let m4 = (m1 + m2 + m3) / 3.0;
        let m5 = (m2 + m3 + m4) / 3.0;

        let expected_windows = vec![
            vec![0.5, 0.75, 1.0],
            vec![0.75, 1.0, m1],
            vec![1.0, m1, m2],
            vec![m1, m2, m3],
            vec![m2, m3, m4],
        ];
        assert_eq!(model.windows.len(), 5);
        for (seen, expected) in model.windows.iter().zip(&expected_windows) {
            assert_close(seen, expected);
        }

        assert_close(&forecast.scaled_predictions, &[m1, m2, m3, m4, m5]);
        // Back in original units: x * 4
        let expected: Vec<f64> = [m1, m2, m3, m4, m5].iter().map(|m| m * 4.0).collect();
        assert_close(&forecast.predictions, &expected);
        assert_eq!(forecast.message, SUCCESS_MESSAGE);
    }

    #[test]
    fn test_rolling_window_invariant() {
        let series: Vec<f64> = (0..30).map(|v| (v as f64 * 0.3).sin() * 10.0 + 50.0).collect();
        let mut model = RecordingPredictor { windows: Vec::new() };

        predict_future(&mut model, &series, 7, 12).unwrap();

        assert_eq!(model.windows.len(), 12);
        for pair in model.windows.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            assert_eq!(before.len(), 7);
            assert_eq!(after.len(), 7);
            // Oldest dropped, everything else shifted left by one
            assert_eq!(&before[1..], &after[..6]);
        }
    }

    #[test]
    fn test_output_length_matches_horizon() {
        let series: Vec<f64> = (1..=50).map(f64::from).collect();
        for n in [1, 2, 10, 64] {
            let forecast = predict_future(&mut MeanPredictor, &series, 10, n).unwrap();
            assert_eq!(forecast.predictions.len(), n);
            assert_eq!(forecast.scaled_predictions.len(), n);
        }
    }

    #[test]
    fn test_constant_predictor_inverts_scaling() {
        let series = [10.0, 20.0, 30.0];
        let forecast = predict_future(&mut ConstantPredictor(0.5), &series, 2, 3).unwrap();
        assert_close(&forecast.predictions, &[20.0, 20.0, 20.0]);
    }

    #[test]
    fn test_insufficient_data_no_prediction() {
        let series = [1.0, 2.0, 3.0];
        let mut model = RecordingPredictor { windows: Vec::new() };

        for time_step in [3, 4, 10] {
            let err = predict_future(&mut model, &series, time_step, 5).unwrap_err();
            assert!(matches!(err, ForecastError::InsufficientData { actual: 3, .. }));
        }
        assert!(model.windows.is_empty());
    }

    #[test]
    fn test_shape_mismatch_checked_before_inference() {
        let series: Vec<f64> = (1..=20).map(f64::from).collect();
        let err = predict_future(&mut FixedShape(5), &series, 4, 3).unwrap_err();
        assert!(matches!(err, ForecastError::ShapeMismatch { .. }));

        // Matching shape passes validation
        let mut ok = Forecaster::new(MeanPredictor);
        assert!(ok.predict_future(&series, 5, 3).is_ok());
    }

    #[test]
    fn test_zero_horizon_and_window() {
        let series = [1.0, 2.0, 3.0, 4.0];
        assert!(matches!(
            predict_future(&mut MeanPredictor, &series, 2, 0),
            Err(ForecastError::InvalidHorizon(0))
        ));
        assert!(matches!(
            predict_future(&mut MeanPredictor, &series, 0, 2),
            Err(ForecastError::InvalidWindow(0))
        ));
    }

    #[test]
    fn test_slide_window() {
        let window = Array3::from_shape_vec((1, 3, 1), vec![1.0, 2.0, 3.0]).unwrap();
        let next = slide_window(&window, 9.0);
        assert_eq!(window_values(&next).to_vec(), vec![2.0, 3.0, 9.0]);

        let single = Array3::from_shape_vec((1, 1, 1), vec![1.0]).unwrap();
        assert_eq!(window_values(&slide_window(&single, 4.0)).to_vec(), vec![4.0]);

        let empty = Array3::<f64>::zeros((1, 0, 1));
        assert_eq!(slide_window(&empty, 4.0).dim(), (1, 0, 1));
    }

    #[test]
    fn test_huge_window_is_insufficient_data() {
        let series = [1.0, 2.0, 3.0];
        assert!(matches!(
            predict_future(&mut MeanPredictor, &series, usize::MAX, 2),
            Err(ForecastError::InsufficientData { required: usize::MAX, actual: 3 })
        ));
        assert!(matches!(
            Forecaster::new(MeanPredictor).evaluate(&series, usize::MAX),
            Err(ForecastError::InsufficientData { required: usize::MAX, actual: 3 })
        ));
    }

    #[test]
    fn test_evaluate_with_last_value_predictor() {
        use crate::predictor::LastValuePredictor;

        // Linear ramp: naive forecast is always off by exactly one step
        let series: Vec<f64> = (0..100).map(|v| v as f64 * 2.0).collect();
        let mut forecaster = Forecaster::new(LastValuePredictor);
        let evaluation = forecaster.evaluate(&series, 5).unwrap();

        assert_eq!(evaluation.samples, 20 - 5 - 1);
        assert!((evaluation.mae - 2.0).abs() < 1e-9);
        assert!((evaluation.rmse - 2.0).abs() < 1e-9);
        assert!((evaluation.mse - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_requires_test_windows() {
        let series: Vec<f64> = (0..20).map(f64::from).collect();
        let mut forecaster = Forecaster::new(MeanPredictor);
        // Test segment holds 4 points, too few for a window of 5
        // The requirement covers the whole series, not the test segment
        assert!(matches!(
            forecaster.evaluate(&series, 5),
            Err(ForecastError::InsufficientData { required: 31, actual: 20 })
        ));

        let series: Vec<f64> = (0..31).map(f64::from).collect();
        assert_eq!(forecaster.evaluate(&series, 5).unwrap().samples, 1);
    }
}
