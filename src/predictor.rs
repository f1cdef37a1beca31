//! The model capability consumed by the forecaster.
//!
//! A [`Predictor`] maps one input window of shape `(1, time_step, 1)` to a
//! single next value. Loaded LSTM models implement it, and so do the simple
//! stub predictors in this module, which are handy as baselines and in tests.

use std::fmt;

use ndarray::Array3;

use crate::error::{ForecastError, Result};

/// Input shape a model accepts, excluding the batch dimension.
///
/// `time_step: None` means the model accepts windows of any length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub time_step: Option<usize>,
    pub features: usize,
}

impl InputShape {
    pub fn fixed(time_step: usize) -> Self {
        InputShape { time_step: Some(time_step), features: 1 }
    }

    pub fn any_length() -> Self {
        InputShape { time_step: None, features: 1 }
    }

    /// Check a `(batch, time_step, features)` window shape against this one.
    pub fn check(&self, shape: (usize, usize, usize)) -> Result<()> {
        let (batch, time_step, features) = shape;
        let length_ok = self.time_step.map_or(true, |t| t == time_step);
        if batch == 1 && length_ok && features == self.features {
            Ok(())
        } else {
            Err(ForecastError::ShapeMismatch {
                expected: format!("(1, {}, {})", self.time_step_label(), self.features),
                actual: format!("({}, {}, {})", batch, time_step, features),
            })
        }
    }

    fn time_step_label(&self) -> String {
        match self.time_step {
            Some(t) => t.to_string(),
            None => "None".to_string(),
        }
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(None, {}, {})", self.time_step_label(), self.features)
    }
}

/// Single-step sequence-to-value predictor
pub trait Predictor {
    /// Shape of the windows this predictor accepts.
    fn input_shape(&self) -> InputShape {
        InputShape::any_length()
    }

    /// Predict the value that follows `window`, a `(1, time_step, 1)` tensor
    /// in scaled units.
    fn predict(&mut self, window: &Array3<f64>) -> f64;
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn input_shape(&self) -> InputShape {
        (**self).input_shape()
    }

    fn predict(&mut self, window: &Array3<f64>) -> f64 {
        (**self).predict(window)
    }
}

/// Always predicts the same value.
#[derive(Debug, Clone, Copy)]
pub struct ConstantPredictor(pub f64);

impl Predictor for ConstantPredictor {
    fn predict(&mut self, _window: &Array3<f64>) -> f64 {
        self.0
    }
}

/// Predicts the arithmetic mean of the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanPredictor;

impl Predictor for MeanPredictor {
    fn predict(&mut self, window: &Array3<f64>) -> f64 {
        window.mean().unwrap_or(0.0)
    }
}

/// Repeats the most recent observation (naive forecast).
#[derive(Debug, Clone, Copy, Default)]
pub struct LastValuePredictor;

impl Predictor for LastValuePredictor {
    fn predict(&mut self, window: &Array3<f64>) -> f64 {
        window.iter().last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(values: &[f64]) -> Array3<f64> {
        Array3::from_shape_vec((1, values.len(), 1), values.to_vec()).unwrap()
    }

    #[test]
    fn test_stub_predictors() {
        let w = window(&[1.0, 2.0, 6.0]);
        assert_eq!(ConstantPredictor(0.4).predict(&w), 0.4);
        assert!((MeanPredictor.predict(&w) - 3.0).abs() < 1e-12);
        assert_eq!(LastValuePredictor.predict(&w), 6.0);
    }

    #[test]
    fn test_input_shape_check() {
        let shape = InputShape::fixed(3);
        assert!(shape.check((1, 3, 1)).is_ok());
        assert!(shape.check((1, 4, 1)).is_err());
        assert!(shape.check((2, 3, 1)).is_err());
        assert!(shape.check((1, 3, 2)).is_err());

        assert!(InputShape::any_length().check((1, 17, 1)).is_ok());
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = InputShape::fixed(60).check((1, 30, 1)).unwrap_err();
        match err {
            ForecastError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, "(1, 60, 1)");
                assert_eq!(actual, "(1, 30, 1)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_boxed_predictor_delegates() {
        let mut boxed: Box<dyn Predictor> = Box::new(ConstantPredictor(1.5));
        assert_eq!(boxed.input_shape(), InputShape::any_length());
        assert_eq!(boxed.predict(&window(&[0.0])), 1.5);
    }
}
