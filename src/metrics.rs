use ndarray::Array1;

/// Error metric comparing predictions against observed values
pub trait ErrorMetric {
    fn compute(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> f64;
}

/// Mean Squared Error
pub struct MSE;

impl ErrorMetric for MSE {
    fn compute(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let diff = predictions - targets;
        let squared_diff = &diff * &diff;
        squared_diff.sum() / (predictions.len() as f64)
    }
}

/// Root Mean Squared Error, in the same units as the series
pub struct RMSE;

impl ErrorMetric for RMSE {
    fn compute(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> f64 {
        MSE.compute(predictions, targets).sqrt()
    }
}

/// Mean Absolute Error
pub struct MAE;

impl ErrorMetric for MAE {
    fn compute(&self, predictions: &Array1<f64>, targets: &Array1<f64>) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let diff = predictions - targets;
        diff.map(|x| x.abs()).sum() / (predictions.len() as f64)
    }
}
