use log::debug;
use ndarray::Array1;

use crate::error::{ForecastError, Result};
use crate::scaler::MinMaxScaler;
use crate::windowing::{create_dataset, WindowedDataset};

/// Share of the series used for the training segment.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// Output of the data preparer
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub scaler: MinMaxScaler,
    pub scaled: Array1<f64>,
    /// Index where the test segment starts.
    pub split_index: usize,
    pub train: WindowedDataset,
    pub test: WindowedDataset,
}

/// Scale the whole series to `[0, 1]`, split it 80/20 in time order and
/// window both segments.
pub fn prepare(series: &[f64], time_step: usize) -> Result<PreparedData> {
    prepare_with_split(series, time_step, DEFAULT_TRAIN_RATIO)
}

pub fn prepare_with_split(series: &[f64], time_step: usize, train_ratio: f64) -> Result<PreparedData> {
    if time_step == 0 {
        return Err(ForecastError::InvalidWindow(time_step));
    }
    let required = time_step.saturating_add(2);
    if series.len() < required {
        return Err(ForecastError::InsufficientData {
            required,
            actual: series.len(),
        });
    }
    if !(0.0..=1.0).contains(&train_ratio) {
        return Err(ForecastError::Config(format!("train ratio {} is outside [0, 1]", train_ratio)));
    }

    let scaler = MinMaxScaler::fit(series)?;
    let scaled_values: Vec<f64> = series.iter().map(|&v| scaler.transform(v)).collect();

    let split_index = split_point(series.len(), train_ratio);
    let (train_segment, test_segment) = scaled_values.split_at(split_index);

    let train = create_dataset(train_segment, time_step);
    let test = create_dataset(test_segment, time_step);
    let scaled = Array1::from(scaled_values);
    debug!(
        "prepared {} observations: {} train windows, {} test windows (split at {})",
        series.len(),
        train.len(),
        test.len(),
        split_index
    );

    Ok(PreparedData { scaler, scaled, split_index, train, test })
}

/// Index where the test segment of a `len`-long series starts.
pub fn split_point(len: usize, train_ratio: f64) -> usize {
    (len as f64 * train_ratio) as usize
}

/// Shortest series whose test segment yields at least one window.
///
/// Returns `None` when no series length is long enough, e.g. a train ratio
/// of 1 or a window near `usize::MAX`.
pub fn min_len_for_test_windows(time_step: usize, train_ratio: f64) -> Option<usize> {
    let needed = time_step.checked_add(2)?;
    if !(0.0..1.0).contains(&train_ratio) {
        return None;
    }
    // The test segment holds between len * (1 - ratio) and one more than that
    let share = 1.0 - train_ratio;
    let lower = ((needed - 1) as f64 / share).floor();
    let span = (1.0 / share).ceil() + 4.0;
    if !(lower + span).is_finite() || lower + span >= usize::MAX as f64 {
        return None;
    }
    let start = (lower as usize).saturating_sub(1).max(needed);
    (start..start + span as usize).find(|&len| len - split_point(len, train_ratio) >= needed)
}
