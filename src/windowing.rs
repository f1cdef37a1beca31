use ndarray::{Array1, Array2, Array3, ArrayView1};

/// Supervised (window, next value) pairs cut from a series.
///
/// Row `i` of `inputs` is `series[i..i + time_step]` and `targets[i]` is
/// `series[i + time_step]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedDataset {
    pub inputs: Array2<f64>,
    pub targets: Array1<f64>,
}

impl WindowedDataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn time_step(&self) -> usize {
        self.inputs.ncols()
    }

    pub fn window(&self, index: usize) -> ArrayView1<'_, f64> {
        self.inputs.row(index)
    }

    /// Inputs as a `(batch, time_step, 1)` tensor, the rank sequence models expect.
    pub fn to_tensor(&self) -> Array3<f64> {
        let (batch, time_step) = self.inputs.dim();
        Array3::from_shape_fn((batch, time_step, 1), |(b, t, _)| self.inputs[[b, t]])
    }
}

// Longest row ndarray can describe for f64 elements.
const MAX_WINDOW: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Sliding-window dataset generator
///
/// Produces `series.len() - time_step - 1` pairs. The final observation is
/// never used as a target. A series of length `time_step + 1` or less gives
/// an empty dataset rather than an error.
pub fn create_dataset(series: &[f64], time_step: usize) -> WindowedDataset {
    let count = series.len().saturating_sub(time_step).saturating_sub(1);
    // An empty dataset keeps its width unless no array could ever hold a row that long.
    let width = if count == 0 && time_step > MAX_WINDOW { 0 } else { time_step };

    let mut inputs = Array2::zeros((count, width));
    let mut targets = Array1::zeros(count);
    for i in 0..count {
        inputs.row_mut(i).assign(&ArrayView1::from(&series[i..i + time_step]));
        targets[i] = series[i + time_step];
    }

    WindowedDataset { inputs, targets }
}
