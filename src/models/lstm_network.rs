use ndarray::Array2;
use rand::Rng;
use crate::layers::lstm_cell::LSTMCell;

/// Multi-layer LSTM network for sequence modeling
///
/// Stacks multiple LSTM cells where the output of layer i becomes
/// the input to layer i+1. Inference only: the parameters are fixed
/// once the network is built or loaded.
#[derive(Clone, Debug)]
pub struct LSTMNetwork {
    cells: Vec<LSTMCell>,
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
}

impl LSTMNetwork {
    /// Creates a new multi-layer LSTM network
    ///
    /// First layer accepts `input_size` dimensions, subsequent layers
    /// accept `hidden_size` dimensions from the previous layer.
    pub fn new(input_size: usize, hidden_size: usize, num_layers: usize) -> Self {
        Self::new_using(input_size, hidden_size, num_layers, &mut rand::thread_rng())
    }

    pub fn new_using<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, num_layers: usize, rng: &mut R) -> Self {
        let cells = (0..num_layers)
            .map(|i| {
                let layer_input_size = if i == 0 { input_size } else { hidden_size };
                LSTMCell::new_using(layer_input_size, hidden_size, &mut *rng)
            })
            .collect();

        LSTMNetwork { cells, input_size, hidden_size, num_layers }
    }

    /// Creates a network from existing cells (used for deserialization)
    pub fn from_cells(cells: Vec<LSTMCell>, input_size: usize, hidden_size: usize, num_layers: usize) -> Self {
        LSTMNetwork { cells, input_size, hidden_size, num_layers }
    }

    /// Get reference to the cells (used for serialization)
    pub fn get_cells(&self) -> &[LSTMCell] {
        &self.cells
    }

    /// Verifies that the layer stack is wired consistently.
    pub fn check_dimensions(&self) -> Result<(), String> {
        if self.cells.len() != self.num_layers || self.num_layers == 0 {
            return Err(format!("expected {} layers, found {}", self.num_layers, self.cells.len()));
        }
        for (i, cell) in self.cells.iter().enumerate() {
            cell.check_dimensions().map_err(|e| format!("layer {}: {}", i, e))?;
            if cell.hidden_size != self.hidden_size {
                return Err(format!("layer {}: hidden size {} != {}", i, cell.hidden_size, self.hidden_size));
            }
            let expected_input = if i == 0 { self.input_size } else { self.hidden_size };
            if cell.input_size() != expected_input {
                return Err(format!("layer {}: input size {} != {}", i, cell.input_size(), expected_input));
            }
        }
        Ok(())
    }

    /// One time step through every layer
    pub fn forward(&self, input: &Array2<f64>, hx: &[Array2<f64>], cx: &[Array2<f64>]) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let mut current_input = input.clone();
        let mut new_hx = Vec::with_capacity(self.num_layers);
        let mut new_cx = Vec::with_capacity(self.num_layers);

        for (layer, cell) in self.cells.iter().enumerate() {
            let (hy, cy) = cell.forward(&current_input, &hx[layer], &cx[layer]);
            // Layer i+1 input is layer i hidden output
            current_input = hy.clone();
            new_hx.push(hy);
            new_cx.push(cy);
        }

        (new_hx, new_cx)
    }

    /// Process an entire sequence from zero initial states
    ///
    /// Hidden and cell states are carried per layer across time steps.
    /// Returns the top layer's hidden state after the last step.
    pub fn forward_sequence(&self, sequence: &[Array2<f64>]) -> Array2<f64> {
        let mut hx: Vec<Array2<f64>> = vec![Array2::zeros((self.hidden_size, 1)); self.num_layers];
        let mut cx: Vec<Array2<f64>> = vec![Array2::zeros((self.hidden_size, 1)); self.num_layers];

        for input in sequence {
            let (new_hx, new_cx) = self.forward(input, &hx, &cx);
            hx = new_hx;
            cx = new_cx;
        }

        hx.pop().unwrap_or_else(|| Array2::zeros((self.hidden_size, 1)))
    }
}
