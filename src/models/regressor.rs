use ndarray::{Array2, Array3, arr2};
use rand::Rng;

use crate::layers::linear::LinearLayer;
use crate::models::lstm_network::LSTMNetwork;
use crate::predictor::{InputShape, Predictor};

/// Pre-trained sequence-to-value model
///
/// A stacked LSTM reads the window one value at a time; a dense head maps
/// the top layer's final hidden state to the predicted next value.
#[derive(Clone, Debug)]
pub struct SequenceRegressor {
    pub network: LSTMNetwork,
    pub head: LinearLayer,
    /// Window length the model was built for. `None` accepts any length.
    pub time_step: Option<usize>,
}

impl SequenceRegressor {
    /// Randomly initialized univariate regressor.
    pub fn new(hidden_size: usize, num_layers: usize, time_step: Option<usize>) -> Self {
        Self::new_using(hidden_size, num_layers, time_step, &mut rand::thread_rng())
    }

    pub fn new_using<R: Rng + ?Sized>(hidden_size: usize, num_layers: usize, time_step: Option<usize>, rng: &mut R) -> Self {
        let network = LSTMNetwork::new_using(1, hidden_size, num_layers, &mut *rng);
        let head = LinearLayer::new_using(hidden_size, 1, &mut *rng);
        SequenceRegressor { network, head, time_step }
    }

    pub fn from_parts(network: LSTMNetwork, head: LinearLayer, time_step: Option<usize>) -> Result<Self, String> {
        let model = SequenceRegressor { network, head, time_step };
        model.check_dimensions()?;
        Ok(model)
    }

    pub fn check_dimensions(&self) -> Result<(), String> {
        self.network.check_dimensions()?;
        if self.network.input_size != 1 {
            return Err(format!("expected a univariate network, input size is {}", self.network.input_size));
        }
        if self.head.input_size != self.network.hidden_size || self.head.output_size != 1 {
            return Err(format!(
                "head maps {} -> {}, expected {} -> 1",
                self.head.input_size, self.head.output_size, self.network.hidden_size
            ));
        }
        if self.time_step == Some(0) {
            return Err("time_step must be positive".to_string());
        }
        Ok(())
    }

    /// Predict from a plain slice of scaled values.
    pub fn predict_slice(&self, window: &[f64]) -> f64 {
        let sequence: Vec<Array2<f64>> = window.iter().map(|&v| arr2(&[[v]])).collect();
        let hidden = self.network.forward_sequence(&sequence);
        self.head.forward(&hidden)[[0, 0]]
    }

    pub fn num_parameters(&self) -> usize {
        let recurrent: usize = self
            .network
            .get_cells()
            .iter()
            .map(|c| c.w_ih.len() + c.w_hh.len() + c.b_ih.len() + c.b_hh.len())
            .sum();
        recurrent + self.head.num_parameters()
    }
}

impl Predictor for SequenceRegressor {
    fn input_shape(&self) -> InputShape {
        InputShape { time_step: self.time_step, features: self.network.input_size }
    }

    fn predict(&mut self, window: &Array3<f64>) -> f64 {
        let values: Vec<f64> = window.iter().copied().collect();
        self.predict_slice(&values)
    }
}
