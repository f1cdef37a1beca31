use ndarray::{Array2, s};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use crate::utils::sigmoid;

/// LSTM cell holding pre-trained parameters
///
/// Implements the standard LSTM equations:
/// - i_t = σ(W_xi * x_t + W_hi * h_t-1 + b_i)
/// - f_t = σ(W_xf * x_t + W_hf * h_t-1 + b_f)
/// - g_t = tanh(W_xg * x_t + W_hg * h_t-1 + b_g)
/// - o_t = σ(W_xo * x_t + W_ho * h_t-1 + b_o)
/// - c_t = f_t ⊙ c_t-1 + i_t ⊙ g_t
/// - h_t = o_t ⊙ tanh(c_t)
#[derive(Clone, Debug)]
pub struct LSTMCell {
    pub w_ih: Array2<f64>,  // input-to-hidden weights (4*hidden_size, input_size)
    pub w_hh: Array2<f64>,  // hidden-to-hidden weights (4*hidden_size, hidden_size)
    pub b_ih: Array2<f64>,  // input-to-hidden bias (4*hidden_size, 1)
    pub b_hh: Array2<f64>,  // hidden-to-hidden bias (4*hidden_size, 1)
    pub hidden_size: usize,
}

impl LSTMCell {
    /// Creates new LSTM cell with uniform weights in [-0.1, 0.1) and zero biases
    pub fn new(input_size: usize, hidden_size: usize) -> Self {
        Self::new_using(input_size, hidden_size, &mut rand::thread_rng())
    }

    /// Same as [`LSTMCell::new`] but draws weights from the given generator
    pub fn new_using<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, rng: &mut R) -> Self {
        let dist = Uniform::new(-0.1, 0.1);

        let w_ih = Array2::random_using((4 * hidden_size, input_size), dist, rng);
        let w_hh = Array2::random_using((4 * hidden_size, hidden_size), dist, rng);
        let b_ih = Array2::zeros((4 * hidden_size, 1));
        let b_hh = Array2::zeros((4 * hidden_size, 1));

        LSTMCell { w_ih, w_hh, b_ih, b_hh, hidden_size }
    }

    pub fn input_size(&self) -> usize {
        self.w_ih.ncols()
    }

    /// Checks that every parameter matrix agrees with `hidden_size`.
    ///
    /// Returns a description of the first inconsistency found.
    pub fn check_dimensions(&self) -> Result<(), String> {
        if self.hidden_size == 0 {
            return Err("hidden_size is zero".to_string());
        }
        let gates = self
            .hidden_size
            .checked_mul(4)
            .ok_or_else(|| format!("hidden_size {} overflows", self.hidden_size))?;
        if self.w_ih.nrows() != gates {
            return Err(format!("w_ih has {} rows, expected {}", self.w_ih.nrows(), gates));
        }
        if self.w_hh.dim() != (gates, self.hidden_size) {
            return Err(format!("w_hh has shape {:?}, expected {:?}", self.w_hh.dim(), (gates, self.hidden_size)));
        }
        for (name, bias) in [("b_ih", &self.b_ih), ("b_hh", &self.b_hh)] {
            if bias.dim() != (gates, 1) {
                return Err(format!("{} has shape {:?}, expected {:?}", name, bias.dim(), (gates, 1)));
            }
        }
        Ok(())
    }

    /// Single time step. `input` is (input_size, 1), states are (hidden_size, 1).
    pub fn forward(&self, input: &Array2<f64>, hx: &Array2<f64>, cx: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let h = self.hidden_size;

        // Compute all gates in one go: [input_gate, forget_gate, cell_gate, output_gate]
        let gates = &self.w_ih.dot(input) + &self.b_ih + &self.w_hh.dot(hx) + &self.b_hh;

        let input_gate = gates.slice(s![0..h, ..]).map(|&x| sigmoid(x));
        let forget_gate = gates.slice(s![h..2*h, ..]).map(|&x| sigmoid(x));
        let cell_gate = gates.slice(s![2*h..3*h, ..]).map(|&x| x.tanh());
        let output_gate = gates.slice(s![3*h..4*h, ..]).map(|&x| sigmoid(x));

        // Cell state update: f_t ⊙ c_t-1 + i_t ⊙ g_t
        let cy = &forget_gate * cx + &input_gate * &cell_gate;

        // Hidden state: o_t ⊙ tanh(c_t)
        let hy = &output_gate * &cy.map(|&x| x.tanh());

        (hy, cy)
    }
}
