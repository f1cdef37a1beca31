use ndarray::Array2;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;

/// A fully connected (dense) output layer
///
/// Performs the transformation: output = weight @ input + bias
/// where weight has shape (output_size, input_size) and bias has shape (output_size, 1)
#[derive(Clone, Debug)]
pub struct LinearLayer {
    pub weight: Array2<f64>,     // (output_size, input_size)
    pub bias: Array2<f64>,       // (output_size, 1)
    pub input_size: usize,
    pub output_size: usize,
}

impl LinearLayer {
    /// Create a new linear layer with Xavier/Glorot uniform initialization
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self::new_using(input_size, output_size, &mut rand::thread_rng())
    }

    pub fn new_using<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        // scale by sqrt(2 / (input_size + output_size))
        let scale = (2.0 / (input_size + output_size) as f64).sqrt();

        let weight = Array2::random_using((output_size, input_size), Uniform::new(-scale, scale), rng);
        let bias = Array2::zeros((output_size, 1));

        Self { weight, bias, input_size, output_size }
    }

    /// Build a layer from existing parameters
    ///
    /// # Returns
    /// * `Err` describing the problem when `bias` is not (output_size, 1)
    pub fn from_weights(weight: Array2<f64>, bias: Array2<f64>) -> Result<Self, String> {
        let (output_size, input_size) = weight.dim();
        if bias.dim() != (output_size, 1) {
            return Err(format!(
                "bias has shape {:?}, expected {:?}",
                bias.dim(),
                (output_size, 1)
            ));
        }

        Ok(Self { weight, bias, input_size, output_size })
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape (input_size, batch_size)
    ///
    /// # Returns
    /// * Output tensor of shape (output_size, batch_size)
    pub fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        debug_assert_eq!(input.nrows(), self.input_size);
        // bias broadcasts across the batch dimension
        &self.weight.dot(input) + &self.bias
    }

    pub fn num_parameters(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}
