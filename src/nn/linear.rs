//! Fully connected (linear) layer.
//!
//! Implements the transformation y = xW^T + b.

use super::init::kaiming_uniform;
use super::module::Module;
use crate::tensor::Tensor;

/// Fully connected layer: y = xW^T + b
///
/// # Shape
///
/// - Input: `(N, in_features)`
/// - Output: `(N, out_features)`
///
/// # Example
///
/// ```
/// use calibrar::nn::{Linear, Module};
/// use calibrar::Tensor;
///
/// let layer = Linear::new(20, 30);
/// let x = Tensor::zeros(&[128, 20]);
/// let output = layer.forward(&x);
/// assert_eq!(output.shape(), &[128, 30]);
/// ```
pub struct Linear {
    /// Weight matrix, shape: [out_features, in_features]
    weight: Tensor,

    /// Bias vector, shape: [out_features]
    bias: Tensor,

    /// Number of input features
    in_features: usize,

    /// Number of output features
    out_features: usize,
}

impl Linear {
    /// Create a new Linear layer with Kaiming initialization.
    #[must_use]
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_seed(in_features, out_features, None)
    }

    /// Create a Linear layer with a specific random seed.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        let weight = kaiming_uniform(&[out_features, in_features], in_features, seed);
        let bias = Tensor::zeros(&[out_features]);

        Self {
            weight,
            bias,
            in_features,
            out_features,
        }
    }

    /// Get the input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Get the output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Tensor {
        assert_eq!(
            input.ndim(),
            2,
            "Linear expects 2D input [N, in_features], got {}D",
            input.ndim()
        );
        assert_eq!(
            input.shape()[1],
            self.in_features,
            "Expected {} input features, got {}",
            self.in_features,
            input.shape()[1]
        );

        // y = x @ W^T + b
        let output = input.matmul(&self.weight.transpose());

        let batch = output.shape()[0];
        let mut data = output.data().to_vec();
        let bias = self.bias.data();
        for n in 0..batch {
            for (j, &b) in bias.iter().enumerate() {
                data[n * self.out_features + j] += b;
            }
        }
        Tensor::new(&data, &[batch, self.out_features])
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }
}

impl std::fmt::Debug for Linear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linear")
            .field("in_features", &self.in_features)
            .field("out_features", &self.out_features)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_forward_shape() {
        let layer = Linear::new(10, 5);
        let x = Tensor::ones(&[32, 10]);
        let output = layer.forward(&x);

        assert_eq!(output.shape(), &[32, 5]);
    }

    #[test]
    fn test_linear_parameters() {
        let layer = Linear::new(10, 5);
        let params = layer.parameters();

        assert_eq!(params.len(), 2); // weight + bias
        assert_eq!(params[0].shape(), &[5, 10]); // weight
        assert_eq!(params[1].shape(), &[5]); // bias
    }

    #[test]
    fn test_linear_num_parameters() {
        let layer = Linear::new(10, 5);
        // weight: 10*5 = 50, bias: 5, total: 55
        assert_eq!(layer.num_parameters(), 55);
    }

    #[test]
    fn test_linear_reproducible() {
        let layer1 = Linear::with_seed(10, 5, Some(42));
        let layer2 = Linear::with_seed(10, 5, Some(42));

        assert_eq!(layer1.parameters()[0].data(), layer2.parameters()[0].data());
    }

    #[test]
    fn test_linear_identity_like() {
        let mut layer = Linear::with_seed(3, 3, Some(42));

        // Set weight to identity, bias stays zero
        let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        layer.parameters_mut()[0]
            .data_mut()
            .copy_from_slice(&identity);

        let x = Tensor::new(&[1.0, 2.0, 3.0], &[1, 3]);
        let output = layer.forward(&x);

        let out_data = output.data();
        assert!((out_data[0] - 1.0).abs() < 1e-5);
        assert!((out_data[1] - 2.0).abs() < 1e-5);
        assert!((out_data[2] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_linear_with_bias() {
        let mut layer = Linear::with_seed(2, 2, Some(42));

        layer.parameters_mut()[0]
            .data_mut()
            .copy_from_slice(&[1.0, 0.0, 0.0, 1.0]);
        layer.parameters_mut()[1]
            .data_mut()
            .copy_from_slice(&[10.0, 20.0]);

        let x = Tensor::new(&[1.0, 2.0], &[1, 2]);
        let output = layer.forward(&x);

        // y = x @ W^T + b = [1, 2] + [10, 20] = [11, 22]
        let out_data = output.data();
        assert!((out_data[0] - 11.0).abs() < 1e-5);
        assert!((out_data[1] - 22.0).abs() < 1e-5);
    }
}
