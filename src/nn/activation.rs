//! Activation function modules.
//!
//! # References
//!
//! - Nair, V., & Hinton, G. E. (2010). Rectified linear units improve restricted
//!   Boltzmann machines. ICML.

use super::module::Module;
use crate::tensor::Tensor;

/// Rectified Linear Unit activation: ReLU(x) = max(0, x)
///
/// # Shape
///
/// - Input: `(*)` any shape
/// - Output: `(*)` same shape as input
///
/// # Example
///
/// ```
/// use calibrar::nn::{Module, ReLU};
/// use calibrar::Tensor;
///
/// let relu = ReLU::new();
/// let x = Tensor::from_slice(&[-1.0, 0.0, 1.0, 2.0]);
/// let y = relu.forward(&x);
/// assert_eq!(y.data(), &[0.0, 0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReLU;

impl ReLU {
    /// Create a new ReLU activation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Module for ReLU {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.relu()
    }
}

/// ReLU with a learnable scalar shift: `max(x, 0) + shift`.
///
/// The shift is the activation bias the LSUV mean phase adjusts: it is ADDED
/// to the rectified output, so subtracting the observed mean from it drives
/// the post-activation mean toward zero.
pub struct ShiftedReLU {
    /// Learnable activation bias, shape `[1]`.
    shift: Tensor,
}

impl ShiftedReLU {
    /// Create a shifted ReLU with zero initial shift.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shift: Tensor::zeros(&[1]),
        }
    }

    /// Current value of the shift.
    #[must_use]
    pub fn shift(&self) -> f32 {
        self.shift.data()[0]
    }

    /// Mutable access to the shift scalar.
    pub fn shift_mut(&mut self) -> &mut f32 {
        &mut self.shift.data_mut()[0]
    }
}

impl Default for ShiftedReLU {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ShiftedReLU {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.relu().add_scalar(self.shift())
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.shift]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.shift]
    }
}

impl std::fmt::Debug for ShiftedReLU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShiftedReLU")
            .field("shift", &self.shift())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_clips_negatives() {
        let relu = ReLU::new();
        let x = Tensor::from_slice(&[-2.0, -0.5, 0.0, 3.0]);
        assert_eq!(relu.forward(&x).data(), &[0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_relu_has_no_parameters() {
        let relu = ReLU::new();
        assert!(relu.parameters().is_empty());
        assert_eq!(relu.num_parameters(), 0);
    }

    #[test]
    fn test_shifted_relu_adds_shift() {
        let mut act = ShiftedReLU::new();
        *act.shift_mut() = -0.25;

        let x = Tensor::from_slice(&[-1.0, 2.0]);
        let y = act.forward(&x);
        assert_eq!(y.data(), &[-0.25, 1.75]);
    }

    #[test]
    fn test_shifted_relu_default_is_plain_relu() {
        let act = ShiftedReLU::new();
        let x = Tensor::from_slice(&[-1.0, 0.5]);
        assert_eq!(act.forward(&x).data(), &[0.0, 0.5]);
    }

    #[test]
    fn test_shifted_relu_shift_is_a_parameter() {
        let act = ShiftedReLU::new();
        assert_eq!(act.num_parameters(), 1);
    }
}
