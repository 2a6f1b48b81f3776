//! Convolutional block: the unit of LSUV calibration.

use super::activation::ShiftedReLU;
use super::conv::Conv2d;
use super::module::{CalibrationSite, Module};
use crate::lsuv::hook::ForwardHooks;
use crate::tensor::Tensor;

/// A bias-free [`Conv2d`] followed by a [`ShiftedReLU`].
///
/// The convolution carries no bias of its own; the block's only additive
/// parameter is the activation shift, which is exactly the scalar the LSUV
/// mean phase adjusts. A statistics hook attached to the block therefore
/// observes the post-activation output the calibrator steers.
///
/// # Example
///
/// ```
/// use calibrar::nn::{ConvBlock, Module};
/// use calibrar::Tensor;
///
/// let block = ConvBlock::new(1, 8, 3, 2, 1);
/// let x = Tensor::zeros(&[2, 1, 28, 28]);
/// let y = block.forward(&x);
/// assert_eq!(y.shape(), &[2, 8, 14, 14]);
/// assert!(block.is_calibratable());
/// ```
pub struct ConvBlock {
    conv: Conv2d,
    act: ShiftedReLU,
}

impl ConvBlock {
    /// Create a conv block with a square kernel.
    #[must_use]
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
    ) -> Self {
        Self::with_seed(in_channels, out_channels, kernel_size, stride, padding, None)
    }

    /// Create a conv block with a specific random seed for the weights.
    #[must_use]
    pub fn with_seed(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
        seed: Option<u64>,
    ) -> Self {
        Self {
            conv: Conv2d::with_options(
                in_channels,
                out_channels,
                (kernel_size, kernel_size),
                (stride, stride),
                (padding, padding),
                false,
                seed,
            ),
            act: ShiftedReLU::new(),
        }
    }

    /// The convolution of this block.
    #[must_use]
    pub fn conv(&self) -> &Conv2d {
        &self.conv
    }

    /// The shifted activation of this block.
    #[must_use]
    pub fn activation(&self) -> &ShiftedReLU {
        &self.act
    }
}

impl Module for ConvBlock {
    fn forward(&self, input: &Tensor) -> Tensor {
        self.act.forward(&self.conv.forward(input))
    }

    fn forward_hooked(&self, input: &Tensor, hooks: &ForwardHooks, path: &mut Vec<usize>) -> Tensor {
        path.push(0);
        let hidden = self.conv.forward_hooked(input, hooks, path);
        hooks.fire(path, &hidden);
        path.pop();

        path.push(1);
        let output = self.act.forward_hooked(&hidden, hooks, path);
        hooks.fire(path, &output);
        path.pop();

        output
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.conv.parameters();
        params.extend(self.act.parameters());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.conv.parameters_mut();
        params.extend(self.act.parameters_mut());
        params
    }

    fn children(&self) -> Vec<&dyn Module> {
        vec![&self.conv, &self.act]
    }

    fn children_mut(&mut self) -> Vec<&mut dyn Module> {
        vec![&mut self.conv, &mut self.act]
    }

    fn is_calibratable(&self) -> bool {
        true
    }

    fn calibration(&mut self) -> Option<CalibrationSite<'_>> {
        Some(CalibrationSite {
            weight: self.conv.weight_mut(),
            shift: Some(self.act.shift_mut()),
        })
    }
}

impl std::fmt::Debug for ConvBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvBlock")
            .field("conv", &self.conv)
            .field("shift", &self.act.shift())
            .finish()
    }
}
