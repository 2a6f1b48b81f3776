//! The `Module` trait: the layer abstraction all networks are built from.

use crate::lsuv::hook::ForwardHooks;
use crate::tensor::Tensor;

/// Mutable view of a layer's calibratable parameters.
///
/// The LSUV variance phase divides every `weight` element by the observed
/// standard deviation; the mean phase subtracts the observed mean from
/// `shift`. The shift is the scalar activation bias ADDED to the layer's
/// post-activation output, so `shift -= mean` drives the output mean to zero.
pub struct CalibrationSite<'a> {
    /// The learnable weight tensor scaled during the variance phase.
    pub weight: &'a mut Tensor,
    /// The scalar activation bias shifted during the mean phase, when the
    /// layer has one.
    pub shift: Option<&'a mut f32>,
}

/// Interface for all neural network layers.
///
/// Leaves implement [`forward`](Module::forward) and expose their parameter
/// tensors; containers additionally expose [`children`](Module::children) so
/// the layer tree can be walked, and override
/// [`forward_hooked`](Module::forward_hooked) so registered observers see
/// each child's output.
///
/// Layers that LSUV can calibrate report `true` from
/// [`is_calibratable`](Module::is_calibratable) and hand out a
/// [`CalibrationSite`].
pub trait Module {
    /// Runs a forward pass.
    fn forward(&self, input: &Tensor) -> Tensor;

    /// Runs a forward pass, firing any hooks registered for the outputs
    /// produced beneath this node.
    ///
    /// `path` holds the child-index route from the model root to this node;
    /// containers push each child's index before recursing and pop it after
    /// firing. Leaves ignore the hook registry.
    fn forward_hooked(&self, input: &Tensor, hooks: &ForwardHooks, path: &mut Vec<usize>) -> Tensor {
        let _ = (hooks, path);
        self.forward(input)
    }

    /// Immutable views of the learnable parameter tensors.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// Mutable views of the learnable parameter tensors.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    /// Direct children in definition order. Leaves return an empty list.
    fn children(&self) -> Vec<&dyn Module> {
        Vec::new()
    }

    /// Mutable direct children in definition order.
    fn children_mut(&mut self) -> Vec<&mut dyn Module> {
        Vec::new()
    }

    /// Whether this layer is a target for LSUV calibration.
    fn is_calibratable(&self) -> bool {
        false
    }

    /// Mutable access to the calibratable parameters, if any.
    fn calibration(&mut self) -> Option<CalibrationSite<'_>> {
        None
    }

    /// Total number of learnable scalar parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}
