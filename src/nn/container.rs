//! Container modules for composing neural networks.

use super::module::Module;
use crate::lsuv::hook::ForwardHooks;
use crate::tensor::Tensor;

/// Sequential container for chaining modules.
///
/// Modules are executed in order, with each module's output becoming the
/// next module's input. The container exposes its children for tree walks
/// and fires registered hooks with each child's output during
/// [`forward_hooked`](Module::forward_hooked).
///
/// # Example
///
/// ```
/// use calibrar::nn::{Linear, Module, ReLU, Sequential};
/// use calibrar::Tensor;
///
/// let model = Sequential::new()
///     .add(Linear::new(784, 256))
///     .add(ReLU::new())
///     .add(Linear::new(256, 10));
///
/// let x = Tensor::zeros(&[32, 784]);
/// let output = model.forward(&x);
/// assert_eq!(output.shape(), &[32, 10]);
/// ```
pub struct Sequential {
    modules: Vec<Box<dyn Module>>,
}

impl Sequential {
    /// Create an empty Sequential container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Add a module to the sequence.
    ///
    /// Returns self for method chaining.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn add<M: Module + 'static>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Add a module by boxed trait object.
    #[must_use]
    pub fn add_boxed(mut self, module: Box<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }

    /// Get the number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for Sequential {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Sequential {
    fn forward(&self, input: &Tensor) -> Tensor {
        self.modules
            .iter()
            .fold(input.clone(), |x, module| module.forward(&x))
    }

    fn forward_hooked(&self, input: &Tensor, hooks: &ForwardHooks, path: &mut Vec<usize>) -> Tensor {
        let mut x = input.clone();
        for (index, module) in self.modules.iter().enumerate() {
            path.push(index);
            x = module.forward_hooked(&x, hooks, path);
            hooks.fire(path, &x);
            path.pop();
        }
        x
    }

    fn parameters(&self) -> Vec<&Tensor> {
        self.modules.iter().flat_map(|m| m.parameters()).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.modules
            .iter_mut()
            .flat_map(|m| m.parameters_mut())
            .collect()
    }

    fn children(&self) -> Vec<&dyn Module> {
        self.modules.iter().map(AsRef::as_ref).collect()
    }

    fn children_mut(&mut self) -> Vec<&mut dyn Module> {
        self.modules
            .iter_mut()
            .map(|m| &mut **m as &mut dyn Module)
            .collect()
    }
}

impl std::fmt::Debug for Sequential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequential")
            .field("num_modules", &self.modules.len())
            .finish()
    }
}
