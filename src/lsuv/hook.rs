//! Forward-pass observation hooks.
//!
//! A [`ForwardHooks`] registry binds layer paths to callbacks that receive
//! the layer's output tensor right after it is produced. The registry is
//! passed into [`Module::forward_hooked`](crate::nn::Module::forward_hooked)
//! by [`forward_with_hooks`]; containers fire the callbacks for each child
//! output they produce.
//!
//! The calibrator creates one registry per target layer and drops it when
//! that layer is done, so detachment is guaranteed on every exit path and a
//! hook can never observe another layer's calibration.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::finder::LayerPath;
use super::stats::ActivationStats;
use crate::error::{CalibrarError, Result};
use crate::nn::Module;
use crate::tensor::Tensor;

/// Callback invoked with a layer's output tensor.
pub type HookCallback = Box<dyn FnMut(&Tensor)>;

/// Disposable handle returned by [`ForwardHooks::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "detach the hook with ForwardHooks::remove when done"]
pub struct HookHandle {
    id: u64,
}

struct HookEntry {
    id: u64,
    path: LayerPath,
    callback: HookCallback,
}

/// Registry of observers keyed by layer path.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use calibrar::lsuv::{forward_with_hooks, ActivationStats, ForwardHooks, LayerPath};
/// use calibrar::nn::{ConvBlock, Sequential};
/// use calibrar::Tensor;
///
/// let model = Sequential::new().add(ConvBlock::new(1, 2, 3, 1, 1));
/// let batch = Tensor::ones(&[1, 1, 4, 4]);
///
/// let stats = Rc::new(RefCell::new(ActivationStats::new()));
/// let sink = Rc::clone(&stats);
///
/// let hooks = ForwardHooks::new();
/// let handle = hooks.attach(
///     LayerPath::new(vec![0]),
///     Box::new(move |out| sink.borrow_mut().observe(out)),
/// );
///
/// let _ = forward_with_hooks(&model, &batch, &hooks);
/// assert_eq!(stats.borrow().passes, 1);
///
/// hooks.remove(handle);
/// assert!(hooks.is_empty());
/// ```
pub struct ForwardHooks {
    entries: RefCell<Vec<HookEntry>>,
    next_id: Cell<u64>,
}

impl ForwardHooks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a callback for the layer at `path`.
    pub fn attach(&self, path: LayerPath, callback: HookCallback) -> HookHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries
            .borrow_mut()
            .push(HookEntry { id, path, callback });
        HookHandle { id }
    }

    /// Detach a previously registered hook.
    ///
    /// Returns `true` when the handle was still attached.
    pub fn remove(&self, handle: HookHandle) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id != handle.id);
        entries.len() != before
    }

    /// Number of attached hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no hooks are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Invoke every callback registered for `path` with `output`.
    ///
    /// Called by container layers as they produce each child's output.
    /// Observation is read-only with respect to the tensor.
    pub fn fire(&self, path: &[usize], output: &Tensor) {
        for entry in self.entries.borrow_mut().iter_mut() {
            if entry.path.indices() == path {
                (entry.callback)(output);
            }
        }
    }
}

impl Default for ForwardHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ForwardHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardHooks")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Run one full-model forward pass, firing registered hooks along the way.
///
/// The root's own output fires under the empty (root) path.
pub fn forward_with_hooks(model: &dyn Module, input: &Tensor, hooks: &ForwardHooks) -> Tensor {
    let mut path = Vec::new();
    let output = model.forward_hooked(input, hooks, &mut path);
    debug_assert!(path.is_empty(), "containers must pop every index they push");
    hooks.fire(&path, &output);
    output
}

/// Observe one layer's output statistics on a single forward pass.
///
/// Attaches a fresh hook, runs one pass, detaches, and returns the record.
///
/// # Errors
///
/// Returns [`CalibrarError::HookNotFired`] when the forward pass never
/// produced an output at `path`.
pub fn layer_statistics(
    model: &dyn Module,
    batch: &Tensor,
    path: &LayerPath,
) -> Result<ActivationStats> {
    let stats = Rc::new(RefCell::new(ActivationStats::new()));
    let sink = Rc::clone(&stats);

    let hooks = ForwardHooks::new();
    let handle = hooks.attach(
        path.clone(),
        Box::new(move |output| sink.borrow_mut().observe(output)),
    );

    let _ = forward_with_hooks(model, batch, &hooks);
    hooks.remove(handle);

    let snapshot = *stats.borrow();
    if snapshot.passes == 0 {
        return Err(CalibrarError::HookNotFired { path: path.clone() });
    }
    Ok(snapshot)
}
