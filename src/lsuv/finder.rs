//! Layer addressing and the module finder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::nn::Module;

/// Address of a layer in the model tree: the child indices from the root.
///
/// The empty path addresses the root itself. Displays as `root.2.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerPath(Vec<usize>);

impl LayerPath {
    /// Create a path from child indices.
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The path of the model root.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The child indices from the root.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Whether this path addresses the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LayerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root")?;
        for index in &self.0 {
            write!(f, ".{index}")?;
        }
        Ok(())
    }
}

/// Find all layers satisfying `predicate`, in depth-first definition order.
///
/// Matching nodes are recorded and NOT descended into, so only the outermost
/// match per branch is kept; non-matching nodes are descended into. For a
/// flat CNN of N sequential conv blocks and the stock
/// [`Module::is_calibratable`] predicate, the result is exactly those N
/// block paths in definition order.
///
/// An empty result is a normal value, never an error.
#[must_use]
pub fn find_target_layers(
    root: &dyn Module,
    predicate: &dyn Fn(&dyn Module) -> bool,
) -> Vec<LayerPath> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    walk(root, predicate, &mut path, &mut found);
    found
}

fn walk(
    node: &dyn Module,
    predicate: &dyn Fn(&dyn Module) -> bool,
    path: &mut Vec<usize>,
    found: &mut Vec<LayerPath>,
) {
    if predicate(node) {
        found.push(LayerPath::new(path.clone()));
        return;
    }
    for (index, child) in node.children().into_iter().enumerate() {
        path.push(index);
        walk(child, predicate, path, found);
        path.pop();
    }
}

/// Resolve a path to the layer it addresses.
#[must_use]
pub fn layer_at<'a>(root: &'a dyn Module, path: &LayerPath) -> Option<&'a dyn Module> {
    let mut node = root;
    for &index in path.indices() {
        node = *node.children().get(index)?;
    }
    Some(node)
}

/// Resolve a path to a mutable reference to the layer it addresses.
pub fn layer_at_mut<'a>(
    root: &'a mut dyn Module,
    path: &LayerPath,
) -> Option<&'a mut dyn Module> {
    let mut node = root;
    for &index in path.indices() {
        node = node.children_mut().into_iter().nth(index)?;
    }
    Some(node)
}
