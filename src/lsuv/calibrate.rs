//! The per-layer LSUV calibration loop.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::finder::{layer_at_mut, LayerPath};
use super::hook::{forward_with_hooks, ForwardHooks};
use super::stats::ActivationStats;
use crate::error::{CalibrarError, Result};
use crate::nn::Module;
use crate::tensor::Tensor;

/// Standard deviations below this are treated as degenerate: dividing the
/// weights by them would be numerically meaningless.
const MIN_STD_DEV: f64 = 1e-12;

/// Tolerances and iteration bounds for the calibration loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LsuvConfig {
    /// A statistic is converged when within this distance of its target
    /// (0 for the mean, 1 for the variance).
    pub tolerance: f64,
    /// Maximum weight rescales / bias shifts per phase. Exceeding the bound
    /// reports [`LayerOutcome::NonConvergence`] instead of looping forever.
    pub max_iterations: usize,
}

impl Default for LsuvConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 30,
        }
    }
}

/// The two calibration phases, run in strict order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Weight rescaling toward unit variance.
    Variance,
    /// Activation-bias shifting toward zero mean.
    Mean,
}

/// How one layer's calibration ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayerOutcome {
    /// Both statistics reached tolerance.
    Converged,
    /// A phase hit its iteration bound; the first phase to do so is named.
    /// Recoverable: the reported statistics are the best observed.
    NonConvergence {
        /// The first phase that failed to converge.
        phase: Phase,
    },
    /// The observed standard deviation was (near-)zero or non-finite, so
    /// weight rescaling is undefined. Calibration of this layer was
    /// abandoned; later layers are unaffected.
    DegenerateStatistics {
        /// The offending standard deviation.
        std_dev: f64,
    },
}

impl LayerOutcome {
    /// Whether the layer reached both tolerance targets.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self, LayerOutcome::Converged)
    }
}

/// Per-layer calibration diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    /// Address of the calibrated layer.
    pub path: LayerPath,
    /// Mean observed on the final forward pass.
    pub mean: f64,
    /// Variance observed on the final forward pass.
    pub variance: f64,
    /// Number of weight rescales performed.
    pub variance_iterations: usize,
    /// Number of bias shifts performed.
    pub mean_iterations: usize,
    /// How calibration of this layer ended.
    pub outcome: LayerOutcome,
}

/// Calibrate a single layer toward unit variance and zero mean.
///
/// Runs the two LSUV phases in strict order on the fixed `batch`:
///
/// 1. **Variance**: forward pass, then divide every weight element by the
///    observed standard deviation, until `|variance - 1| <= tolerance`.
/// 2. **Mean**: forward pass, then subtract the observed mean from the
///    layer's activation-bias scalar, until `|mean| <= tolerance`.
///
/// Convergence is checked after each pass on the statistics that pass
/// produced. Each phase is bounded by `config.max_iterations`; exceeding the
/// bound or hitting a degenerate standard deviation is reported on the
/// returned [`LayerReport`], not raised as an error. The statistics hook is
/// detached on every exit path.
///
/// # Errors
///
/// - [`CalibrarError::NoSuchLayer`] when `path` does not resolve.
/// - [`CalibrarError::NotCalibratable`] when the layer has no weight to
///   rescale.
/// - [`CalibrarError::HookNotFired`] when a forward pass fails to reach the
///   layer (model structurally altered mid-calibration).
pub fn calibrate_layer(
    model: &mut dyn Module,
    path: &LayerPath,
    batch: &Tensor,
    config: &LsuvConfig,
) -> Result<LayerReport> {
    // Structural validation up front so the loops below can't half-apply.
    {
        let layer = layer_at_mut(&mut *model, path).ok_or_else(|| CalibrarError::NoSuchLayer {
            path: path.clone(),
        })?;
        if layer.calibration().is_none() {
            return Err(CalibrarError::NotCalibratable { path: path.clone() });
        }
    }

    let stats = Rc::new(RefCell::new(ActivationStats::new()));
    let sink = Rc::clone(&stats);

    // Dropped with this scope, so detachment holds on every exit path.
    let hooks = ForwardHooks::new();
    let _handle = hooks.attach(
        path.clone(),
        Box::new(move |output| sink.borrow_mut().observe(output)),
    );

    let mut outcome = LayerOutcome::Converged;
    let mut variance_iterations = 0;
    let mut degenerate = false;

    let mut snapshot = loop {
        let snap = run_pass(&*model, batch, &hooks, &stats, path)?;

        if (snap.variance - 1.0).abs() <= config.tolerance {
            break snap;
        }
        if !snap.std_dev.is_finite() || snap.std_dev < MIN_STD_DEV {
            outcome = LayerOutcome::DegenerateStatistics {
                std_dev: snap.std_dev,
            };
            degenerate = true;
            break snap;
        }
        if variance_iterations >= config.max_iterations {
            outcome = LayerOutcome::NonConvergence {
                phase: Phase::Variance,
            };
            break snap;
        }

        let scale = (1.0 / snap.std_dev) as f32;
        let site = site_at(model, path)?;
        for w in site.weight.data_mut() {
            *w *= scale;
        }
        variance_iterations += 1;
    };

    let mut mean_iterations = 0;
    if !degenerate {
        // The final variance-phase pass already carries a fresh mean reading.
        loop {
            if snapshot.mean.abs() <= config.tolerance {
                break;
            }
            if mean_iterations >= config.max_iterations {
                if outcome.is_converged() {
                    outcome = LayerOutcome::NonConvergence { phase: Phase::Mean };
                }
                break;
            }

            let site = site_at(model, path)?;
            match site.shift {
                Some(shift) => *shift -= snapshot.mean as f32,
                None => {
                    // No activation bias to adjust; the mean stays where the
                    // variance phase left it.
                    if outcome.is_converged() {
                        outcome = LayerOutcome::NonConvergence { phase: Phase::Mean };
                    }
                    break;
                }
            }
            mean_iterations += 1;

            snapshot = run_pass(&*model, batch, &hooks, &stats, path)?;
        }
    }

    Ok(LayerReport {
        path: path.clone(),
        mean: snapshot.mean,
        variance: snapshot.variance,
        variance_iterations,
        mean_iterations,
        outcome,
    })
}

/// One forward pass over the calibration batch, validated against the hook's
/// pass counter so statistics can never be read stale.
fn run_pass(
    model: &dyn Module,
    batch: &Tensor,
    hooks: &ForwardHooks,
    stats: &Rc<RefCell<ActivationStats>>,
    path: &LayerPath,
) -> Result<ActivationStats> {
    let before = stats.borrow().passes;
    let _ = forward_with_hooks(model, batch, hooks);
    let snapshot = *stats.borrow();
    if snapshot.passes != before + 1 {
        return Err(CalibrarError::HookNotFired { path: path.clone() });
    }
    Ok(snapshot)
}

/// Resolve the calibration site at `path`. The path was validated before the
/// loops started, so failures here mean the model changed underneath us.
fn site_at<'a>(
    model: &'a mut dyn Module,
    path: &LayerPath,
) -> Result<crate::nn::CalibrationSite<'a>> {
    let layer = layer_at_mut(model, path).ok_or_else(|| CalibrarError::NoSuchLayer {
        path: path.clone(),
    })?;
    layer
        .calibration()
        .ok_or_else(|| CalibrarError::NotCalibratable { path: path.clone() })
}
