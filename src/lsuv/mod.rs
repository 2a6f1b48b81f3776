//! Layer-Sequential Unit-Variance (LSUV) initialization.
//!
//! LSUV calibrates a freshly initialized network so that every targeted
//! layer's output has unit variance and zero mean on a fixed data batch.
//! Layers are calibrated one at a time in forward order, so each layer sees
//! inputs already conditioned by its predecessors.
//!
//! The common entry point is [`calibrate`]:
//!
//! ```
//! use calibrar::nn::{ConvBlock, Flatten, Linear, Sequential};
//! use calibrar::Tensor;
//!
//! let mut model = Sequential::new()
//!     .add(ConvBlock::with_seed(1, 4, 3, 2, 1, Some(0)))
//!     .add(Flatten::new())
//!     .add(Linear::with_seed(4 * 4 * 4, 10, Some(1)));
//!
//! let batch = calibrar::nn::init::normal(&[16, 1, 8, 8], 0.0, 1.0, Some(2));
//! let reports = calibrar::lsuv::calibrate(&mut model, &batch).unwrap();
//!
//! assert_eq!(reports.len(), 1);
//! assert!(reports[0].outcome.is_converged());
//! ```

pub mod calibrate;
pub mod finder;
pub mod hook;
pub mod stats;

pub use calibrate::{calibrate_layer, LayerOutcome, LayerReport, LsuvConfig, Phase};
pub use finder::{find_target_layers, layer_at, layer_at_mut, LayerPath};
pub use hook::{forward_with_hooks, layer_statistics, ForwardHooks, HookCallback, HookHandle};
pub use stats::ActivationStats;

use crate::error::Result;
use crate::nn::Module;
use crate::tensor::Tensor;

/// Calibrate every layer matching `predicate`, in forward order.
///
/// Targets are located once before any calibration, then processed strictly
/// in definition order on the same fixed `batch`. Recoverable conditions
/// (non-convergence, degenerate statistics) are carried on the individual
/// [`LayerReport`]s and never stop the remaining layers; structural faults
/// abort the run with an error.
///
/// Returns one report per target, in calibration order. An empty model or a
/// predicate with no matches yields an empty report list.
///
/// # Errors
///
/// Propagates the structural errors of [`calibrate_layer`].
pub fn calibrate_model(
    model: &mut dyn Module,
    batch: &Tensor,
    predicate: &dyn Fn(&dyn Module) -> bool,
    config: &LsuvConfig,
) -> Result<Vec<LayerReport>> {
    let targets = find_target_layers(&*model, predicate);
    let mut reports = Vec::with_capacity(targets.len());
    for path in &targets {
        reports.push(calibrate_layer(model, path, batch, config)?);
    }
    Ok(reports)
}

/// Calibrate every [calibratable](Module::is_calibratable) layer with the
/// default tolerances.
///
/// # Errors
///
/// Propagates the structural errors of [`calibrate_layer`].
pub fn calibrate(model: &mut dyn Module, batch: &Tensor) -> Result<Vec<LayerReport>> {
    calibrate_model(
        model,
        batch,
        &|m| m.is_calibratable(),
        &LsuvConfig::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::{ConvBlock, Flatten, Linear, Sequential};

    #[test]
    fn test_calibrate_reports_every_block_in_order() {
        let mut model = Sequential::new()
            .add(ConvBlock::with_seed(1, 4, 3, 2, 1, Some(0)))
            .add(ConvBlock::with_seed(4, 8, 3, 2, 1, Some(1)))
            .add(Flatten::new())
            .add(Linear::with_seed(8 * 2 * 2, 10, Some(2)));
        let batch = crate::nn::init::normal(&[8, 1, 8, 8], 0.0, 1.0, Some(3));

        let reports = calibrate(&mut model, &batch).expect("reports");

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].path, LayerPath::new(vec![0]));
        assert_eq!(reports[1].path, LayerPath::new(vec![1]));
        for report in &reports {
            assert!(report.outcome.is_converged(), "{report:?}");
        }
    }

    #[test]
    fn test_calibrate_empty_model_yields_no_reports() {
        let mut model = Sequential::new();
        let batch = Tensor::ones(&[1, 4]);
        let reports = calibrate(&mut model, &batch).expect("reports");
        assert!(reports.is_empty());
    }

    #[test]
    fn test_calibrate_model_with_nonmatching_predicate() {
        let mut model = Sequential::new().add(ConvBlock::with_seed(1, 2, 3, 1, 1, Some(0)));
        let batch = Tensor::ones(&[1, 1, 4, 4]);

        let reports = calibrate_model(&mut model, &batch, &|_| false, &LsuvConfig::default())
            .expect("reports");
        assert!(reports.is_empty());
    }
}
