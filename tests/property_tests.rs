//! Property-based tests for the statistics and calibration invariants.

use calibrar::lsuv::ActivationStats;
use calibrar::nn::{ConvBlock, Module};
use calibrar::Tensor;
use proptest::prelude::*;

fn finite_values() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-100.0f32..100.0, 1..256)
}

proptest! {
    /// The standard deviation is always the square root of the variance.
    #[test]
    fn prop_std_dev_is_sqrt_variance(values in finite_values()) {
        let mut stats = ActivationStats::new();
        stats.observe(&Tensor::from_slice(&values));

        prop_assert!((stats.std_dev - stats.variance.sqrt()).abs() < 1e-12);
        prop_assert!(stats.variance >= 0.0);
    }

    /// The mean lies within the observed value range.
    #[test]
    fn prop_mean_within_value_range(values in finite_values()) {
        let mut stats = ActivationStats::new();
        stats.observe(&Tensor::from_slice(&values));

        let min = f64::from(values.iter().copied().fold(f32::INFINITY, f32::min));
        let max = f64::from(values.iter().copied().fold(f32::NEG_INFINITY, f32::max));
        prop_assert!(stats.mean >= min - 1e-9);
        prop_assert!(stats.mean <= max + 1e-9);
    }

    /// Observation never alters the tensor it reads.
    #[test]
    fn prop_observe_is_read_only(values in finite_values()) {
        let tensor = Tensor::from_slice(&values);
        let before = tensor.data().to_vec();

        let mut stats = ActivationStats::new();
        stats.observe(&tensor);
        stats.observe(&tensor);

        prop_assert_eq!(tensor.data(), &before[..]);
        prop_assert_eq!(stats.passes, 2);
    }

    /// ReLU is positively homogeneous: relu(k * x) == k * relu(x) for k > 0.
    /// This is the property that lets weight rescaling converge in one step.
    #[test]
    fn prop_relu_positive_homogeneity(
        values in finite_values(),
        k in 0.01f32..10.0,
    ) {
        let x = Tensor::from_slice(&values);

        let scaled_then_relu: Vec<f32> =
            values.iter().map(|&v| (k * v).max(0.0)).collect();
        let relu_then_scaled: Vec<f32> =
            x.relu().data().iter().map(|&v| k * v).collect();

        for (a, b) in scaled_then_relu.iter().zip(&relu_then_scaled) {
            prop_assert!((a - b).abs() <= 1e-4 * a.abs().max(1.0));
        }
    }

    /// Rescaling a bias-free conv block's weights by k scales the output
    /// standard deviation by exactly k while the block's shift is zero.
    #[test]
    fn prop_weight_rescale_scales_std_linearly(
        k in 0.1f32..5.0,
        seed in 0u64..32,
    ) {
        let mut block = ConvBlock::with_seed(1, 4, 3, 1, 1, Some(seed));
        let batch = calibrar::nn::init::normal(&[4, 1, 6, 6], 0.0, 1.0, Some(seed + 100));

        let mut before = ActivationStats::new();
        before.observe(&block.forward(&batch));

        {
            let site = block.calibration().expect("conv block has a site");
            for w in site.weight.data_mut() {
                *w *= k;
            }
        }

        let mut after = ActivationStats::new();
        after.observe(&block.forward(&batch));

        let expected = f64::from(k) * before.std_dev;
        prop_assert!(
            (after.std_dev - expected).abs() <= 1e-3 * expected.max(1e-6),
            "std {} after rescale by {k}, expected {expected}",
            after.std_dev
        );
    }
}
