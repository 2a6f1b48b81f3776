//! Activation statistics records.

use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// Population statistics of one layer output on one forward pass.
///
/// Statistics are recomputed from scratch on every observation; no history
/// is kept beyond the most recent pass. `passes` counts observations so a
/// caller can verify that a statistics read is backed by exactly one fresh
/// forward pass rather than a stale record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivationStats {
    /// Population mean over every element of the output.
    pub mean: f64,
    /// Population variance over every element of the output.
    pub variance: f64,
    /// Population standard deviation (`variance.sqrt()`).
    pub std_dev: f64,
    /// Number of observations recorded so far.
    pub passes: u64,
}

impl ActivationStats {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the statistics of one output tensor.
    ///
    /// Population statistics over all elements — across batch, channel and
    /// spatial dimensions alike. Accumulation happens in f64 so large
    /// activations don't lose precision. The tensor itself is untouched.
    pub fn observe(&mut self, output: &Tensor) {
        let n = output.numel();
        if n == 0 {
            self.mean = 0.0;
            self.variance = 0.0;
            self.std_dev = 0.0;
            self.passes += 1;
            return;
        }

        let data = output.data();
        let sum: f64 = data.iter().map(|&v| f64::from(v)).sum();
        let mean = sum / n as f64;

        let sum_sq: f64 = data
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum();

        self.mean = mean;
        self.variance = sum_sq / n as f64;
        self.std_dev = self.variance.sqrt();
        self.passes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_computes_population_stats() {
        let mut stats = ActivationStats::new();
        stats.observe(&Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0]));

        assert!((stats.mean - 2.5).abs() < 1e-12);
        // population variance: mean of squared deviations = 1.25
        assert!((stats.variance - 1.25).abs() < 1e-12);
        assert!((stats.std_dev - 1.25_f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.passes, 1);
    }

    #[test]
    fn test_observe_replaces_previous_record() {
        let mut stats = ActivationStats::new();
        stats.observe(&Tensor::from_slice(&[10.0, 10.0]));
        stats.observe(&Tensor::from_slice(&[0.0, 0.0]));

        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.passes, 2);
    }

    #[test]
    fn test_observe_constant_output_has_zero_variance() {
        let mut stats = ActivationStats::new();
        stats.observe(&Tensor::ones(&[2, 3, 4]));

        assert!((stats.mean - 1.0).abs() < 1e-12);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_observe_empty_tensor() {
        let mut stats = ActivationStats::new();
        stats.observe(&Tensor::zeros(&[0]));

        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.passes, 1);
    }

    #[test]
    fn test_stats_serde_round_trip() {
        let mut stats = ActivationStats::new();
        stats.observe(&Tensor::from_slice(&[1.0, 3.0]));

        let json = serde_json::to_string(&stats).expect("serialize");
        let back: ActivationStats = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(stats, back);
    }
}
