//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use calibrar::prelude::*;
//! ```

pub use crate::error::{CalibrarError, Result};
pub use crate::lsuv::{
    calibrate, calibrate_layer, calibrate_model, find_target_layers, layer_statistics,
    ActivationStats, LayerOutcome, LayerPath, LayerReport, LsuvConfig, Phase,
};
pub use crate::nn::{Conv2d, ConvBlock, Flatten, Linear, Module, ReLU, Sequential, ShiftedReLU};
pub use crate::tensor::Tensor;
