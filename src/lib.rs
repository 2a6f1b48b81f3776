//! Calibrar: layer-sequential unit-variance (LSUV) calibration in pure Rust.
//!
//! Calibrar rescales the weights of a convolutional network, layer by layer
//! in forward order, until every convolutional block emits activations with
//! approximately unit variance and zero mean on a fixed calibration batch
//! (Mishkin & Matas, 2016). It ships the calibration core together with the
//! minimal tensor and layer substrate needed to run it.
//!
//! # Quick Start
//!
//! ```
//! use calibrar::prelude::*;
//!
//! // Two stride-2 conv blocks and a linear head on 8x8 inputs.
//! let mut model = Sequential::new()
//!     .add(ConvBlock::with_seed(1, 4, 3, 2, 1, Some(0)))
//!     .add(ConvBlock::with_seed(4, 8, 3, 2, 1, Some(1)))
//!     .add(Flatten::new())
//!     .add(Linear::with_seed(8 * 2 * 2, 10, Some(2)));
//!
//! let batch = calibrar::nn::init::normal(&[16, 1, 8, 8], 0.0, 1.0, Some(3));
//! let reports = calibrar::lsuv::calibrate(&mut model, &batch).unwrap();
//!
//! assert_eq!(reports.len(), 2);
//! for report in &reports {
//!     assert!((report.variance - 1.0).abs() <= 1e-3);
//!     assert!(report.mean.abs() <= 1e-3);
//! }
//! ```
//!
//! # Modules
//!
//! - [`tensor`]: Dense f32 tensor storage
//! - [`nn`]: The [`nn::Module`] trait and layers (`Conv2d`, `ConvBlock`,
//!   `Linear`, `Sequential`, ...)
//! - [`lsuv`]: Statistics hooks, the module finder and the LSUV calibrator
//! - [`error`]: Error types
//!
//! # References
//!
//! - Mishkin, D., & Matas, J. (2016). All you need is a good init. ICLR.
//! - He, K., et al. (2015). Delving deep into rectifiers. ICCV.

pub mod error;
pub mod lsuv;
pub mod nn;
pub mod prelude;
pub mod tensor;

pub use error::{CalibrarError, Result};
pub use tensor::Tensor;
