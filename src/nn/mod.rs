//! Neural network layers for calibration demos.
//!
//! The module is organized around the [`Module`] trait, which defines the
//! interface for all layers:
//!
//! - **Layers**: [`Linear`], [`Conv2d`], [`Flatten`]
//! - **Blocks**: [`ConvBlock`] (bias-free convolution + shifted ReLU), the
//!   unit the LSUV calibrator targets
//! - **Activations**: [`ReLU`], [`ShiftedReLU`]
//! - **Containers**: [`Sequential`]
//!
//! # Example
//!
//! ```
//! use calibrar::nn::{ConvBlock, Flatten, Linear, Module, Sequential};
//! use calibrar::Tensor;
//!
//! let model = Sequential::new()
//!     .add(ConvBlock::new(1, 4, 3, 2, 1))
//!     .add(Flatten::new())
//!     .add(Linear::new(4 * 4 * 4, 10));
//!
//! let x = Tensor::zeros(&[2, 1, 8, 8]);
//! let logits = model.forward(&x);
//! assert_eq!(logits.shape(), &[2, 10]);
//! ```
//!
//! # References
//!
//! - Paszke, A., et al. (2019). `PyTorch`: An imperative style, high-performance
//!   deep learning library. `NeurIPS`.
//! - He, K., et al. (2015). Delving deep into rectifiers. ICCV.

mod activation;
mod block;
mod container;
mod conv;
pub mod init;
mod linear;
mod module;

pub use activation::{ReLU, ShiftedReLU};
pub use block::ConvBlock;
pub use container::Sequential;
pub use conv::{Conv2d, Flatten};
pub use linear::Linear;
pub use module::{CalibrationSite, Module};
