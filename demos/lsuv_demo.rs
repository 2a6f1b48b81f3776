//! Calibrate a five-block CNN and print per-layer statistics before and
//! after.
//!
//! Run with: `cargo run --example lsuv_demo`

use calibrar::lsuv::{calibrate, find_target_layers, layer_statistics};
use calibrar::nn::{init, ConvBlock, Flatten, Linear, Module, Sequential};
use calibrar::Result;

fn main() -> Result<()> {
    // 28x28 single-channel inputs, halved by each stride-2 block.
    let mut model = Sequential::new()
        .add(ConvBlock::with_seed(1, 8, 5, 2, 2, Some(0)))
        .add(ConvBlock::with_seed(8, 16, 3, 2, 1, Some(1)))
        .add(ConvBlock::with_seed(16, 32, 3, 2, 1, Some(2)))
        .add(ConvBlock::with_seed(32, 64, 3, 2, 1, Some(3)))
        .add(ConvBlock::with_seed(64, 64, 3, 2, 1, Some(4)))
        .add(Flatten::new())
        .add(Linear::with_seed(64, 10, Some(5)));

    let batch = init::normal(&[16, 1, 28, 28], 0.0, 1.0, Some(6));
    let targets = find_target_layers(&model, &|m| m.is_calibratable());

    println!("Before calibration:");
    for path in &targets {
        let stats = layer_statistics(&model, &batch, path)?;
        println!(
            "  {path}: mean {:+.4}  variance {:.4}",
            stats.mean, stats.variance
        );
    }

    let reports = calibrate(&mut model, &batch)?;

    println!("\nAfter calibration:");
    for report in &reports {
        println!(
            "  {}: mean {:+.6}  variance {:.6}  ({} rescales, {} shifts, {:?})",
            report.path,
            report.mean,
            report.variance,
            report.variance_iterations,
            report.mean_iterations,
            report.outcome
        );
    }

    Ok(())
}
