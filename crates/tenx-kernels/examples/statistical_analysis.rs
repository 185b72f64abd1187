//! Statistical Analysis Example for tenx Kernels
//!
//! This example demonstrates reductions over lazy expressions:
//! - Whole-tensor statistics (mean, min, max)
//! - Per-axis statistics (mean, min, max along one axis)
//! - Variance built from composable axis reductions
//!
//! Run with:
//! ```bash
//! cargo run --example statistical_analysis
//! ```

use tenx_core::{Expression, ExpressionExt, Tensor};
use tenx_kernels::*;

fn main() -> anyhow::Result<()> {
    println!("=== tenx Statistical Analysis Demo ===\n");

    // ========================================================================
    // 1. Basic Statistics
    // ========================================================================
    println!("1. BASIC STATISTICS");
    println!("{}", "=".repeat(60));

    // Shape: [3 sensors, 24 hours, 7 days]
    let sensor_data = Tensor::from_shape_fn(&[3, 24, 7], |idx| {
        let sensor = idx[0] as f64;
        let hour = idx[1] as f64;
        let day = idx[2] as f64;

        20.0 + sensor * 2.0
            + 5.0 * (hour / 24.0).sin()
            + 2.0 * (day / 7.0).cos()
            + (idx[0] * idx[1] + idx[2]) as f64 * 0.1
    });

    println!("Sensor data shape: {:?}", sensor_data.shape());
    println!("Total measurements: {}\n", sensor_data.len());
    println!("  Overall mean: {:.2}°C", mean(&sensor_data)?);
    println!("  Overall range: {:.2}°C .. {:.2}°C", min(&sensor_data)?, max(&sensor_data)?);

    // ========================================================================
    // 2. Per-Axis Statistics
    // ========================================================================
    println!("\n2. PER-AXIS STATISTICS");
    println!("{}", "=".repeat(60));

    // Collapse days, then hours: [3, 24, 7] -> [3, 24] -> [3]
    let by_sensor = mean_axis(mean_axis(&sensor_data, 2, false)?, 1, false)?;
    for (i, temp) in by_sensor.iter().enumerate() {
        println!("  Sensor {} mean: {:.2}°C", i, temp);
    }

    let hottest_hour = max_axis(&sensor_data, 1, false)?;
    let coldest_hour = min_axis(&sensor_data, 1, false)?;
    println!("\n  Sensor 0, day 0: hourly range {:.2}..{:.2}°C",
        coldest_hour.eval(&[0, 0]),
        hottest_hour.eval(&[0, 0])
    );

    // ========================================================================
    // 3. Variance From Composed Reductions
    // ========================================================================
    println!("\n3. VARIANCE");
    println!("{}", "=".repeat(60));

    // var = mean((x - mean(x))^2) along the hour axis, nothing materialized
    // until the final to_tensor
    let hourly_mean = mean_axis(&sensor_data, 1, true)?;
    let deviation = (&sensor_data - hourly_mean).map(|d| d * d);
    let variance = mean_axis(deviation, 1, false)?.to_tensor();
    println!("  Variance shape: {:?}", variance.shape());
    for sensor in 0..3 {
        println!(
            "  Sensor {} day 0: var {:.3}, std {:.3}",
            sensor,
            variance[&[sensor, 0]],
            variance[&[sensor, 0]].sqrt()
        );
    }

    println!("\n=== Done ===");
    Ok(())
}
