//! Dispersion compensation on a WR-2.8 waveguide section.
//!
//! This example:
//! 1. Builds the TE10 phase constant and S21 of a 2 inch lossless line
//! 2. Transforms S21 to distance assuming free-space phase, then with the
//!    guide's own phase constant
//! 3. Inverts the compensated profile and checks the recovered S21
//!
//! Run with `cargo run -p lib-dsp --example waveguide_smear`.

use lib_dsp::axis::linspace;
use lib_dsp::metrics::compare_passband;
use lib_dsp::window::{apply_window, WindowType};
use lib_dsp::{forward_transform, inverse_transform};
use lib_types::units::{Hertz, Meters, RadiansPerMeter};
use num_complex::Complex64;
use std::f64::consts::PI;

fn main() -> anyhow::Result<()> {
    let a = Meters::from_mil(28.0);
    let length = Meters::from_inch(2.0);
    let kc = PI / a.0;

    let frequency = linspace(Hertz::from_ghz(260.0).0, Hertz::from_ghz(400.0).0, 1401);
    let k0: Vec<f64> = frequency
        .iter()
        .map(|&f| RadiansPerMeter::free_space(Hertz(f)).0)
        .collect();
    let beta: Vec<f64> = k0.iter().map(|&k| (k * k - kc * kc).sqrt()).collect();
    let s21: Vec<Complex64> = beta.iter().map(|&b| Complex64::cis(-b * length.0)).collect();

    println!("=== WR-2.8 dispersion compensation ===\n");
    println!("Line length: {:.2} mm", length.as_mm());

    let grid = linspace(0.0, 4.0 * length.0, 401);
    for (label, phase) in [("free-space phase", &k0), ("TE10 phase", &beta)] {
        let profile = forward_transform(&frequency, &s21, phase, &grid)?;
        let (i, peak) = profile
            .iter()
            .map(|r| r.norm())
            .enumerate()
            .fold((0, 0.0), |best, (i, m)| if m > best.1 { (i, m) } else { best });
        println!(
            "  {:<17} peak {:.3} at {:.2} mm",
            label,
            peak,
            grid[i] * 1e3
        );
    }

    println!("\nRound trip (Hamming window, 265-395 GHz):");
    let x = linspace(-10.0 * length.0, 12.0 * length.0, 1401);
    let profile = forward_transform(&frequency, &s21, &beta, &x)?;
    let windowed = apply_window(&profile, WindowType::Hamming);
    let recovered = inverse_transform(&x, &windowed, &beta, &frequency)?;

    let report = compare_passband(&frequency, &s21, &recovered, 265e9, 395e9, 3)?;
    println!("  Points compared: {}", report.points_compared);
    println!("  Max deviation:   {:.2e}", report.max_deviation);
    println!(
        "  Status: {}",
        if report.passed { "PASS" } else { "FAIL" }
    );

    Ok(())
}
