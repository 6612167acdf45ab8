//! Run orchestration: load measurements, transform, invert, compare.

use crate::config::RunConfig;
use anyhow::{Context, Result};
use lib_dsp::metrics::compare_passband;
use lib_dsp::window::window_profile;
use lib_dsp::{profile_to_sweep, sweep_to_profile, RoundTripReport, WindowType};
use lib_io::{read_dispersion, read_touchstone, DispersionTable};
use lib_types::{DistanceProfile, FrequencySweep};
use std::path::Path;

/// Relative frequency disagreement above which a dispersion table cannot be
/// paired with a measurement.
const FREQUENCY_TOLERANCE: f64 = 1e-6;

/// Relative frequency disagreement worth a warning.
const FREQUENCY_DRIFT_WARN: f64 = 1e-9;

/// Everything a run produces.
#[derive(Clone, Debug)]
pub struct RunResults {
    pub name: String,

    /// Measured transfer term with its dispersion relation.
    pub sweep: FrequencySweep,

    /// Forward transform of `sweep`, before windowing.
    pub profile: DistanceProfile,

    pub window: WindowType,

    /// Inverse transform of the windowed profile.
    pub recovered: Option<FrequencySweep>,

    pub report: Option<RoundTripReport>,
}

/// Run orchestrator.
pub struct Orchestrator {
    config: RunConfig,
}

impl Orchestrator {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<RunResults> {
        tracing::info!("Starting run: {}", self.config.name);

        let input = &self.config.input;
        let sweep = load_sweep(
            &input.touchstone,
            &input.beta,
            input.output_port,
            input.input_port,
        )?;

        let distances = self.config.distance.axis(&sweep.beta)?;
        tracing::info!(
            "Forward transform: {} frequencies onto {} distances",
            sweep.len(),
            distances.len()
        );
        let profile =
            sweep_to_profile(&sweep, &distances).context("Forward transform failed")?;

        if let Some((x, magnitude)) = profile.peak() {
            tracing::info!("Distance response peak {:.4} at {:.6} m", magnitude, x);
        }

        let round_trip = &self.config.round_trip;
        let window = self.config.window.window_type();
        let (recovered, report) = if round_trip.enabled {
            let windowed = window_profile(&profile, window);
            let recovered = profile_to_sweep(&windowed, &sweep.frequencies, &sweep.beta)
                .context("Inverse transform failed")?;

            let first = sweep.frequencies[0];
            let last = sweep.frequencies[sweep.len() - 1];
            let (low, high) = round_trip.passband(first, last);
            let report = compare_passband(
                &sweep.frequencies,
                &sweep.response,
                &recovered.response,
                low,
                high,
                round_trip.decimals,
            )
            .context("Passband comparison failed")?;

            if report.passed {
                tracing::info!(
                    "Round trip agrees to {} decimals over {} points",
                    report.decimals,
                    report.points_compared
                );
            } else {
                tracing::warn!(
                    "Round trip deviation {:.3e} exceeds {} decimals",
                    report.max_deviation,
                    report.decimals
                );
            }
            (Some(recovered), Some(report))
        } else {
            (None, None)
        };

        tracing::info!("Run complete");
        Ok(RunResults {
            name: self.config.name.clone(),
            sweep,
            profile,
            window,
            recovered,
            report,
        })
    }
}

/// Read `S[output][input]` (1-based ports) from a Touchstone file and pair
/// it with a dispersion table sampled at the same frequencies.
pub fn load_sweep(
    touchstone: &Path,
    beta: &Path,
    output_port: usize,
    input_port: usize,
) -> Result<FrequencySweep> {
    tracing::info!("Loading measurement from {:?}", touchstone);
    let ts = read_touchstone(touchstone)
        .with_context(|| format!("Failed to parse Touchstone file: {:?}", touchstone))?;

    if output_port == 0 || input_port == 0 {
        anyhow::bail!("Port numbers must be 1-based");
    }
    let response = ts
        .sparams
        .parameter(output_port - 1, input_port - 1)
        .with_context(|| format!("Cannot extract S{}{}", output_port, input_port))?;

    tracing::info!("Loading dispersion relation from {:?}", beta);
    let table = read_dispersion(beta)
        .with_context(|| format!("Failed to parse dispersion table: {:?}", beta))?;

    let frequencies = ts.sparams.frequencies_hz();
    check_frequencies(&frequencies, &table)?;

    FrequencySweep::new(frequencies, table.beta, response)
        .context("Measurement and dispersion table do not pair")
}

/// Dispersion table frequencies must match the measurement sample for
/// sample.
fn check_frequencies(measured: &[f64], table: &DispersionTable) -> Result<()> {
    if measured.len() != table.frequencies.len() {
        anyhow::bail!(
            "Dispersion table has {} frequencies, measurement has {}",
            table.frequencies.len(),
            measured.len()
        );
    }

    let mut worst = 0.0_f64;
    for (i, (&f, &g)) in measured.iter().zip(&table.frequencies).enumerate() {
        let drift = (f - g).abs() / f.abs().max(g.abs()).max(f64::MIN_POSITIVE);
        if drift > FREQUENCY_TOLERANCE {
            anyhow::bail!(
                "Frequency {} differs between measurement ({} Hz) and dispersion table ({} Hz)",
                i + 1,
                f,
                g
            );
        }
        worst = worst.max(drift);
    }

    if worst > FREQUENCY_DRIFT_WARN {
        tracing::warn!(
            "Dispersion table frequencies drift from the measurement by up to {:.2e} (relative)",
            worst
        );
    }
    Ok(())
}
