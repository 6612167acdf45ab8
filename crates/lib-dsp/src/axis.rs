//! Sample axes for the frequency and distance domains.

use crate::error::{DspError, DspResult};
use std::f64::consts::PI;

/// Relative spacing drift above which a distance axis is reported as
/// non-uniform.
const SPACING_TOLERANCE: f64 = 1e-9;

/// `n` evenly spaced points from `start` to `stop`, both included.
///
/// The last point is exactly `stop`, as with numpy's `linspace`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            points[n - 1] = stop;
            points
        }
    }
}

/// Step size of a uniformly spaced axis, taken from its first two samples.
///
/// The rest of the axis is assumed to follow the same step. Drift is logged,
/// not rejected.
pub fn uniform_step(axis: &[f64]) -> DspResult<f64> {
    if axis.len() < 2 {
        return Err(DspError::InsufficientSamples {
            what: "axis",
            needed: 2,
            got: axis.len(),
        });
    }

    let step = axis[1] - axis[0];
    let limit = SPACING_TOLERANCE * step.abs();
    if let Some(i) = axis
        .windows(2)
        .position(|w| ((w[1] - w[0]) - step).abs() > limit)
    {
        tracing::warn!(
            "Axis is not uniformly spaced: step {} at index {} differs from first step {}",
            axis[i + 1] - axis[i],
            i,
            step
        );
    }

    Ok(step)
}

/// Mask of frequencies strictly inside `(low, high)`.
///
/// Used to drop the roll-off edges of a band before comparing responses.
pub fn passband_mask(frequency: &[f64], low: f64, high: f64) -> Vec<bool> {
    frequency.iter().map(|&f| low < f && f < high).collect()
}

/// Distance axis used when the caller does not supply one.
///
/// Covers `[0, 2*pi / mean_step)` with `points` samples, where `mean_step`
/// is the average spacing of `beta`. That is the range over which the
/// sampled dispersion relation gives an unambiguous distance.
pub fn default_distance_axis(beta: &[f64], points: usize) -> DspResult<Vec<f64>> {
    if beta.len() < 2 {
        return Err(DspError::InsufficientSamples {
            what: "beta",
            needed: 2,
            got: beta.len(),
        });
    }
    if points < 2 {
        return Err(DspError::InsufficientSamples {
            what: "distance points",
            needed: 2,
            got: points,
        });
    }

    let (min, max) = beta
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &b| {
            (lo.min(b), hi.max(b))
        });
    let span = max - min;
    if !(span.is_finite() && span > 0.0) {
        return Err(DspError::InvalidAxis(format!(
            "phase constant span must be finite and positive, got {}",
            span
        )));
    }

    let mean_step = span / (beta.len() - 1) as f64;
    let range = 2.0 * PI / mean_step;
    let step = range / points as f64;

    tracing::debug!(
        "default distance axis: {} points over {:.4} m (step {:.3e} m)",
        points,
        range,
        step
    );

    Ok((0..points).map(|i| i as f64 * step).collect())
}
