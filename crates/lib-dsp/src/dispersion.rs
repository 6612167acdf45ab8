//! Dispersion-compensated transforms between frequency and distance.
//!
//! A plain Fourier transform assumes the phase constant grows linearly with
//! frequency (`beta = 2*pi*f/c`). In a waveguide it does not, so a pulse
//! reconstructed with the linear assumption smears out with distance. These
//! transforms use the medium's sampled `beta(f)` directly:
//!
//! ```text
//! forward:  xresp[m] = (1/N) * sum_n fresp[n] * exp(+i * beta[n] * x[m])
//! inverse:  fresp[k] = N * xstep * vg[k] / (2*pi) * sum_m xresp[m] * exp(-i * beta[k] * x[m])
//! ```
//!
//! Neither `beta` nor the requested distances need to be uniformly spaced,
//! so there is no fast transform; both directions are direct O(N*M) sums.
//! Every output sample is an independent reduction over the whole input,
//! and large problems are split across the Rayon thread pool by output
//! index.
//!
//! `vg` is a raw centered difference of `beta` over sample index. It corrects
//! for equal frequency steps mapping to unequal `beta` steps, which is what
//! makes the inverse approximately undo the forward transform.

use crate::axis::uniform_step;
use crate::error::{DspError, DspResult};
use lib_types::response::{DistanceProfile, FrequencySweep};
use num_complex::Complex64;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Number of complex exponentials (outputs x inputs) above which the
/// outputs are computed in parallel.
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Transform a frequency-domain response to the distance domain.
///
/// # Arguments
///
/// * `frequency` - Frequency axis, Hz (length N)
/// * `freq_response` - Complex response at each frequency (length N)
/// * `beta` - Phase constant at each frequency, rad/m (length N)
/// * `distances` - Distances to evaluate, m (length M, any order or sign)
///
/// # Returns
///
/// Distance-domain response, length M.
///
/// # Errors
///
/// `DimensionMismatch` if `freq_response` or `beta` differ in length from
/// `frequency`; `InsufficientSamples` if the sweep is empty.
pub fn forward_transform(
    frequency: &[f64],
    freq_response: &[Complex64],
    beta: &[f64],
    distances: &[f64],
) -> DspResult<Vec<Complex64>> {
    let n = frequency.len();
    check_paired("beta", n, beta.len())?;
    check_paired("frequency response", n, freq_response.len())?;
    if n == 0 {
        return Err(DspError::InsufficientSamples {
            what: "frequency",
            needed: 1,
            got: 0,
        });
    }

    tracing::debug!(
        "forward transform: {} frequency points -> {} distances",
        n,
        distances.len()
    );

    let fpts = n as f64;
    Ok(evaluate(distances.len(), n, |m| {
        synthesize(freq_response, beta, distances[m]) / fpts
    }))
}

/// Transform a distance-domain response back to the frequency domain.
///
/// # Arguments
///
/// * `distances` - Distance axis, m (length M >= 2, uniformly spaced)
/// * `distance_response` - Complex response at each distance (length M)
/// * `beta` - Phase constant at each target frequency, rad/m (length N)
/// * `frequency` - Target frequency axis, Hz (length N)
///
/// Only `distances[1] - distances[0]` is used as the step; the remaining
/// spacing is assumed to match.
///
/// # Errors
///
/// `InsufficientSamples` if fewer than two distances are given (checked
/// first) or fewer than three frequencies; `DimensionMismatch` if
/// `distance_response` or `beta` have the wrong length.
pub fn inverse_transform(
    distances: &[f64],
    distance_response: &[Complex64],
    beta: &[f64],
    frequency: &[f64],
) -> DspResult<Vec<Complex64>> {
    let m = distances.len();
    if m < 2 {
        return Err(DspError::InsufficientSamples {
            what: "distances",
            needed: 2,
            got: m,
        });
    }
    check_paired("distance response", m, distance_response.len())?;

    let n = frequency.len();
    check_paired("beta", n, beta.len())?;

    let vg = group_velocity(beta)?;
    let xstep = uniform_step(distances)?;

    tracing::debug!(
        "inverse transform: {} distances (step {:.3e} m) -> {} frequency points",
        m,
        xstep,
        n
    );

    let fpts = n as f64;
    Ok(evaluate(n, m, |k| {
        let sum = analyze(distances, distance_response, beta[k]);
        sum * (fpts * xstep * vg[k] / 2.0 / PI)
    }))
}

/// Forward transform of a [`FrequencySweep`] onto the given distances.
pub fn sweep_to_profile(sweep: &FrequencySweep, distances: &[f64]) -> DspResult<DistanceProfile> {
    let response = forward_transform(
        &sweep.frequencies,
        &sweep.response,
        &sweep.beta,
        distances,
    )?;
    Ok(DistanceProfile::new(distances.to_vec(), response)?)
}

/// Inverse transform of a [`DistanceProfile`] onto a frequency axis.
pub fn profile_to_sweep(
    profile: &DistanceProfile,
    frequencies: &[f64],
    beta: &[f64],
) -> DspResult<FrequencySweep> {
    let response = inverse_transform(&profile.distances, &profile.response, beta, frequencies)?;
    Ok(FrequencySweep::new(
        frequencies.to_vec(),
        beta.to_vec(),
        response,
    )?)
}

/// Centered finite difference of `beta` over sample index.
///
/// Interior samples get `(beta[k+1] - beta[k-1]) / 2`; each end copies its
/// nearest interior neighbour. Not divided by the frequency step.
pub(crate) fn group_velocity(beta: &[f64]) -> DspResult<Vec<f64>> {
    let n = beta.len();
    if n < 3 {
        return Err(DspError::InsufficientSamples {
            what: "beta",
            needed: 3,
            got: n,
        });
    }

    let mut vg = vec![0.0; n];
    for (k, w) in beta.windows(3).enumerate() {
        vg[k + 1] = (w[2] - w[0]) / 2.0;
    }
    vg[0] = vg[1];
    vg[n - 1] = vg[n - 2];

    Ok(vg)
}

/// `sum_n fresp[n] * exp(+i * beta[n] * x)`
#[inline]
fn synthesize(freq_response: &[Complex64], beta: &[f64], x: f64) -> Complex64 {
    freq_response
        .iter()
        .zip(beta)
        .map(|(&r, &b)| r * Complex64::cis(b * x))
        .sum()
}

/// `sum_m xresp[m] * exp(-i * beta * x[m])`
#[inline]
fn analyze(distances: &[f64], distance_response: &[Complex64], beta: f64) -> Complex64 {
    distances
        .iter()
        .zip(distance_response)
        .map(|(&x, &r)| r * Complex64::cis(-beta * x))
        .sum()
}

/// Evaluate `kernel` for every output index, in parallel for large problems.
///
/// Both paths call the same kernel, so the result does not depend on which
/// one runs.
fn evaluate<F>(outputs: usize, inputs: usize, kernel: F) -> Vec<Complex64>
where
    F: Fn(usize) -> Complex64 + Sync + Send,
{
    if outputs.saturating_mul(inputs) >= PARALLEL_THRESHOLD {
        tracing::debug!("evaluating {} outputs in parallel", outputs);
        (0..outputs).into_par_iter().map(kernel).collect()
    } else {
        (0..outputs).map(kernel).collect()
    }
}

fn check_paired(what: &'static str, expected: usize, actual: usize) -> DspResult<()> {
    if expected != actual {
        return Err(DspError::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn assert_close(a: &[Complex64], b: &[Complex64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            assert!(
                (x - y).norm() < tol,
                "Mismatch at index {}: {} vs {}",
                i,
                x,
                y
            );
        }
    }

    /// A mildly dispersive relation: beta grows faster than linearly.
    fn curved_beta(n: usize) -> (Vec<f64>, Vec<f64>) {
        let f: Vec<f64> = (0..n).map(|i| 1e9 + i as f64 * 1e7).collect();
        let beta = f
            .iter()
            .map(|&f| 20.0 + 1e-8 * f + 2e-18 * f * f)
            .collect();
        (f, beta)
    }

    #[test]
    fn test_forward_rejects_beta_length() {
        let f = vec![1.0, 2.0, 3.0];
        let resp = vec![c(1.0, 0.0); 3];
        let beta = vec![1.0, 2.0];

        let err = forward_transform(&f, &resp, &beta, &[0.0]).unwrap_err();
        assert_eq!(
            err,
            DspError::DimensionMismatch {
                what: "beta",
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_forward_rejects_response_length() {
        let f = vec![1.0, 2.0, 3.0];
        let beta = vec![1.0, 2.0, 3.0];
        let resp = vec![c(1.0, 0.0); 4];

        assert!(matches!(
            forward_transform(&f, &resp, &beta, &[0.0, 1.0]),
            Err(DspError::DimensionMismatch {
                what: "frequency response",
                ..
            })
        ));
    }

    #[test]
    fn test_forward_rejects_empty_sweep() {
        assert!(matches!(
            forward_transform(&[], &[], &[], &[0.0]),
            Err(DspError::InsufficientSamples { needed: 1, got: 0, .. })
        ));
    }

    #[test]
    fn test_inverse_rejects_beta_length() {
        let x = vec![0.0, 0.1, 0.2];
        let xresp = vec![c(1.0, 0.0); 3];
        let f = vec![1.0, 2.0, 3.0, 4.0];
        let beta = vec![1.0, 2.0, 3.0];

        assert!(matches!(
            inverse_transform(&x, &xresp, &beta, &f),
            Err(DspError::DimensionMismatch { what: "beta", expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_inverse_rejects_single_distance() {
        // Rejected before any other shape is looked at
        let err = inverse_transform(&[0.5], &[c(1.0, 0.0), c(2.0, 0.0)], &[1.0], &[1.0, 2.0])
            .unwrap_err();
        assert_eq!(
            err,
            DspError::InsufficientSamples {
                what: "distances",
                needed: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_inverse_rejects_response_length() {
        let x = vec![0.0, 0.1, 0.2];
        let xresp = vec![c(1.0, 0.0); 4];
        let (f, beta) = curved_beta(5);

        let err = inverse_transform(&x, &xresp, &beta, &f).unwrap_err();
        assert_eq!(
            err,
            DspError::DimensionMismatch {
                what: "distance response",
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn test_inverse_uses_first_step_only() {
        let (f, beta) = curved_beta(8);
        let xresp = vec![c(1.0, 0.5), c(-0.3, 0.2), c(0.7, -0.1)];

        // Same first step, different later spacing
        let uneven = vec![0.0, 0.01, 0.05];
        let even = vec![0.0, 0.01, 0.02];
        let from_uneven = inverse_transform(&uneven, &xresp, &beta, &f).unwrap();
        let from_even = inverse_transform(&even, &xresp, &beta, &f).unwrap();

        // The sums see the true positions; only the scale comes from x[1] - x[0]
        let vg = group_velocity(&beta).unwrap();
        let n = f.len() as f64;
        for k in 0..f.len() {
            let scale = n * 0.01 * vg[k] / (2.0 * PI);
            let expected = analyze(&uneven, &xresp, beta[k]) * scale;
            assert!((from_uneven[k] - expected).norm() < 1e-12, "index {}", k);
        }
        assert!(from_uneven
            .iter()
            .zip(&from_even)
            .any(|(a, b)| (a - b).norm() > 1e-6));
    }

    #[test]
    fn test_inverse_rejects_short_beta() {
        let x = vec![0.0, 0.1];
        let xresp = vec![c(1.0, 0.0); 2];
        assert!(matches!(
            inverse_transform(&x, &xresp, &[1.0, 2.0], &[1.0, 2.0]),
            Err(DspError::InsufficientSamples { what: "beta", needed: 3, got: 2 })
        ));
    }

    #[test]
    fn test_group_velocity_interior_and_edges() {
        let beta = vec![0.0, 1.0, 4.0, 9.0, 16.0];
        let vg = group_velocity(&beta).unwrap();

        assert_eq!(vg, vec![2.0, 2.0, 4.0, 6.0, 6.0]);
    }

    #[test]
    fn test_group_velocity_replicates_boundaries() {
        for n in 3..12 {
            let beta: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin() * 100.0).collect();
            let vg = group_velocity(&beta).unwrap();

            assert_eq!(vg.len(), n);
            assert_eq!(vg[0], vg[1], "left edge for n={}", n);
            assert_eq!(vg[n - 1], vg[n - 2], "right edge for n={}", n);
        }
    }

    #[test]
    fn test_forward_single_distance() {
        let f = vec![1.0, 2.0];
        let beta = vec![0.0, PI];
        let resp = vec![c(1.0, 0.0), c(1.0, 0.0)];

        // (1 + exp(i*pi)) / 2 = 0 at x = 1; (1 + 1) / 2 = 1 at x = 0
        let out = forward_transform(&f, &resp, &beta, &[1.0]).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].norm() < 1e-12);

        let out = forward_transform(&f, &resp, &beta, &[0.0]).unwrap();
        assert!((out[0] - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_forward_accepts_unsorted_negative_distances() {
        let (f, beta) = curved_beta(32);
        let resp: Vec<Complex64> = beta.iter().map(|&b| Complex64::cis(-b * 0.3)).collect();

        let x = vec![0.3, -5.0, 120.0, 0.0];
        let out = forward_transform(&f, &resp, &beta, &x).unwrap();
        assert_eq!(out.len(), 4);

        // Matched exactly at the delay
        assert!((out[0] - c(1.0, 0.0)).norm() < 1e-12);
        for v in &out[1..] {
            assert!(v.norm() < 1.0);
        }
    }

    #[test]
    fn test_forward_empty_distances() {
        let (f, beta) = curved_beta(8);
        let resp = vec![c(1.0, 0.0); 8];
        assert!(forward_transform(&f, &resp, &beta, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_forward_is_linear() {
        let (f, beta) = curved_beta(64);
        let r1: Vec<Complex64> = (0..64).map(|i| c((i as f64).cos(), 0.1 * i as f64)).collect();
        let r2: Vec<Complex64> = (0..64).map(|i| c(1.0 / (1.0 + i as f64), -(i as f64).sin())).collect();
        let x: Vec<f64> = (0..40).map(|i| -0.5 + i as f64 * 0.037).collect();

        let a = c(0.3, -1.2);
        let b = c(-2.0, 0.5);
        let mixed: Vec<Complex64> = r1.iter().zip(&r2).map(|(&p, &q)| a * p + b * q).collect();

        let lhs = forward_transform(&f, &mixed, &beta, &x).unwrap();
        let y1 = forward_transform(&f, &r1, &beta, &x).unwrap();
        let y2 = forward_transform(&f, &r2, &beta, &x).unwrap();
        let rhs: Vec<Complex64> = y1.iter().zip(&y2).map(|(&p, &q)| a * p + b * q).collect();

        assert_close(&lhs, &rhs, 1e-12);
    }

    #[test]
    fn test_uniform_beta_round_trips_on_reciprocal_grid() {
        // With evenly spaced beta and dx = 2*pi / (N * dbeta), the pair
        // reduces to an exact DFT / inverse DFT.
        let n = 16;
        let dbeta = 3.0;
        let f: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let beta: Vec<f64> = (0..n).map(|i| i as f64 * dbeta).collect();
        let dx = 2.0 * PI / (n as f64 * dbeta);
        let x: Vec<f64> = (0..n).map(|i| i as f64 * dx).collect();

        let resp: Vec<Complex64> = (0..n)
            .map(|i| c((i as f64 * 0.4).cos(), (i as f64 * 0.9).sin()))
            .collect();

        let xresp = forward_transform(&f, &resp, &beta, &x).unwrap();
        let back = inverse_transform(&x, &xresp, &beta, &f).unwrap();

        assert_close(&back, &resp, 1e-10);
    }

    #[test]
    fn test_nan_propagates() {
        let f = vec![1.0, 2.0, 3.0];
        let beta = vec![1.0, f64::NAN, 3.0];
        let resp = vec![c(1.0, 0.0); 3];

        let out = forward_transform(&f, &resp, &beta, &[0.5]).unwrap();
        assert!(out[0].re.is_nan());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        // 300 x 300 is above the threshold, 300 x 100 below it
        let (f, beta) = curved_beta(300);
        let resp: Vec<Complex64> = beta.iter().map(|&b| Complex64::cis(-b * 0.2)).collect();
        let x_big: Vec<f64> = (0..300).map(|i| i as f64 * 0.002).collect();
        assert!(f.len() * x_big.len() >= PARALLEL_THRESHOLD);
        assert!(f.len() * 100 < PARALLEL_THRESHOLD);

        let parallel = forward_transform(&f, &resp, &beta, &x_big).unwrap();
        let sequential = forward_transform(&f, &resp, &beta, &x_big[..100]).unwrap();

        assert_eq!(&parallel[..100], &sequential[..]);
    }

    #[test]
    fn test_sweep_and_profile_wrappers() {
        let (f, beta) = curved_beta(16);
        let resp = vec![c(1.0, 0.0); 16];
        let sweep = FrequencySweep::new(f.clone(), beta.clone(), resp).unwrap();
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.01).collect();

        let profile = sweep_to_profile(&sweep, &x).unwrap();
        assert_eq!(profile.distances, x);
        assert_eq!(profile.len(), 10);

        let back = profile_to_sweep(&profile, &f, &beta).unwrap();
        assert_eq!(back.len(), 16);
        assert_eq!(back.frequencies, f);

        assert!(matches!(
            profile_to_sweep(&profile, &f, &beta[..15]),
            Err(DspError::DimensionMismatch { .. })
        ));
    }
}
