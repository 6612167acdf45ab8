//! Tapering windows for distance-domain data.
//!
//! A distance response computed over a finite span is truncated at both
//! ends. Tapering it before the inverse transform suppresses the ripple that
//! truncation would otherwise put on the recovered frequency response.
//! Windows are symmetric and follow numpy's definitions (`np.hamming` etc.).

use lib_types::response::DistanceProfile;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Window function types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowType {
    /// No tapering.
    Rectangular,

    /// Hann (raised cosine), zero at both ends.
    Hann,

    /// Hamming, 0.08 at both ends.
    Hamming,

    /// Blackman, lower sidelobes at the cost of a wider main lobe.
    Blackman,

    /// Kaiser-Bessel with shape parameter `beta`.
    Kaiser { beta: f64 },
}

impl Default for WindowType {
    fn default() -> Self {
        Self::Hamming
    }
}

/// Zeroth-order modified Bessel function of the first kind, I_0(x).
///
/// Power series `sum_k ((x/2)^k / k!)^2`, summed until terms stop
/// contributing.
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..500 {
        let ratio = half / k as f64;
        term *= ratio * ratio;
        sum += term;
        if term < sum * f64::EPSILON {
            break;
        }
    }
    sum
}

/// Generate `length` window coefficients.
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    match length {
        0 => return Vec::new(),
        1 => return vec![1.0],
        _ => {}
    }

    let last = (length - 1) as f64;
    let cosine = |a0: f64, a1: f64, a2: f64| -> Vec<f64> {
        (0..length)
            .map(|i| {
                let phase = 2.0 * PI * i as f64 / last;
                a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
            })
            .collect()
    };

    match window_type {
        WindowType::Rectangular => vec![1.0; length],
        WindowType::Hann => cosine(0.5, 0.5, 0.0),
        WindowType::Hamming => cosine(0.54, 0.46, 0.0),
        WindowType::Blackman => cosine(0.42, 0.5, 0.08),
        WindowType::Kaiser { beta } => {
            let denom = bessel_i0(beta);
            (0..length)
                .map(|i| {
                    let r = 2.0 * i as f64 / last - 1.0;
                    bessel_i0(beta * (1.0 - r * r).max(0.0).sqrt()) / denom
                })
                .collect()
        }
    }
}

/// Multiply a response by a window of the same length.
///
/// Returns a new vector; the input is left untouched.
pub fn apply_window(response: &[Complex64], window_type: WindowType) -> Vec<Complex64> {
    let window = generate_window(window_type, response.len());
    response
        .iter()
        .zip(window.iter())
        .map(|(&r, &w)| r * w)
        .collect()
}

/// Window the response of a distance profile, keeping its axis.
pub fn window_profile(profile: &DistanceProfile, window_type: WindowType) -> DistanceProfile {
    DistanceProfile {
        distances: profile.distances.clone(),
        response: apply_window(&profile.response, window_type),
    }
}
