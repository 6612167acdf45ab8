//! Agreement metrics between an original and a recovered response.

use crate::axis::passband_mask;
use crate::error::{DspError, DspResult};
use num_complex::Complex64;

/// Largest component-wise difference (real or imaginary part).
///
/// Returns `f64::INFINITY` if any pair differs by a non-finite amount, so a
/// NaN in either response never counts as agreement.
pub fn max_abs_deviation(expected: &[Complex64], actual: &[Complex64]) -> DspResult<f64> {
    if expected.len() != actual.len() {
        return Err(DspError::DimensionMismatch {
            what: "compared response",
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    Ok(expected
        .iter()
        .zip(actual)
        .map(|(e, a)| component_deviation(*e, *a))
        .fold(0.0, f64::max))
}

/// `max(|re|, |im|)` of the difference, infinite if either part is not finite.
#[inline]
fn component_deviation(expected: Complex64, actual: Complex64) -> f64 {
    let d = expected - actual;
    if d.re.is_finite() && d.im.is_finite() {
        d.re.abs().max(d.im.abs())
    } else {
        f64::INFINITY
    }
}

/// Tolerance for agreement to `decimals` places: `1.5 * 10^-decimals`.
#[inline]
pub fn decimal_tolerance(decimals: u32) -> f64 {
    1.5 * 10f64.powi(-(decimals as i32))
}

/// Whether both responses agree to `decimals` places in every component.
pub fn agrees_to_decimals(
    expected: &[Complex64],
    actual: &[Complex64],
    decimals: u32,
) -> DspResult<bool> {
    Ok(max_abs_deviation(expected, actual)? < decimal_tolerance(decimals))
}

/// Comparison of a recovered frequency response against the original,
/// restricted to a passband.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundTripReport {
    /// Frequency samples inside the passband.
    pub points_compared: usize,

    /// Largest component-wise deviation inside the passband.
    pub max_deviation: f64,

    /// Frequency at which `max_deviation` occurs, Hz.
    pub worst_frequency: Option<f64>,

    pub decimals: u32,

    pub passed: bool,
}

/// Compare `recovered` to `original` on frequencies strictly inside
/// `(low, high)`.
pub fn compare_passband(
    frequency: &[f64],
    original: &[Complex64],
    recovered: &[Complex64],
    low: f64,
    high: f64,
    decimals: u32,
) -> DspResult<RoundTripReport> {
    let n = frequency.len();
    for (what, len) in [
        ("original response", original.len()),
        ("recovered response", recovered.len()),
    ] {
        if len != n {
            return Err(DspError::DimensionMismatch {
                what,
                expected: n,
                actual: len,
            });
        }
    }

    let mask = passband_mask(frequency, low, high);
    let mut points_compared = 0;
    let mut max_deviation = 0.0;
    let mut worst_frequency = None;

    for (i, &inside) in mask.iter().enumerate() {
        if !inside {
            continue;
        }
        points_compared += 1;
        let deviation = component_deviation(original[i], recovered[i]);
        if worst_frequency.is_none() || deviation > max_deviation {
            max_deviation = deviation;
            worst_frequency = Some(frequency[i]);
        }
    }

    if points_compared == 0 {
        return Err(DspError::InvalidAxis(format!(
            "no frequency samples inside passband ({}, {})",
            low, high
        )));
    }

    let passed = max_deviation < decimal_tolerance(decimals);
    tracing::debug!(
        "passband comparison: {} points, max deviation {:.3e}, passed={}",
        points_compared,
        max_deviation,
        passed
    );

    Ok(RoundTripReport {
        points_compared,
        max_deviation,
        worst_frequency,
        decimals,
        passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_max_abs_deviation_is_componentwise() {
        let a = vec![c(1.0, 0.0), c(0.0, 1.0)];
        let b = vec![c(1.0, 0.002), c(0.001, 1.0)];
        assert!((max_abs_deviation(&a, &b).unwrap() - 0.002).abs() < 1e-15);
    }

    #[test]
    fn test_decimal_agreement() {
        let a = vec![c(0.5, -0.5)];
        assert!(agrees_to_decimals(&a, &[c(0.5014, -0.5)], 3).unwrap());
        assert!(!agrees_to_decimals(&a, &[c(0.5016, -0.5)], 3).unwrap());
        assert!(agrees_to_decimals(&a, &[c(0.5, -0.5)], 12).unwrap());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            max_abs_deviation(&[c(0.0, 0.0)], &[]),
            Err(DspError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_compare_passband_ignores_edges() {
        let f = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let original = vec![c(1.0, 0.0); 5];
        let mut recovered = original.clone();
        recovered[0] = c(9.0, 0.0);
        recovered[4] = c(-9.0, 0.0);
        recovered[2] = c(1.0, 0.0005);

        let report = compare_passband(&f, &original, &recovered, 1.5, 4.5, 3).unwrap();
        assert_eq!(report.points_compared, 3);
        assert!((report.max_deviation - 0.0005).abs() < 1e-15);
        assert_eq!(report.worst_frequency, Some(3.0));
        assert!(report.passed);
    }

    #[test]
    fn test_nan_never_agrees() {
        let f = vec![1.0, 2.0, 3.0];
        let original = vec![c(1.0, 0.0); 3];
        let recovered = vec![c(1.0, 0.0), c(f64::NAN, f64::NAN), c(1.0, 0.0)];

        let report = compare_passband(&f, &original, &recovered, 0.0, 4.0, 3).unwrap();
        assert_eq!(report.points_compared, 3);
        assert!(!report.passed);
        assert_eq!(report.worst_frequency, Some(2.0));
        assert!(report.max_deviation.is_infinite());

        assert!(!agrees_to_decimals(&original, &recovered, 3).unwrap());
        assert_eq!(max_abs_deviation(&original, &recovered).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_nan_in_imaginary_part_only() {
        let a = vec![c(0.5, 0.0), c(0.5, 0.0)];
        let b = vec![c(0.5, 0.0), c(0.5, f64::NAN)];
        assert!(!agrees_to_decimals(&a, &b, 1).unwrap());
    }

    #[test]
    fn test_compare_passband_empty_band() {
        let f = vec![1.0, 2.0];
        let r = vec![c(1.0, 0.0); 2];
        assert!(matches!(
            compare_passband(&f, &r, &r, 5.0, 6.0, 3),
            Err(DspError::InvalidAxis(_))
        ));
    }
}
