//! Paired-array containers for the two transform domains.
//!
//! A [`FrequencySweep`] holds a frequency axis, the phase constant of the
//! medium at each frequency, and a complex response, all of one length N.
//! A [`DistanceProfile`] holds a distance axis and a complex response of one
//! length M. N and M are independent.

use crate::error::TypesError;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Frequency-domain data of a dispersive line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencySweep {
    /// Frequency axis, Hz.
    pub frequencies: Vec<f64>,

    /// Phase constant at each frequency, rad/m.
    pub beta: Vec<f64>,

    /// Complex response at each frequency.
    pub response: Vec<Complex64>,
}

impl FrequencySweep {
    /// Build a sweep, checking that all three arrays share one length.
    pub fn new(
        frequencies: Vec<f64>,
        beta: Vec<f64>,
        response: Vec<Complex64>,
    ) -> Result<Self, TypesError> {
        let n = frequencies.len();
        if beta.len() != n {
            return Err(TypesError::LengthMismatch {
                what: "beta",
                expected: n,
                actual: beta.len(),
            });
        }
        if response.len() != n {
            return Err(TypesError::LengthMismatch {
                what: "frequency response",
                expected: n,
                actual: response.len(),
            });
        }
        Ok(Self {
            frequencies,
            beta,
            response,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Same axis and dispersion relation with a different response.
    pub fn with_response(&self, response: Vec<Complex64>) -> Result<Self, TypesError> {
        Self::new(self.frequencies.clone(), self.beta.clone(), response)
    }
}

/// Distance-domain data along the propagation axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceProfile {
    /// Distance axis, m.
    pub distances: Vec<f64>,

    /// Complex response at each distance.
    pub response: Vec<Complex64>,
}

impl DistanceProfile {
    pub fn new(distances: Vec<f64>, response: Vec<Complex64>) -> Result<Self, TypesError> {
        if response.len() != distances.len() {
            return Err(TypesError::LengthMismatch {
                what: "distance response",
                expected: distances.len(),
                actual: response.len(),
            });
        }
        Ok(Self {
            distances,
            response,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Distance and magnitude of the strongest sample.
    ///
    /// For a matched line this sits at the line's physical length.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.distances
            .iter()
            .zip(self.response.iter())
            .map(|(&x, r)| (x, r.norm()))
            .fold(None, |best, (x, mag)| match best {
                Some((_, best_mag)) if best_mag >= mag => best,
                _ => Some((x, mag)),
            })
    }
}
