//! Physical units with type safety.
//!
//! Newtypes keep frequency, distance and phase-constant values apart at the
//! API boundary. The numeric kernels themselves work on plain `f64` slices;
//! these types are for the code that builds those slices.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Frequency in Hertz.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Hertz(pub f64);

impl Hertz {
    #[inline]
    pub fn from_ghz(ghz: f64) -> Self {
        Self(ghz * 1e9)
    }

    /// Angular frequency (omega = 2 * pi * f).
    #[inline]
    pub fn angular(&self) -> f64 {
        2.0 * PI * self.0
    }
}

/// Distance along the propagation axis, in meters.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Meters(pub f64);

impl Meters {
    /// Thousandths of an inch, as waveguide flanges are usually specified.
    #[inline]
    pub fn from_mil(mil: f64) -> Self {
        Self(mil * 25.4e-6)
    }

    #[inline]
    pub fn from_inch(inch: f64) -> Self {
        Self(inch * 25.4e-3)
    }

    #[inline]
    pub fn as_mm(&self) -> f64 {
        self.0 * 1e3
    }
}

/// Phase constant (beta) in rad/m.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct RadiansPerMeter(pub f64);

impl RadiansPerMeter {
    /// Phase constant of a non-dispersive, free-space wave: `2*pi*f/c`.
    ///
    /// This is the linear-phase assumption a plain Fourier transform makes.
    #[inline]
    pub fn free_space(freq: Hertz) -> Self {
        Self(freq.angular() / SPEED_OF_LIGHT)
    }
}

/// Impedance in Ohms.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Ohms(pub f64);

impl Ohms {
    /// Standard 50 ohm reference impedance.
    pub const Z0_50: Self = Self(50.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imperial_lengths() {
        // WR-2.8 broad wall is 28 mil
        assert!((Meters::from_mil(28.0).as_mm() - 0.7112).abs() < 1e-12);
        assert!((Meters::from_inch(2.0).0 - 0.0508).abs() < 1e-15);
    }

    #[test]
    fn test_free_space_beta() {
        let beta = RadiansPerMeter::free_space(Hertz::from_ghz(300.0));

        // Wavelength at 300 GHz is just under 1 mm
        assert!((2.0 * PI / beta.0 - 0.99930819e-3).abs() < 1e-9);
    }
}
