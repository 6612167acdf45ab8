//! WR-2.8 rectangular waveguide fixture (TE10 mode).
//!
//! Test-only model of a dispersive line: phase constant, conductor loss and
//! the S21 of a matched section of given length.

#![allow(dead_code)]

use lib_dsp::axis::linspace;
use lib_types::units::{Hertz, Meters, SPEED_OF_LIGHT};
use num_complex::Complex64;
use std::f64::consts::PI;

const MU_0: f64 = 4e-7 * PI;

/// Resistivity of gold, ohm-m.
pub const RHO_GOLD: f64 = 2.44e-8;

pub struct Waveguide {
    /// Broad wall.
    pub a: Meters,
    /// Narrow wall.
    pub b: Meters,
    /// Wall resistivity; `None` for a lossless guide.
    pub rho: Option<f64>,
}

impl Waveguide {
    /// WR-2.8: 28 x 14 mil, 260-400 GHz.
    pub fn wr2p8(rho: Option<f64>) -> Self {
        Self {
            a: Meters::from_mil(28.0),
            b: Meters::from_mil(14.0),
            rho,
        }
    }

    fn k0(&self, f: f64) -> f64 {
        2.0 * PI * f / SPEED_OF_LIGHT
    }

    /// `sqrt(k0^2 - kc^2)` with `kc = pi / a`.
    pub fn beta(&self, f: f64) -> f64 {
        let kc = PI / self.a.0;
        let k0 = self.k0(f);
        (k0 * k0 - kc * kc).sqrt()
    }

    /// TE10 conductor attenuation, Np/m.
    pub fn alpha(&self, f: f64) -> f64 {
        let Some(rho) = self.rho else {
            return 0.0;
        };
        let (a, b) = (self.a.0, self.b.0);
        let k = self.k0(f);
        let eta = MU_0 * SPEED_OF_LIGHT;
        let rs = (2.0 * PI * f * MU_0 * rho / 2.0).sqrt();
        rs / (a.powi(3) * b * self.beta(f) * k * eta) * (2.0 * b * PI * PI + a.powi(3) * k * k)
    }

    /// S21 of a matched section: `exp(-(alpha + i*beta) * length)`.
    pub fn s21(&self, f: f64, length: Meters) -> Complex64 {
        (-Complex64::new(self.alpha(f), self.beta(f)) * length.0).exp()
    }
}

pub struct Scenario {
    pub frequency: Vec<f64>,
    pub beta: Vec<f64>,
    pub s21: Vec<Complex64>,
    pub length: Meters,
}

/// 2 inch WR-2.8 line swept 260-400 GHz in 1401 points.
pub fn wr2p8_line(rho: Option<f64>) -> Scenario {
    let guide = Waveguide::wr2p8(rho);
    let length = Meters::from_inch(2.0);
    let frequency = linspace(Hertz::from_ghz(260.0).0, Hertz::from_ghz(400.0).0, 1401);
    let beta = frequency.iter().map(|&f| guide.beta(f)).collect();
    let s21 = frequency.iter().map(|&f| guide.s21(f, length)).collect();

    Scenario {
        frequency,
        beta,
        s21,
        length,
    }
}
