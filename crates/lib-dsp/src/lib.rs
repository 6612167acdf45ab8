//! # lib-dsp
//!
//! Dispersion-compensated transforms for waveguide measurements.
//!
//! This crate provides the numeric core:
//!
//! - **Dispersion transforms**: frequency-domain to distance-domain and back,
//!   using the medium's phase constant instead of a linear-phase assumption
//! - **Axes**: grids, step sizes, passband masks, default distance spans
//! - **Windows**: tapers applied to distance-domain data before inversion
//! - **Metrics**: passband agreement between original and recovered data
//!
//! ```
//! use lib_dsp::{forward_transform, inverse_transform};
//! use lib_dsp::axis::linspace;
//! use lib_dsp::window::{apply_window, WindowType};
//! use num_complex::Complex64;
//!
//! let f = linspace(1e9, 2e9, 64);
//! let beta: Vec<f64> = f.iter().map(|&f| 2e-8 * f + 1e-18 * f * f).collect();
//! let s21: Vec<Complex64> = beta.iter().map(|&b| Complex64::cis(-b * 0.5)).collect();
//!
//! let x = linspace(-1.0, 2.0, 128);
//! let xresp = forward_transform(&f, &s21, &beta, &x).unwrap();
//! let windowed = apply_window(&xresp, WindowType::Hamming);
//! let recovered = inverse_transform(&x, &windowed, &beta, &f).unwrap();
//! assert_eq!(recovered.len(), f.len());
//! ```

pub mod error;
pub mod axis;
pub mod dispersion;
pub mod window;
pub mod metrics;

pub use error::{DspError, DspResult};
pub use dispersion::{forward_transform, inverse_transform, profile_to_sweep, sweep_to_profile};
pub use window::WindowType;
pub use metrics::RoundTripReport;
