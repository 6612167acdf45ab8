//! # lib-types
//!
//! Core type definitions for dispersion-compensated waveguide transforms.
//!
//! - Physical units (`Hertz`, `Meters`, `RadiansPerMeter`, `Ohms`)
//! - S-parameter network data as read from Touchstone files
//! - Paired-array containers for frequency sweeps and distance profiles

pub mod error;
pub mod units;
pub mod sparams;
pub mod response;

pub use error::TypesError;
pub use units::*;
pub use sparams::*;
pub use response::*;

/// Re-export num_complex for convenience
pub use num_complex::Complex64;
