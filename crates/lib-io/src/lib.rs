//! # lib-io
//!
//! Readers and writers for the files disptrans consumes and produces.
//!
//! - `.sNp` files (Touchstone S-parameters)
//! - numeric column tables: dispersion relations and distance responses
//!
//! Parsers are built with `nom` and report the line and column of bad input.

pub mod error;
pub mod table;
pub mod touchstone;

pub use error::ParseError;
pub use table::{
    read_dispersion, read_distance_profile, write_distance_profile, write_frequency_sweep,
    DispersionTable, Table,
};
pub use touchstone::{parse_touchstone, read_touchstone, TouchstoneFile};
