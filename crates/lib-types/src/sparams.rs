//! S-parameter (scattering parameter) network data.
//!
//! Only what the transforms need: a frequency list, one complex matrix per
//! frequency, and extraction of a single transfer term such as S21.

use crate::error::TypesError;
use crate::units::{Hertz, Ohms};
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// S-parameter matrix at a single frequency.
pub type SMatrix = Array2<Complex64>;

/// S-parameter dataset for an N-port network.
#[derive(Clone, Debug)]
pub struct SParameters {
    /// Frequency points.
    pub frequencies: Vec<Hertz>,

    /// One `num_ports x num_ports` matrix per frequency.
    pub matrices: Vec<SMatrix>,

    /// Reference impedance.
    pub z0: Ohms,

    pub num_ports: usize,
}

impl SParameters {
    pub fn new(num_ports: usize, z0: Ohms) -> Self {
        Self {
            frequencies: Vec::new(),
            matrices: Vec::new(),
            z0,
            num_ports,
        }
    }

    /// Append a frequency point, rejecting matrices of the wrong shape.
    pub fn add_point(&mut self, freq: Hertz, matrix: SMatrix) -> Result<(), TypesError> {
        if matrix.nrows() != self.num_ports || matrix.ncols() != self.num_ports {
            return Err(TypesError::MatrixShape {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
                ports: self.num_ports,
            });
        }
        self.frequencies.push(freq);
        self.matrices.push(matrix);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// First and last frequency, in file order.
    pub fn frequency_range(&self) -> Option<(Hertz, Hertz)> {
        Some((*self.frequencies.first()?, *self.frequencies.last()?))
    }

    /// Frequencies as plain Hz values.
    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.frequencies.iter().map(|f| f.0).collect()
    }

    /// Extract `S[row][col]` across all frequencies (0-based ports).
    pub fn parameter(&self, row: usize, col: usize) -> Result<Vec<Complex64>, TypesError> {
        for index in [row, col] {
            if index >= self.num_ports {
                return Err(TypesError::PortOutOfRange {
                    index,
                    ports: self.num_ports,
                });
            }
        }
        Ok(self.matrices.iter().map(|m| m[[row, col]]).collect())
    }

    /// Forward transmission, S21.
    pub fn s21(&self) -> Result<Vec<Complex64>, TypesError> {
        self.parameter(1, 0)
    }
}

/// Numeric pair format of a Touchstone data block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    /// Real/Imaginary
    RI,
    /// Magnitude/Angle (degrees)
    MA,
    /// dB/Angle (degrees)
    DB,
}

impl DataFormat {
    pub fn to_complex(&self, val1: f64, val2: f64) -> Complex64 {
        match self {
            Self::RI => Complex64::new(val1, val2),
            Self::MA => Complex64::from_polar(val1, val2.to_radians()),
            Self::DB => Complex64::from_polar(10.0_f64.powf(val1 / 20.0), val2.to_radians()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn through(n: usize) -> SParameters {
        let mut sp = SParameters::new(2, Ohms::Z0_50);
        for i in 0..n {
            let mut m = Array2::zeros((2, 2));
            m[[1, 0]] = Complex64::new(0.9, -0.1 * i as f64);
            m[[0, 1]] = m[[1, 0]];
            sp.add_point(Hertz::from_ghz(260.0 + i as f64), m).unwrap();
        }
        sp
    }

    #[test]
    fn test_s21_extraction() {
        let sp = through(3);
        let s21 = sp.s21().unwrap();
        assert_eq!(s21.len(), 3);
        assert!((s21[2].im + 0.2).abs() < 1e-12);
        assert_eq!(
            sp.frequency_range(),
            Some((Hertz::from_ghz(260.0), Hertz::from_ghz(262.0)))
        );
    }

    #[test]
    fn test_rejects_wrong_matrix_shape() {
        let mut sp = SParameters::new(2, Ohms::Z0_50);
        let err = sp.add_point(Hertz(1.0), Array2::zeros((1, 1))).unwrap_err();
        assert_eq!(err, TypesError::MatrixShape { rows: 1, cols: 1, ports: 2 });
        assert!(sp.is_empty());
    }

    #[test]
    fn test_port_out_of_range() {
        let sp = SParameters::new(1, Ohms::Z0_50);
        assert!(matches!(
            sp.s21(),
            Err(TypesError::PortOutOfRange { index: 1, ports: 1 })
        ));
    }

    #[test]
    fn test_data_format_conversion() {
        let db = DataFormat::DB.to_complex(-6.0206, 90.0);
        assert!(db.re.abs() < 1e-6);
        assert!((db.im - 0.5).abs() < 1e-4);

        let ma = DataFormat::MA.to_complex(2.0, 180.0);
        assert!((ma.re + 2.0).abs() < 1e-12);
    }
}
