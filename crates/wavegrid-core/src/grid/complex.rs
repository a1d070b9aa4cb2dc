use ndarray::{Array2, Zip};
use num_complex::Complex64;

use crate::lifecycle::{GridKind, LiveToken};

use super::real::RealGrid;

/// A complex-valued grid stored as a pair of same-shaped real grids.
#[derive(Clone, Debug)]
pub struct ComplexGrid {
    real: RealGrid,
    imag: RealGrid,
    _live: LiveToken,
}

impl ComplexGrid {
    /// Pair two components. Panics if their shapes differ.
    pub fn new(real: RealGrid, imag: RealGrid) -> Self {
        real.assert_same_shape(&imag, "ComplexGrid::new");
        Self {
            real,
            imag,
            _live: LiveToken::new(GridKind::Complex),
        }
    }

    /// Promote a real grid, with a zero imaginary part.
    pub fn from_real(real: RealGrid) -> Self {
        let imag = RealGrid::zeros(real.rows(), real.cols());
        Self::new(real, imag)
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(RealGrid::zeros(rows, cols), RealGrid::zeros(rows, cols))
    }

    pub fn from_complex_array(data: &Array2<Complex64>) -> Self {
        let real = RealGrid::from_array(data.mapv(|z| z.re));
        let imag = RealGrid::from_array(data.mapv(|z| z.im));
        Self::new(real, imag)
    }

    pub fn to_complex_array(&self) -> Array2<Complex64> {
        Zip::from(self.real.as_array())
            .and(self.imag.as_array())
            .map_collect(|&re, &im| Complex64::new(re, im))
    }

    pub fn rows(&self) -> usize {
        self.real.rows()
    }

    pub fn cols(&self) -> usize {
        self.real.cols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.real.shape()
    }

    pub fn real(&self) -> &RealGrid {
        &self.real
    }

    pub fn imag(&self) -> &RealGrid {
        &self.imag
    }

    /// Split into `(real, imag)`, giving up the complex wrapper.
    pub fn into_parts(self) -> (RealGrid, RealGrid) {
        let Self { real, imag, .. } = self;
        (real, imag)
    }

    /// Discard the grid and both components.
    pub fn clear(self) {
        drop(self);
    }

    /// `re^2 + im^2` per cell.
    pub fn norm(&self) -> RealGrid {
        self.real.zip_with(&self.imag, |re, im| re * re + im * im)
    }

    /// `sqrt(re^2 + im^2)` per cell.
    pub fn modulus(&self) -> RealGrid {
        self.real.zip_with(&self.imag, f64::hypot)
    }

    pub fn conj(&self) -> ComplexGrid {
        ComplexGrid::new(self.real.clone(), self.imag.scale(-1.0))
    }

    /// Multiply both components by a real grid.
    pub fn mul_real(&self, rhs: &RealGrid) -> ComplexGrid {
        ComplexGrid::new(&self.real * rhs, &self.imag * rhs)
    }

    /// Divide both components by a real grid.
    pub fn div_real(&self, rhs: &RealGrid) -> ComplexGrid {
        ComplexGrid::new(&self.real / rhs, &self.imag / rhs)
    }

    pub fn pad_rows(&self, k: isize, fill: f64) -> ComplexGrid {
        self.pad(k, 0, fill)
    }

    pub fn pad_cols(&self, k: isize, fill: f64) -> ComplexGrid {
        self.pad(0, k, fill)
    }

    /// Pad both components; the imaginary part is always filled with zero.
    pub fn pad(&self, row_k: isize, col_k: isize, fill: f64) -> ComplexGrid {
        ComplexGrid::new(
            self.real.pad(row_k, col_k, fill),
            self.imag.pad(row_k, col_k, 0.0),
        )
    }

    /// Move the zero-frequency term between `(0, 0)` and the grid center.
    pub fn fourier_shift(&self) -> ComplexGrid {
        ComplexGrid::new(self.real.fourier_shift(), self.imag.fourier_shift())
    }
}
