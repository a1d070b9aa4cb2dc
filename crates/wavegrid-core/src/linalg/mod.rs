pub mod pinv;

pub use pinv::{default_tolerance, pseudo_inverse, PinvConfig, PseudoInverse};

use crate::grid::RealGrid;

impl RealGrid {
    /// Matrix product `self * rhs`. Panics unless `self.cols() == rhs.rows()`.
    pub fn matmul(&self, rhs: &RealGrid) -> RealGrid {
        assert_eq!(
            self.cols(),
            rhs.rows(),
            "matmul: inner dimensions differ {:?} x {:?}",
            self.shape(),
            rhs.shape()
        );
        RealGrid::from_array(self.as_array().dot(rhs.as_array()))
    }

    /// `rows x rows` identity matrix.
    pub fn identity(rows: usize) -> RealGrid {
        RealGrid::from_shape_fn(rows, rows, |r, c| if r == c { 1.0 } else { 0.0 })
    }
}
