use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::DEFAULT_PINV_THRESHOLD_SCALE;
use crate::error::{GridError, Result};
use crate::grid::RealGrid;

/// Pseudo-inverse settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinvConfig {
    /// Multiplier on [`default_tolerance`]. Larger values zero more singular
    /// values: less noise amplification, lower effective rank.
    #[serde(default = "default_threshold_scale")]
    pub threshold_scale: f64,
}

fn default_threshold_scale() -> f64 {
    DEFAULT_PINV_THRESHOLD_SCALE
}

impl Default for PinvConfig {
    fn default() -> Self {
        Self {
            threshold_scale: DEFAULT_PINV_THRESHOLD_SCALE,
        }
    }
}

/// Result of [`pseudo_inverse`].
#[derive(Clone, Debug)]
pub struct PseudoInverse {
    /// `cols x rows` generalized inverse.
    pub inverse: RealGrid,
    /// Singular values of the input, as returned by the decomposition.
    pub singular_values: Vec<f64>,
    /// Number of singular values replaced by zero.
    pub zeroed: usize,
    /// Cut-off below which singular values were zeroed.
    pub tolerance: f64,
}

impl PseudoInverse {
    /// Rank retained by the inverse.
    pub fn effective_rank(&self) -> usize {
        self.singular_values.len() - self.zeroed
    }

    /// Least-squares solution `x` of `A x = rhs`.
    pub fn solve(&self, rhs: &RealGrid) -> RealGrid {
        self.inverse.matmul(rhs)
    }
}

/// Tolerance for a `rows x cols` matrix with largest singular value `w_max`:
/// `max(rows, cols) * eps * w_max`.
pub fn default_tolerance(rows: usize, cols: usize, w_max: f64) -> f64 {
    rows.max(cols) as f64 * f64::EPSILON * w_max
}

/// Moore-Penrose pseudo-inverse via SVD, `V * W^-1 * U^T`.
///
/// Singular values below `threshold_scale * default_tolerance` are replaced
/// by zero instead of inverted; the count is reported in `zeroed`.
pub fn pseudo_inverse(matrix: &RealGrid, threshold_scale: f64) -> Result<PseudoInverse> {
    let (m, n) = matrix.shape();
    if m == 0 || n == 0 {
        return Ok(PseudoInverse {
            inverse: RealGrid::zeros(n, m),
            singular_values: Vec::new(),
            zeroed: 0,
            tolerance: 0.0,
        });
    }

    let samples: Vec<f64> = matrix.iter().collect();
    let a = DMatrix::from_row_slice(m, n, &samples);
    let svd = a.svd(true, true);
    let u = svd.u.ok_or(GridError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(GridError::SvdFailed)?;
    let singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();

    let w_max = singular_values.iter().copied().fold(0.0, f64::max);
    let tolerance = threshold_scale * default_tolerance(m, n, w_max);

    let mut zeroed = 0;
    let w_inv: Vec<f64> = singular_values
        .iter()
        .map(|&w| {
            if w == 0.0 || w.abs() < tolerance {
                zeroed += 1;
                0.0
            } else {
                1.0 / w
            }
        })
        .collect();

    let inv = v_t.transpose() * DMatrix::from_diagonal(&DVector::from_vec(w_inv)) * u.transpose();
    debug!(rows = m, cols = n, zeroed, tolerance, "pseudo-inverse computed");

    let inverse = RealGrid::from_shape_fn(n, m, |r, c| inv[(r, c)]);
    Ok(PseudoInverse {
        inverse,
        singular_values,
        zeroed,
        tolerance,
    })
}
