use ndarray::{s, Array2, ArrayView2, Zip};

use crate::error::{GridError, Result};
use crate::lifecycle::{GridKind, LiveToken};

/// A dense `rows x cols` grid of f64 samples.
///
/// Every derived-grid operation allocates a fresh grid; nothing mutates a
/// live grid through aliasing. Binary operators require identical shapes and
/// panic otherwise.
#[derive(Clone, Debug)]
pub struct RealGrid {
    data: Array2<f64>,
    _live: LiveToken,
}

/// Mask cells are foreground when non-zero.
#[inline]
pub(crate) fn is_foreground(v: f64) -> bool {
    v != 0.0
}

#[inline]
fn mask_value(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

impl RealGrid {
    /// Wrap an existing array. The grid takes ownership of the buffer.
    pub fn from_array(data: Array2<f64>) -> Self {
        Self {
            data,
            _live: LiveToken::new(GridKind::Real),
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    pub fn from_elem(rows: usize, cols: usize, value: f64) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    pub fn from_shape_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        Self::from_array(Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)))
    }

    /// Build a grid from row-major samples supplied by an external source.
    ///
    /// Fails if the sample count does not match `rows * cols` or if any
    /// sample is NaN or infinite.
    pub fn from_row_major(rows: usize, cols: usize, samples: Vec<f64>) -> Result<Self> {
        let expected = rows * cols;
        if samples.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: samples.len(),
            });
        }
        if let Some(idx) = samples.iter().position(|v| !v.is_finite()) {
            return Err(GridError::NonFinite {
                row: idx / cols.max(1),
                col: idx % cols.max(1),
            });
        }
        let data = Array2::from_shape_vec((rows, cols), samples)
            .map_err(|_| GridError::InvalidDimensions { rows, cols })?;
        Ok(Self::from_array(data))
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[[row, col]]
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    /// Row-major iterator over all samples.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// Relinquish the grid, handing its buffer to the caller.
    ///
    /// The grid stops counting as live; the returned array is plain host data.
    pub fn release(self) -> Array2<f64> {
        let Self { data, .. } = self;
        data
    }

    /// Discard the grid and its contents.
    pub fn clear(self) {
        drop(self);
    }

    pub(crate) fn assert_same_shape(&self, other: &RealGrid, op: &str) {
        assert_eq!(
            self.shape(),
            other.shape(),
            "{op}: grid shape mismatch {:?} vs {:?}",
            self.shape(),
            other.shape()
        );
    }

    /// Combine two same-shaped grids cell by cell.
    pub fn zip_with<F>(&self, other: &RealGrid, f: F) -> RealGrid
    where
        F: Fn(f64, f64) -> f64,
    {
        self.assert_same_shape(other, "zip_with");
        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|&a, &b| f(a, b));
        RealGrid::from_array(data)
    }

    /// Apply `f` to every cell.
    pub fn map<F>(&self, f: F) -> RealGrid
    where
        F: Fn(f64) -> f64,
    {
        RealGrid::from_array(self.data.mapv(f))
    }

    pub fn scale(&self, factor: f64) -> RealGrid {
        self.map(|v| v * factor)
    }

    pub fn offset(&self, delta: f64) -> RealGrid {
        self.map(|v| v + delta)
    }

    /// Per-cell convex combination: `weight * a + (1 - weight) * b`.
    pub fn blend(weight: &RealGrid, a: &RealGrid, b: &RealGrid) -> RealGrid {
        weight.assert_same_shape(a, "blend");
        weight.assert_same_shape(b, "blend");
        let data = Zip::from(&weight.data)
            .and(&a.data)
            .and(&b.data)
            .map_collect(|&w, &x, &y| w * x + (1.0 - w) * y);
        RealGrid::from_array(data)
    }

    /// Clamp every cell to `[low, high]`.
    pub fn truncate(&self, low: f64, high: f64) -> RealGrid {
        self.map(|v| v.clamp(low, high))
    }

    /// Smallest and largest sample, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let (lo, hi) = self
            .data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Some((lo, hi))
    }

    pub fn min(&self) -> f64 {
        self.min_max().map_or(0.0, |(lo, _)| lo)
    }

    pub fn max(&self) -> f64 {
        self.min_max().map_or(0.0, |(_, hi)| hi)
    }

    pub fn sum(&self) -> f64 {
        self.data.sum()
    }

    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.sum() / self.len() as f64
        }
    }

    /// Linearly map `[low, high]` onto `[0, 1]`. A zero-width range maps to zeros.
    pub fn normalize_between(&self, low: f64, high: f64) -> RealGrid {
        let range = high - low;
        if range == 0.0 {
            return RealGrid::zeros(self.rows(), self.cols());
        }
        self.map(|v| (v - low) / range)
    }

    /// Linearly map the grid's own `[min, max]` onto `[0, 1]`.
    pub fn normalize(&self) -> RealGrid {
        match self.min_max() {
            Some((lo, hi)) => self.normalize_between(lo, hi),
            None => RealGrid::zeros(self.rows(), self.cols()),
        }
    }

    pub fn transpose(&self) -> RealGrid {
        RealGrid::from_array(self.data.t().to_owned())
    }

    /// 180-degree rotation.
    pub fn reverse(&self) -> RealGrid {
        RealGrid::from_array(self.data.slice(s![..;-1, ..;-1]).to_owned())
    }

    /// Cyclic shift by half the grid size on each axis, swapping every
    /// quadrant with its diagonally opposite one.
    pub fn fourier_shift(&self) -> RealGrid {
        let (h, w) = self.shape();
        let (dr, dc) = (h / 2, w / 2);
        let mut out = Array2::zeros((h, w));
        for ((row, col), &v) in self.data.indexed_iter() {
            out[[(row + dr) % h, (col + dc) % w]] = v;
        }
        RealGrid::from_array(out)
    }

    /// Add `k` rows of `fill` above and below, or crop `-k` rows from each
    /// edge when `k` is negative.
    pub fn pad_rows(&self, k: isize, fill: f64) -> RealGrid {
        self.pad(k, 0, fill)
    }

    /// Column counterpart of [`pad_rows`](Self::pad_rows).
    pub fn pad_cols(&self, k: isize, fill: f64) -> RealGrid {
        self.pad(0, k, fill)
    }

    /// Pad (or crop, for negative amounts) both axes at once.
    pub fn pad(&self, row_k: isize, col_k: isize, fill: f64) -> RealGrid {
        let (h, w) = self.shape();
        let new_h = h as isize + 2 * row_k;
        let new_w = w as isize + 2 * col_k;
        assert!(
            new_h >= 0 && new_w >= 0,
            "pad: cropping {row_k}x{col_k} exceeds grid {h}x{w}"
        );
        let (new_h, new_w) = (new_h as usize, new_w as usize);
        let mut out = Array2::from_elem((new_h, new_w), fill);

        // Overlap between source and destination along one axis.
        let span = |k: isize, len: usize, new_len: usize| {
            if k >= 0 {
                (0, k as usize, len)
            } else {
                ((-k) as usize, 0, new_len)
            }
        };
        let (src_r, dst_r, n_r) = span(row_k, h, new_h);
        let (src_c, dst_c, n_c) = span(col_k, w, new_w);
        out.slice_mut(s![dst_r..dst_r + n_r, dst_c..dst_c + n_c])
            .assign(&self.data.slice(s![src_r..src_r + n_r, src_c..src_c + n_c]));
        RealGrid::from_array(out)
    }

    /// Re-lay the samples row-major into a `rows x cols` grid of the same size.
    pub fn reshape(&self, rows: usize, cols: usize) -> Result<RealGrid> {
        if rows * cols != self.len() {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        let samples: Vec<f64> = self.data.iter().copied().collect();
        let data = Array2::from_shape_vec((rows, cols), samples)
            .map_err(|_| GridError::InvalidDimensions { rows, cols })?;
        Ok(RealGrid::from_array(data))
    }

    // -----------------------------------------------------------------------
    // Mask helpers (0/1 grids)
    // -----------------------------------------------------------------------

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| is_foreground(v)).count()
    }

    /// Cells set in both masks.
    pub fn intersect(&self, other: &RealGrid) -> RealGrid {
        self.zip_with(other, |a, b| mask_value(is_foreground(a) && is_foreground(b)))
    }

    /// Cells set in `self` but not in `other`.
    pub fn difference(&self, other: &RealGrid) -> RealGrid {
        self.zip_with(other, |a, b| mask_value(is_foreground(a) && !is_foreground(b)))
    }

    /// Swap foreground and background.
    pub fn invert(&self) -> RealGrid {
        self.map(|v| mask_value(!is_foreground(v)))
    }

    /// Unweighted `(row, col)` centroid of the foreground cells.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let mut sum_row = 0.0;
        let mut sum_col = 0.0;
        let mut n = 0usize;
        for ((row, col), &v) in self.data.indexed_iter() {
            if is_foreground(v) {
                sum_row += row as f64;
                sum_col += col as f64;
                n += 1;
            }
        }
        (n > 0).then(|| (sum_row / n as f64, sum_col / n as f64))
    }
}
