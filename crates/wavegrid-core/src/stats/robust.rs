use std::cmp::Ordering;

use num_traits::{Float, NumCast};

use crate::consts::SN_CONSISTENCY;
use crate::grid::RealGrid;

fn cmp<T: Float>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

fn from_f64<T: Float>(v: f64) -> T {
    <T as NumCast>::from(v).unwrap_or_else(T::zero)
}

/// Exact order-statistic median. Reorders `values` in place.
///
/// Odd counts return the middle element; even counts return the mean of the
/// two middle elements. An empty slice yields zero.
pub fn median<T: Float>(values: &mut [T]) -> T {
    let n = values.len();
    if n == 0 {
        return T::zero();
    }
    let mid = n / 2;
    let (lower, &mut upper, _) = values.select_nth_unstable_by(mid, cmp);
    if n % 2 == 1 {
        upper
    } else {
        // After partitioning, the largest of the lower half is the other middle.
        let below = lower.iter().copied().fold(T::neg_infinity(), Float::max);
        (below + upper) / from_f64(2.0)
    }
}

/// Linearly interpolated percentile, `fraction` in `[0, 1]`. Reorders `values`.
///
/// `percentile(v, 0.5)` agrees with [`median`].
pub fn percentile<T: Float>(values: &mut [T], fraction: f64) -> T {
    let n = values.len();
    if n == 0 {
        return T::zero();
    }
    let pos = fraction.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let (_, &mut lo_val, upper) = values.select_nth_unstable_by(lo, cmp);
    if hi == lo {
        return lo_val;
    }
    let hi_val = upper.iter().copied().fold(T::infinity(), Float::min);
    let t = from_f64::<T>(pos - lo as f64);
    lo_val + (hi_val - lo_val) * t
}

/// Rousseeuw-Croux Sn scale estimator: `1.1926 * med_i med_j |x_i - x_j|`.
///
/// Both medians are the exact medians of [`median`], and the inner median runs
/// over all `j` including `j = i`. Fewer than two samples yield zero.
pub fn sn<T: Float>(values: &[T]) -> T {
    let n = values.len();
    if n < 2 {
        return T::zero();
    }
    let mut diffs = vec![T::zero(); n];
    let mut inner = Vec::with_capacity(n);
    for &xi in values {
        for (d, &xj) in diffs.iter_mut().zip(values) {
            *d = (xi - xj).abs();
        }
        inner.push(median(&mut diffs));
    }
    median(&mut inner) * from_f64(SN_CONSISTENCY)
}

/// Mean absolute deviation about the median.
pub fn mad_median<T: Float>(values: &[T]) -> T {
    let n = values.len();
    if n == 0 {
        return T::zero();
    }
    let mut scratch = values.to_vec();
    let med = median(&mut scratch);
    let total = values.iter().fold(T::zero(), |acc, &v| acc + (v - med).abs());
    total / from_f64(n as f64)
}

impl RealGrid {
    fn samples(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Exact median of all cells; zero for an empty grid.
    pub fn median(&self) -> f64 {
        median(&mut self.samples())
    }

    pub fn percentile(&self, fraction: f64) -> f64 {
        percentile(&mut self.samples(), fraction)
    }

    /// Sn robust scale of all cells. Quadratic in the cell count.
    pub fn sn(&self) -> f64 {
        sn(&self.samples())
    }

    pub fn mad_median(&self) -> f64 {
        mad_median(&self.samples())
    }
}
