use ndarray::{Array2, Axis};

use crate::grid::{is_foreground, RealGrid};

/// Binary erosion with a `(2r+1)^2` square element.
///
/// A foreground cell survives only if every cell within Chebyshev distance
/// `r` is foreground. Cells outside the grid are ignored.
pub fn erode(mask: &RealGrid, radius: usize) -> RealGrid {
    square_filter(mask, radius, Reduce::All)
}

/// Binary dilation with a `(2r+1)^2` square element.
///
/// Any cell within Chebyshev distance `r` of a foreground cell becomes foreground.
pub fn dilate(mask: &RealGrid, radius: usize) -> RealGrid {
    square_filter(mask, radius, Reduce::Any)
}

/// Erosion followed by dilation: removes specks smaller than the element.
pub fn opening(mask: &RealGrid, radius: usize) -> RealGrid {
    dilate(&erode(mask, radius), radius)
}

/// Dilation followed by erosion: closes gaps smaller than the element.
pub fn closing(mask: &RealGrid, radius: usize) -> RealGrid {
    erode(&dilate(mask, radius), radius)
}

#[derive(Clone, Copy)]
enum Reduce {
    All,
    Any,
}

/// The square element is separable: one pass along rows, one along columns.
fn square_filter(mask: &RealGrid, radius: usize, reduce: Reduce) -> RealGrid {
    let flags = mask.as_array().mapv(is_foreground);
    let rows_done = filter_axis(&flags, Axis(1), radius, reduce);
    let both = filter_axis(&rows_done, Axis(0), radius, reduce);
    RealGrid::from_array(both.mapv(|b| if b { 1.0 } else { 0.0 }))
}

fn filter_axis(flags: &Array2<bool>, axis: Axis, radius: usize, reduce: Reduce) -> Array2<bool> {
    let mut out = Array2::from_elem(flags.dim(), false);
    for (src, mut dst) in flags.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = src.len();
        for i in 0..n {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(n);
            let mut window = (lo..hi).map(|j| src[j]);
            dst[i] = match reduce {
                Reduce::All => window.all(|b| b),
                Reduce::Any => window.any(|b| b),
            };
        }
    }
    out
}
