use ndarray::Array2;

use crate::grid::RealGrid;

/// Bilinear sample at a fractional `(row, col)`.
///
/// Positions are clamped to the valid index range, so sampling past the last
/// row or column returns edge values rather than extrapolating.
pub fn bilinear(grid: &RealGrid, row: f64, col: f64) -> f64 {
    let (h, w) = grid.shape();
    if h == 0 || w == 0 {
        return 0.0;
    }
    let y = row.clamp(0.0, (h - 1) as f64);
    let x = col.clamp(0.0, (w - 1) as f64);

    let y0 = y.floor() as usize;
    let x0 = x.floor() as usize;
    let y1 = (y0 + 1).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);
    let fy = y - y0 as f64;
    let fx = x - x0 as f64;

    let data = grid.view();
    let top = data[[y0, x0]] * (1.0 - fx) + data[[y0, x1]] * fx;
    let bottom = data[[y1, x0]] * (1.0 - fx) + data[[y1, x1]] * fx;
    top * (1.0 - fy) + bottom * fy
}

impl RealGrid {
    pub fn sample_bilinear(&self, row: f64, col: f64) -> f64 {
        bilinear(self, row, col)
    }
}

/// Magnify the grid content by `scale` about the grid center, conserving flux.
///
/// Each output cell's polar coordinates about the center are mapped back
/// through `1 / scale` to a source position, sampled bilinearly, and divided
/// by `scale^2` so the total intensity rather than the peak is preserved.
/// The output has the same shape as the input.
pub fn rescale_flux(grid: &RealGrid, scale: f64) -> RealGrid {
    assert!(
        scale.is_finite() && scale > 0.0,
        "rescale_flux: scale must be positive, got {scale}"
    );
    let (h, w) = grid.shape();
    let cy = (h as f64 - 1.0) / 2.0;
    let cx = (w as f64 - 1.0) / 2.0;
    let gain = 1.0 / (scale * scale);

    let data = Array2::from_shape_fn((h, w), |(row, col)| {
        let dy = row as f64 - cy;
        let dx = col as f64 - cx;
        let radius = dy.hypot(dx) / scale;
        let theta = dy.atan2(dx);
        let src_row = cy + radius * theta.sin();
        let src_col = cx + radius * theta.cos();
        bilinear(grid, src_row, src_col) * gain
    });

    RealGrid::from_array(data)
}
