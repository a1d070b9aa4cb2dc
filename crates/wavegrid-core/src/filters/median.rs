use ndarray::Array2;

use crate::grid::RealGrid;
use crate::stats::robust::median;

/// Replace each cell with the median of its `(2r+1)^2` neighborhood.
///
/// Windows are truncated at the grid edge (no wraparound or reflection), so
/// border cells take the median of fewer samples.
pub fn median_filter(grid: &RealGrid, radius: usize) -> RealGrid {
    if radius == 0 {
        return grid.clone();
    }
    let (h, w) = grid.shape();
    let src = grid.view();
    let mut out = Array2::<f64>::zeros((h, w));
    let span = radius.saturating_mul(2).saturating_add(1);
    let mut window = Vec::with_capacity(span.min(h) * span.min(w));

    for row in 0..h {
        let r0 = row.saturating_sub(radius);
        let r1 = row.saturating_add(radius).saturating_add(1).min(h);
        for col in 0..w {
            let c0 = col.saturating_sub(radius);
            let c1 = col.saturating_add(radius).saturating_add(1).min(w);
            window.clear();
            for r in r0..r1 {
                window.extend((c0..c1).map(|c| src[[r, c]]));
            }
            out[[row, col]] = median(&mut window);
        }
    }

    RealGrid::from_array(out)
}
