use crate::grid::RealGrid;

/// 0/1 mask: 1 where `grid` exceeds `threshold`.
pub fn threshold_label(grid: &RealGrid, threshold: f64) -> RealGrid {
    grid.map(|v| if v > threshold { 1.0 } else { 0.0 })
}
