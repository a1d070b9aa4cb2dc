mod complex;
mod convert;
mod ops;
mod real;

pub use complex::ComplexGrid;
pub use convert::{grids_to_rgb_image, grid_to_gray_image};
pub use real::RealGrid;

pub(crate) use real::is_foreground;
