pub mod consts;
pub mod detection;
pub mod error;
pub mod filters;
pub mod fourier;
pub mod grid;
pub mod lifecycle;
pub mod linalg;
pub mod pipeline;
pub mod resample;
pub mod stats;

pub use error::{GridError, Result};
pub use grid::{ComplexGrid, RealGrid};
