pub mod aperture;
pub mod config;
pub mod info;
pub mod spectrum;
pub mod threshold;

use std::path::Path;

use anyhow::{Context, Result};
use wavegrid_core::RealGrid;

/// Decode an image file into a grid scaled to `[0, 1]`.
pub fn load_grid(path: &Path) -> Result<RealGrid> {
    let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(RealGrid::from_image(&img))
}
