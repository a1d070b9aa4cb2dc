use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use wavegrid_core::fourier::{self, Centering};
use wavegrid_core::grid::grid_to_gray_image;
use wavegrid_core::pipeline::NeverCancel;

use super::load_grid;

#[derive(Args)]
pub struct SpectrumArgs {
    /// Input image
    pub file: PathBuf,

    /// Output image path (PNG or TIFF)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Zero-pad this many pixels on every edge before transforming
    #[arg(long, default_value = "0")]
    pub pad: usize,
}

pub fn run(args: &SpectrumArgs) -> Result<()> {
    let grid = load_grid(&args.file)?;
    let padded = grid.pad(args.pad as isize, args.pad as isize, 0.0);
    grid.clear();

    let spectrum = fourier::forward_real(padded, Centering::Centered, &NeverCancel)?;
    let display = spectrum.modulus().map(f64::ln_1p).normalize();
    spectrum.clear();

    grid_to_gray_image(&display)
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Spectrum saved to {}", args.output.display());

    Ok(())
}
