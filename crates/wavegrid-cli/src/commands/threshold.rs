use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use wavegrid_core::consts::{
    DEFAULT_DEFOCUS_BINS, DEFAULT_DEFOCUS_MIN_BINS, DEFAULT_DEFOCUS_SIGMA,
    DEFAULT_HOT_PIXEL_RADIUS, DEFAULT_PEAK_NEIGHBORHOOD,
};
use wavegrid_core::detection::threshold_label;
use wavegrid_core::filters::median_filter;
use wavegrid_core::stats::{defocus_threshold, DefocusParams};

use super::load_grid;

#[derive(Args)]
pub struct ThresholdArgs {
    /// Input image
    pub file: PathBuf,

    /// Initial histogram bin count
    #[arg(long, default_value_t = DEFAULT_DEFOCUS_BINS)]
    pub bins: usize,

    /// Smallest bin count tried when the histogram is sparse
    #[arg(long, default_value_t = DEFAULT_DEFOCUS_MIN_BINS)]
    pub min_bins: usize,

    /// Peak detector half-width in bins
    #[arg(long, default_value_t = DEFAULT_PEAK_NEIGHBORHOOD)]
    pub neighborhood: usize,

    /// Sn multiplier; larger values raise the threshold
    #[arg(long, default_value_t = DEFAULT_DEFOCUS_SIGMA)]
    pub sigma: f64,

    /// Median filter radius applied first (0 disables)
    #[arg(long, default_value_t = DEFAULT_HOT_PIXEL_RADIUS)]
    pub hot_pixel_radius: usize,
}

pub fn run(args: &ThresholdArgs) -> Result<()> {
    let grid = median_filter(&load_grid(&args.file)?, args.hot_pixel_radius);
    let params = DefocusParams {
        bins: args.bins,
        min_bins: args.min_bins,
        neighborhood: args.neighborhood,
        sigma: args.sigma,
    };

    let threshold = defocus_threshold(&grid, &params);
    if threshold == 0.0 {
        println!("No usable threshold found for {}", args.file.display());
        return Ok(());
    }

    let above = threshold_label(&grid, threshold).count_nonzero();
    println!("Threshold:  {:.6}", threshold);
    println!(
        "Above:      {} of {} pixels ({:.1}%)",
        above,
        grid.len(),
        100.0 * above as f64 / grid.len() as f64
    );

    Ok(())
}
