use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::load_grid;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image
    pub file: PathBuf,

    /// Also compute the Sn scale estimator (quadratic in pixel count)
    #[arg(long)]
    pub sn: bool,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let grid = load_grid(&args.file)?;

    println!("File:       {}", args.file.display());
    println!("Size:       {} x {} (rows x cols)", grid.rows(), grid.cols());
    println!("Min:        {:.6}", grid.min());
    println!("Max:        {:.6}", grid.max());
    println!("Mean:       {:.6}", grid.mean());
    println!("Median:     {:.6}", grid.median());
    println!("MAD-median: {:.6}", grid.mad_median());
    if args.sn {
        println!("Sn:         {:.6}", grid.sn());
    }

    Ok(())
}
