use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, warn};
use wavegrid_core::detection::{extract_aperture, ApertureConfig, ApertureMetrics, ThresholdMethod};
use wavegrid_core::grid::grid_to_gray_image;

use super::config::load_config;
use super::load_grid;

#[derive(Args)]
pub struct ApertureArgs {
    /// Input pupil images
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// TOML config file (see `wavegrid config`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use a fixed signal threshold instead of the configured method
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Save each usable pupil mask (aperture minus obstruction) here as PNG
    #[arg(long)]
    pub mask_dir: Option<PathBuf>,

    /// Stop remaining images as soon as one fails
    #[arg(long)]
    pub fail_fast: bool,
}

pub fn run(args: &ApertureArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ApertureConfig::default(),
    };
    if let Some(t) = args.threshold {
        config.threshold = ThresholdMethod::Fixed(t);
    }
    if let Some(dir) = &args.mask_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let pb = ProgressBar::new(args.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Extracting apertures");

    let cancel = AtomicBool::new(false);
    // One single-threaded engine pipeline per image.
    let results: Vec<(&PathBuf, Result<ApertureMetrics>)> = args
        .files
        .par_iter()
        .map(|path| {
            let result = process_one(path, &config, args.mask_dir.as_deref(), &cancel);
            match &result {
                Ok(m) => debug!(file = %path.display(), radius = m.radius, "aperture extracted"),
                Err(e) => {
                    warn!(file = %path.display(), "aperture extraction failed: {e:#}");
                    if args.fail_fast {
                        cancel.store(true, Ordering::Relaxed);
                    }
                }
            }
            pb.inc(1);
            (path, result)
        })
        .collect();
    pb.finish_and_clear();

    println!(
        "{:<32}  {:>9}  {:>9}  {:>8}  {:>8}  {:>9}",
        "File", "cx", "cy", "radius", "obs. r", "signal"
    );
    println!("{}", "-".repeat(84));

    let mut failures = 0;
    for (path, result) in &results {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match result {
            Ok(m) if m.is_empty() => {
                println!("{:<32}  {}", name, style("no aperture found").yellow());
            }
            Ok(m) => println!(
                "{:<32}  {:>9.2}  {:>9.2}  {:>8.2}  {:>8.2}  {:>9.5}",
                name, m.cx, m.cy, m.radius, m.obstruction_radius, m.signal
            ),
            Err(e) => {
                failures += 1;
                println!("{:<32}  {}", name, style(format!("error: {e:#}")).red());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, results.len());
    }
    Ok(())
}

fn process_one(
    path: &Path,
    config: &ApertureConfig,
    mask_dir: Option<&Path>,
    cancel: &AtomicBool,
) -> Result<ApertureMetrics> {
    let signal = load_grid(path)?;
    let extraction = extract_aperture(&signal, config, cancel)?;
    signal.clear();

    if let Some(dir) = mask_dir {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mask".to_string());
        let out = dir.join(format!("{stem}_mask.png"));
        grid_to_gray_image(&extraction.mask)
            .save(&out)
            .with_context(|| format!("Failed to write {}", out.display()))?;
    }

    Ok(extraction.metrics)
}
