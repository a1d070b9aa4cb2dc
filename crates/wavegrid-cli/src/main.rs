mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wavegrid", about = "Pupil image reduction with the frame algebra engine")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show grid statistics for an image
    Info(commands::info::InfoArgs),
    /// Compute the adaptive defocus threshold of an image
    Threshold(commands::threshold::ThresholdArgs),
    /// Extract aperture and obstruction metrics from pupil images
    Aperture(commands::aperture::ApertureArgs),
    /// Save the centered log-modulus spectrum of an image
    Spectrum(commands::spectrum::SpectrumArgs),
    /// Print or save a default aperture config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Threshold(args) => commands::threshold::run(args),
        Commands::Aperture(args) => commands::aperture::run(args),
        Commands::Spectrum(args) => commands::spectrum::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
