//! Command-line runner for multichannel spectral processing.
//!
//! Loads a recording and a pipeline description, runs filtering, reshaping,
//! envelope and spectrum stages, and writes the results to disk.

mod config;
mod orchestrator;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lib_types::{CanonicalBand, Hertz};
use std::path::Path;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ephys-spectral")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a processing pipeline
    Run {
        /// Path to the pipeline configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// List the canonical frequency bands
    Bands,

    /// Print the taper and spectral mask of a canonical band
    Mask {
        /// Band name (delta, theta, alpha, beta, beta-low, ...)
        #[arg(short, long)]
        band: String,

        /// Block length in samples
        #[arg(short = 'n', long, default_value = "256")]
        samples: usize,

        /// Sampling frequency (Hz)
        #[arg(short, long, default_value = "256")]
        sfreq: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Run { config, output } => run_pipeline(&config, &output, cli.format)?,
        Commands::Bands => output::print_bands(cli.format)?,
        Commands::Mask { band, samples, sfreq } => show_mask(&band, samples, sfreq, cli.format)?,
    }

    Ok(())
}

fn run_pipeline(config_path: &Path, output_dir: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Loading configuration from {:?}", config_path);

    let config = config::load_config(config_path)?;
    let orchestrator = orchestrator::Orchestrator::new(config)?;

    tracing::info!("Starting pipeline...");
    let results = orchestrator.run()?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;
    output::write_results(&results, output_dir, format)?;

    tracing::info!("Pipeline complete. Results written to {:?}", output_dir);
    Ok(())
}

fn show_mask(band: &str, samples: usize, sfreq: f64, format: OutputFormat) -> Result<()> {
    let band: CanonicalBand = band.parse()?;
    let rate = Hertz(sfreq);
    let filter = lib_dsp::prepare_cosine_filter(&band.spec(), samples, rate)
        .with_context(|| format!("Cannot design the {} mask", band))?;
    output::print_mask(&filter, rate, format)
}
