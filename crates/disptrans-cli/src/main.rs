//! disptrans: dispersion-compensated frequency/distance transforms for
//! waveguide measurements.

mod config;
mod orchestrator;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{DistanceConfig, WindowConfig, WindowKind};
use lib_dsp::window::window_profile;
use lib_dsp::{profile_to_sweep, sweep_to_profile};
use lib_io::{read_dispersion, read_distance_profile, write_distance_profile, write_frequency_sweep};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "disptrans")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Summary format
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a measurement to distance and back, checking the round trip
    Run {
        /// Path to the run configuration file (TOML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Transform a Touchstone transfer term to the distance domain
    ToDistance {
        /// Path to the .sNp file
        #[arg(long)]
        touchstone: PathBuf,

        /// Dispersion table (frequency_hz, beta_rad_per_m)
        #[arg(long)]
        beta: PathBuf,

        /// Receiving port (1-based)
        #[arg(long, default_value = "2")]
        output_port: usize,

        /// Driven port (1-based)
        #[arg(long, default_value = "1")]
        input_port: usize,

        /// First distance, m
        #[arg(long, requires = "stop")]
        start: Option<f64>,

        /// Last distance, m
        #[arg(long, requires = "start")]
        stop: Option<f64>,

        /// Number of distance samples
        #[arg(long)]
        points: Option<usize>,

        /// Output CSV (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transform a distance response back to the frequency domain
    ToFrequency {
        /// Distance response table (distance_m, re, im)
        #[arg(long)]
        distance: PathBuf,

        /// Dispersion table giving the output frequencies
        #[arg(long)]
        beta: PathBuf,

        /// Window applied before the transform
        #[arg(long, value_enum, default_value = "hamming")]
        window: WindowKind,

        /// Kaiser shape parameter
        #[arg(long)]
        kaiser_beta: Option<f64>,

        /// Output CSV (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
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
        Commands::Run { config, output } => {
            run(&config, &output, cli.format)?;
        }
        Commands::ToDistance {
            touchstone,
            beta,
            output_port,
            input_port,
            start,
            stop,
            points,
            output,
        } => {
            let distance = DistanceConfig {
                start_m: start,
                stop_m: stop,
                points,
            };
            to_distance(
                &touchstone,
                &beta,
                (output_port, input_port),
                &distance,
                output.as_deref(),
            )?;
        }
        Commands::ToFrequency {
            distance,
            beta,
            window,
            kaiser_beta,
            output,
        } => {
            let window = WindowConfig::new(window, kaiser_beta);
            to_frequency(&distance, &beta, &window, output.as_deref())?;
        }
    }

    Ok(())
}

fn run(config_path: &Path, output_dir: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Loading configuration from {:?}", config_path);

    let config = config::load_config(config_path)?;
    let results = orchestrator::Orchestrator::new(config).run()?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;
    output::write_results(&results, output_dir, format)?;

    let stdout = std::io::stdout();
    output::write_summary(&mut stdout.lock(), &results, format)?;

    if let Some(report) = &results.report {
        if !report.passed {
            anyhow::bail!(
                "Round trip failed: deviation {:.3e} at {} decimals",
                report.max_deviation,
                report.decimals
            );
        }
    }
    Ok(())
}

fn to_distance(
    touchstone: &Path,
    beta: &Path,
    (output_port, input_port): (usize, usize),
    distance: &DistanceConfig,
    output: Option<&Path>,
) -> Result<()> {
    distance.validate()?;
    let sweep = orchestrator::load_sweep(touchstone, beta, output_port, input_port)?;
    let distances = distance.axis(&sweep.beta)?;
    let profile = sweep_to_profile(&sweep, &distances).context("Forward transform failed")?;

    if let Some((x, magnitude)) = profile.peak() {
        tracing::info!("Peak {:.4} at {:.6} m", magnitude, x);
    }

    match output {
        Some(path) => output::write_profile_file(&profile, path)?,
        None => write_distance_profile(&mut std::io::stdout().lock(), &profile)?,
    }
    Ok(())
}

fn to_frequency(
    distance: &Path,
    beta: &Path,
    window: &WindowConfig,
    output: Option<&Path>,
) -> Result<()> {
    window.validate()?;
    let profile = read_distance_profile(distance)
        .with_context(|| format!("Failed to parse distance response: {:?}", distance))?;
    let table = read_dispersion(beta)
        .with_context(|| format!("Failed to parse dispersion table: {:?}", beta))?;

    let windowed = window_profile(&profile, window.window_type());
    let sweep = profile_to_sweep(&windowed, &table.frequencies, &table.beta)
        .context("Inverse transform failed")?;

    match output {
        Some(path) => output::write_sweep_file(&sweep, path)?,
        None => write_frequency_sweep(&mut std::io::stdout().lock(), &sweep)?,
    }
    Ok(())
}
