//! Run configuration loading and validation.

use anyhow::{Context, Result};
use lib_dsp::axis::{default_distance_axis, linspace};
use lib_dsp::WindowType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level run configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run name, echoed in the summary.
    pub name: String,

    /// Measured data and dispersion relation.
    pub input: InputConfig,

    /// Distance axis for the forward transform.
    #[serde(default)]
    pub distance: DistanceConfig,

    /// Taper applied to the distance response before inversion.
    #[serde(default)]
    pub window: WindowConfig,

    /// Passband comparison of the recovered response.
    #[serde(default)]
    pub round_trip: RoundTripConfig,
}

/// Input files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to the Touchstone file.
    pub touchstone: PathBuf,

    /// Receiving port (1-based).
    #[serde(default = "default_output_port")]
    pub output_port: usize,

    /// Driven port (1-based).
    #[serde(default = "default_input_port")]
    pub input_port: usize,

    /// Path to the dispersion table (`frequency_hz, beta_rad_per_m`).
    pub beta: PathBuf,
}

fn default_output_port() -> usize { 2 }
fn default_input_port() -> usize { 1 }

/// Distance axis. With no bounds the axis spans the unambiguous range of
/// the dispersion relation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DistanceConfig {
    pub start_m: Option<f64>,
    pub stop_m: Option<f64>,

    /// Number of samples; defaults to the number of frequency samples.
    pub points: Option<usize>,
}

impl DistanceConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(points) = self.points {
            if points < 2 {
                anyhow::bail!("distance.points must be at least 2 (got {})", points);
            }
        }
        match (self.start_m, self.stop_m) {
            (Some(start), Some(stop)) => {
                if !(start.is_finite() && stop.is_finite()) {
                    anyhow::bail!("distance bounds must be finite ({} .. {})", start, stop);
                }
                if start >= stop {
                    anyhow::bail!(
                        "distance.start_m must be below distance.stop_m ({} >= {})",
                        start,
                        stop
                    );
                }
            }
            (None, None) => {}
            _ => anyhow::bail!("distance.start_m and distance.stop_m must be given together"),
        }
        Ok(())
    }

    /// Build the distance axis for a dispersion relation sampled at
    /// `beta.len()` frequencies.
    pub fn axis(&self, beta: &[f64]) -> Result<Vec<f64>> {
        let points = self.points.unwrap_or(beta.len());
        match (self.start_m, self.stop_m) {
            (Some(start), Some(stop)) => Ok(linspace(start, stop, points)),
            _ => default_distance_axis(beta, points)
                .context("Failed to build default distance axis"),
        }
    }
}

/// Window selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Rectangular,
    Hann,
    #[default]
    Hamming,
    Blackman,
    Kaiser,
}

/// Window configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(rename = "type", default)]
    pub kind: WindowKind,

    /// Kaiser shape parameter.
    pub beta: Option<f64>,
}

fn default_kaiser_beta() -> f64 { 6.0 }

impl WindowConfig {
    pub fn new(kind: WindowKind, beta: Option<f64>) -> Self {
        Self { kind, beta }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(beta) = self.beta {
            if !(beta.is_finite() && beta >= 0.0) {
                anyhow::bail!("window.beta must be finite and non-negative (got {})", beta);
            }
            if self.kind != WindowKind::Kaiser {
                tracing::warn!("window.beta is only used by the kaiser window");
            }
        }
        Ok(())
    }

    pub fn window_type(&self) -> WindowType {
        match self.kind {
            WindowKind::Rectangular => WindowType::Rectangular,
            WindowKind::Hann => WindowType::Hann,
            WindowKind::Hamming => WindowType::Hamming,
            WindowKind::Blackman => WindowType::Blackman,
            WindowKind::Kaiser => WindowType::Kaiser {
                beta: self.beta.unwrap_or_else(default_kaiser_beta),
            },
        }
    }
}

/// Round-trip comparison settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundTripConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Passband bounds, Hz. Without them the inner 90% of the band is used.
    pub passband_min_hz: Option<f64>,
    pub passband_max_hz: Option<f64>,

    /// Required agreement in decimal places.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_true() -> bool { true }
fn default_decimals() -> u32 { 3 }

/// Largest decimal count an f64 comparison can meaningfully resolve.
const MAX_DECIMALS: u32 = 15;

/// Fraction of the band trimmed from each edge when no passband is given.
const DEFAULT_EDGE_TRIM: f64 = 0.05;

impl Default for RoundTripConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            passband_min_hz: None,
            passband_max_hz: None,
            decimals: default_decimals(),
        }
    }
}

impl RoundTripConfig {
    pub fn validate(&self) -> Result<()> {
        if self.decimals > MAX_DECIMALS {
            anyhow::bail!(
                "round_trip.decimals must be at most {} (got {})",
                MAX_DECIMALS,
                self.decimals
            );
        }
        match (self.passband_min_hz, self.passband_max_hz) {
            (Some(lo), Some(hi)) if lo >= hi => {
                anyhow::bail!("passband_min_hz must be below passband_max_hz ({} >= {})", lo, hi)
            }
            (Some(_), Some(_)) | (None, None) => Ok(()),
            _ => anyhow::bail!("passband_min_hz and passband_max_hz must be given together"),
        }
    }

    /// Passband for a sweep spanning `first..last` Hz.
    pub fn passband(&self, first: f64, last: f64) -> (f64, f64) {
        match (self.passband_min_hz, self.passband_max_hz) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => {
                let trim = (last - first) * DEFAULT_EDGE_TRIM;
                (first + trim, last - trim)
            }
        }
    }
}

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: RunConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config as JSON: {:?}", path))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config as TOML: {:?}", path))?
    };

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration values, then check that input files exist.
pub fn validate_config(config: &RunConfig) -> Result<()> {
    check_values(config)?;

    for (label, path) in [
        ("Touchstone", &config.input.touchstone),
        ("Dispersion table", &config.input.beta),
    ] {
        if !path.exists() {
            anyhow::bail!("{} file not found: {:?}", label, path);
        }
    }

    Ok(())
}

fn check_values(config: &RunConfig) -> Result<()> {
    let input = &config.input;
    if input.input_port == 0 || input.output_port == 0 {
        anyhow::bail!(
            "Port numbers must be 1-based (got input={}, output={})",
            input.input_port,
            input.output_port
        );
    }

    config.distance.validate()?;
    config.window.validate()?;
    config.round_trip.validate()?;

    Ok(())
}
