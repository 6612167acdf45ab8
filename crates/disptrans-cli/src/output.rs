//! Result output formatting and writing.

use crate::orchestrator::RunResults;
use crate::OutputFormat;
use anyhow::{Context, Result};
use lib_dsp::{RoundTripReport, WindowType};
use lib_io::{write_distance_profile, write_frequency_sweep};
use lib_types::{DistanceProfile, FrequencySweep};
use std::io::Write;
use std::path::Path;

/// Write run results to the output directory.
pub fn write_results(results: &RunResults, output_dir: &Path, format: OutputFormat) -> Result<()> {
    let profile_path = output_dir.join("distance_response.csv");
    write_profile_file(&results.profile, &profile_path)?;

    if let Some(recovered) = &results.recovered {
        let recovered_path = output_dir.join("recovered_response.csv");
        write_sweep_file(recovered, &recovered_path)?;
    }

    let summary_path = output_dir.join(match format {
        OutputFormat::Text => "summary.txt",
        OutputFormat::Json => "summary.json",
        OutputFormat::Csv => "summary.csv",
    });
    let mut f = std::fs::File::create(&summary_path)
        .with_context(|| format!("Failed to create {:?}", summary_path))?;
    write_summary(&mut f, results, format)?;
    tracing::info!("Wrote summary to {:?}", summary_path);

    Ok(())
}

/// Write a distance response CSV.
pub fn write_profile_file(profile: &DistanceProfile, path: &Path) -> Result<()> {
    let mut f = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
    );
    write_distance_profile(&mut f, profile)?;
    f.flush()?;
    tracing::info!("Wrote distance response to {:?}", path);
    Ok(())
}

/// Write a frequency response CSV.
pub fn write_sweep_file(sweep: &FrequencySweep, path: &Path) -> Result<()> {
    let mut f = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
    );
    write_frequency_sweep(&mut f, sweep)?;
    f.flush()?;
    tracing::info!("Wrote frequency response to {:?}", path);
    Ok(())
}

fn window_name(window: WindowType) -> String {
    match window {
        WindowType::Rectangular => "rectangular".to_string(),
        WindowType::Hann => "hann".to_string(),
        WindowType::Hamming => "hamming".to_string(),
        WindowType::Blackman => "blackman".to_string(),
        WindowType::Kaiser { beta } => format!("kaiser(beta={})", beta),
    }
}

fn axis_range(axis: &[f64]) -> (f64, f64) {
    (
        axis.first().copied().unwrap_or(f64::NAN),
        axis.last().copied().unwrap_or(f64::NAN),
    )
}

/// Write a run summary in the requested format.
pub fn write_summary<W: Write>(w: &mut W, results: &RunResults, format: OutputFormat) -> Result<()> {
    let (f_lo, f_hi) = axis_range(&results.sweep.frequencies);
    let (x_lo, x_hi) = axis_range(&results.profile.distances);
    let peak = results.profile.peak();
    let window = window_name(results.window);

    match format {
        OutputFormat::Text => {
            writeln!(w, "disptrans run: {}", results.name)?;
            writeln!(w, "{}", "=".repeat(15 + results.name.len()))?;
            writeln!(w, "Frequency points: {}", results.sweep.len())?;
            writeln!(w, "Frequency range:  {:.3} - {:.3} GHz", f_lo / 1e9, f_hi / 1e9)?;
            writeln!(w, "Distance points:  {}", results.profile.len())?;
            writeln!(w, "Distance range:   {:.6} - {:.6} m", x_lo, x_hi)?;
            if let Some((x, magnitude)) = peak {
                writeln!(w, "Peak:             {:.4} at {:.6} m", magnitude, x)?;
            }
            writeln!(w, "Window:           {}", window)?;
            if let Some(report) = &results.report {
                writeln!(w)?;
                write_report_text(w, report)?;
            }
        }
        OutputFormat::Json => {
            let report = results.report.as_ref().map(|r| {
                serde_json::json!({
                    "points_compared": r.points_compared,
                    "max_deviation": r.max_deviation,
                    "worst_frequency_hz": r.worst_frequency,
                    "decimals": r.decimals,
                    "passed": r.passed,
                })
            });
            let json = serde_json::json!({
                "name": results.name,
                "frequency_points": results.sweep.len(),
                "frequency_start_hz": f_lo,
                "frequency_stop_hz": f_hi,
                "distance_points": results.profile.len(),
                "distance_start_m": x_lo,
                "distance_stop_m": x_hi,
                "peak_distance_m": peak.map(|p| p.0),
                "peak_magnitude": peak.map(|p| p.1),
                "window": window,
                "round_trip": report,
            });
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv => {
            writeln!(w, "metric,value")?;
            writeln!(w, "name,{}", csv_field(&results.name))?;
            writeln!(w, "frequency_points,{}", results.sweep.len())?;
            writeln!(w, "frequency_start_hz,{}", f_lo)?;
            writeln!(w, "frequency_stop_hz,{}", f_hi)?;
            writeln!(w, "distance_points,{}", results.profile.len())?;
            writeln!(w, "distance_start_m,{}", x_lo)?;
            writeln!(w, "distance_stop_m,{}", x_hi)?;
            if let Some((x, magnitude)) = peak {
                writeln!(w, "peak_distance_m,{}", x)?;
                writeln!(w, "peak_magnitude,{}", magnitude)?;
            }
            writeln!(w, "window,{}", csv_field(&window))?;
            if let Some(r) = &results.report {
                writeln!(w, "points_compared,{}", r.points_compared)?;
                writeln!(w, "max_deviation,{}", r.max_deviation)?;
                if let Some(f) = r.worst_frequency {
                    writeln!(w, "worst_frequency_hz,{}", f)?;
                }
                writeln!(w, "decimals,{}", r.decimals)?;
                writeln!(w, "passed,{}", r.passed)?;
            }
        }
    }

    Ok(())
}

/// Quote a free-text CSV field when it holds a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_report_text<W: Write>(w: &mut W, report: &RoundTripReport) -> Result<()> {
    writeln!(w, "Round trip:")?;
    writeln!(w, "  Points compared: {}", report.points_compared)?;
    writeln!(w, "  Max deviation:   {:.3e}", report.max_deviation)?;
    if let Some(f) = report.worst_frequency {
        writeln!(w, "  Worst at:        {:.3} GHz", f / 1e9)?;
    }
    writeln!(w)?;
    if report.passed {
        writeln!(w, "Status: PASS - agrees to {} decimals", report.decimals)?;
    } else {
        writeln!(w, "Status: FAIL - does not agree to {} decimals", report.decimals)?;
    }
    Ok(())
}
