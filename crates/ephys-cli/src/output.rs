//! Result output formatting and writing.

use crate::orchestrator::PipelineResults;
use crate::OutputFormat;
use anyhow::{Context, Result};
use lib_dsp::spectrum::BandParameters;
use lib_dsp::CosineFilter;
use lib_types::{Complex64, Hertz, Signal};
use ndarray::{ArrayD, Axis};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Epoch (if any) and channel of the `lane`-th lane of an array whose
/// leading axes are `(channel)` or `(epoch, channel)`.
fn lane_label(lead: &[usize], lane: usize) -> (Option<usize>, usize) {
    match lead {
        [_, channels] => (Some(lane / channels), lane % channels),
        _ => (None, lane),
    }
}

fn output_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    let ext = match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
    };
    dir.join(format!("{stem}.{ext}"))
}

fn epoch_field(epoch: Option<usize>) -> String {
    epoch.map_or_else(|| "-".to_string(), |e| e.to_string())
}

/// Write pipeline results to the output directory.
pub fn write_results(results: &PipelineResults, output_dir: &Path, format: OutputFormat) -> Result<()> {
    let spectrum_path = output_path(output_dir, "spectrum", format);
    let mut f = std::fs::File::create(&spectrum_path)
        .with_context(|| format!("Failed to create {:?}", spectrum_path))?;
    write_spectrum(&mut f, results, format)?;
    tracing::info!("Wrote spectrum to {:?}", spectrum_path);

    if let Some(bp) = &results.spectrum.band_parameters {
        let bp_path = output_path(output_dir, "band_parameters", format);
        let mut f = std::fs::File::create(&bp_path)
            .with_context(|| format!("Failed to create {:?}", bp_path))?;
        write_band_parameters(&mut f, bp, &results.channels, format)?;
        tracing::info!("Wrote band parameters to {:?}", bp_path);
    }

    let summary_path = output_dir.join("summary.txt");
    let mut f = std::fs::File::create(&summary_path)
        .with_context(|| format!("Failed to create {:?}", summary_path))?;
    write_summary(&mut f, results)?;
    tracing::info!("Wrote summary to {:?}", summary_path);

    Ok(())
}

/// Spectrum as one row per lane and frequency.
pub fn write_spectrum<W: Write>(w: &mut W, results: &PipelineResults, format: OutputFormat) -> Result<()> {
    let freqs = &results.spectrum.frequencies;
    let spectrum = &results.spectrum.spectrum;
    let last = Axis(spectrum.ndim() - 1);
    let lead = &spectrum.shape()[..spectrum.ndim() - 1];

    match format {
        OutputFormat::Json => {
            let values = match spectrum {
                Signal::Real(p) => nested(p, |v: &f64| serde_json::json!(v)),
                Signal::Complex(c) => nested(c, |v: &Complex64| serde_json::json!([v.re, v.im])),
            };
            let json = serde_json::json!({
                "channels": results.channels,
                "shape": spectrum.shape(),
                "frequencies": freqs.to_vec(),
                "complex": spectrum.is_complex(),
                "values": values,
            });
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv | OutputFormat::Text => {
            let sep = if matches!(format, OutputFormat::Csv) { "," } else { "\t" };
            match spectrum {
                Signal::Real(_) => writeln!(w, "{}", ["epoch", "channel", "frequency", "power"].join(sep))?,
                Signal::Complex(_) => writeln!(w, "{}", ["epoch", "channel", "frequency", "re", "im"].join(sep))?,
            }
            match spectrum {
                Signal::Real(p) => {
                    for (i, lane) in p.lanes(last).into_iter().enumerate() {
                        let (epoch, channel) = lane_label(lead, i);
                        let name = channel_name(&results.channels, channel);
                        for (f, v) in freqs.iter().zip(lane.iter()) {
                            writeln!(w, "{}{sep}{}{sep}{}{sep}{}", epoch_field(epoch), name, f, v)?;
                        }
                    }
                }
                Signal::Complex(c) => {
                    for (i, lane) in c.lanes(last).into_iter().enumerate() {
                        let (epoch, channel) = lane_label(lead, i);
                        let name = channel_name(&results.channels, channel);
                        for (f, v) in freqs.iter().zip(lane.iter()) {
                            writeln!(w, "{}{sep}{}{sep}{}{sep}{}{sep}{}", epoch_field(epoch), name, f, v.re, v.im)?;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Band parameters as one row per lane.
pub fn write_band_parameters<W: Write>(
    w: &mut W,
    bp: &BandParameters,
    channels: &[String],
    format: OutputFormat,
) -> Result<()> {
    let lead = bp.fcenter.shape().to_vec();
    let rows = bp
        .fcenter
        .iter()
        .zip(bp.nucenter.iter())
        .zip(bp.fmin.iter().zip(bp.numin.iter()))
        .zip(bp.fmax.iter().zip(bp.numax.iter()))
        .enumerate()
        .map(|(i, (((fc, nc), (fl, nl)), (fh, nh)))| {
            let (epoch, channel) = lane_label(&lead, i);
            (epoch, channel_name(channels, channel), [*fc, *fl, *fh], [*nc, *nl, *nh])
        });

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = rows
                .map(|(epoch, channel, bins, nus)| {
                    serde_json::json!({
                        "epoch": epoch,
                        "channel": channel,
                        "fcenter": bins[0],
                        "nucenter": nus[0],
                        "fmin": bins[1],
                        "numin": nus[1],
                        "fmax": bins[2],
                        "numax": nus[2],
                    })
                })
                .collect();
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv | OutputFormat::Text => {
            let sep = if matches!(format, OutputFormat::Csv) { "," } else { "\t" };
            writeln!(
                w,
                "{}",
                ["epoch", "channel", "fcenter", "nucenter", "fmin", "numin", "fmax", "numax"].join(sep)
            )?;
            for (epoch, channel, bins, nus) in rows {
                writeln!(
                    w,
                    "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
                    epoch_field(epoch),
                    channel,
                    bins[0],
                    nus[0],
                    bins[1],
                    nus[1],
                    bins[2],
                    nus[2]
                )?;
            }
        }
    }
    Ok(())
}

/// Human-readable run summary.
pub fn write_summary<W: Write>(w: &mut W, results: &PipelineResults) -> Result<()> {
    writeln!(w, "Spectral Pipeline Summary: {}", results.name)?;
    writeln!(w, "==========================")?;
    writeln!(w)?;
    writeln!(w, "Channels:     {}", results.channels.join(", "))?;
    if !results.missing.is_empty() {
        writeln!(w, "Missing:      {}", results.missing.join(", "))?;
    }
    writeln!(w, "Sample rate:  {}", results.sample_rate)?;
    writeln!(w, "Block shape:  {:?}", results.shape)?;
    writeln!(w, "Spectrum:     {:?} ({})", results.spectrum.spectrum.shape(), if results.spectrum.spectrum.is_complex() { "fourier" } else { "power" })?;
    let freqs = &results.spectrum.frequencies;
    if let (Some(first), Some(last)) = (freqs.iter().next(), freqs.iter().next_back()) {
        writeln!(w, "Frequencies:  {:.3} .. {:.3} Hz", first, last)?;
    }

    if let Some(means) = &results.envelope_mean {
        writeln!(w)?;
        writeln!(w, "Mean envelope:")?;
        for (name, m) in results.channels.iter().zip(means) {
            writeln!(w, "  {:<10} {:.6}", name, m)?;
        }
    }

    if let Some(bp) = &results.spectrum.band_parameters {
        writeln!(w)?;
        writeln!(w, "Band parameters (Hz):")?;
        let lead = bp.fcenter.shape().to_vec();
        for (i, ((nc, nl), nh)) in bp.nucenter.iter().zip(bp.numin.iter()).zip(bp.numax.iter()).enumerate() {
            let (epoch, channel) = lane_label(&lead, i);
            let label = match epoch {
                Some(e) => format!("{}[{}]", channel_name(&results.channels, channel), e),
                None => channel_name(&results.channels, channel).to_string(),
            };
            writeln!(w, "  {:<14} center {:>8.3}  1% {:>8.3}  99% {:>8.3}", label, nc, nl, nh)?;
        }
    }

    Ok(())
}

/// Print band table rows for the `bands` subcommand.
pub fn print_bands(format: OutputFormat) -> Result<()> {
    let bands = lib_types::CanonicalBand::ALL;
    match format {
        OutputFormat::Json => {
            let json: Vec<_> = bands
                .iter()
                .map(|b| serde_json::json!({ "name": b.name(), "spec": b.spec() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Csv => {
            println!("name,high_pass_hz,low_pass_hz,width_hz");
            for b in bands {
                let (lo, hi, width) = b.edges();
                println!("{},{},{},{}", b.name(), lo, hi, width);
            }
        }
        OutputFormat::Text => {
            println!("{:<12} {:>10} {:>10} {:>8}", "band", "high-pass", "low-pass", "width");
            for b in bands {
                let (lo, hi, width) = b.edges();
                println!("{:<12} {:>10.1} {:>10.1} {:>8.1}", b.name(), lo, hi, width);
            }
        }
    }
    Ok(())
}

/// Print taper and mask for the `mask` subcommand, one row per sample/bin.
pub fn print_mask(filter: &CosineFilter, sample_rate: Hertz, format: OutputFormat) -> Result<()> {
    let len = filter.len();
    let bin_hz = sample_rate.0 / len as f64;
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "samples": len,
                "sfreq": sample_rate.0,
                "window": filter.window,
                "mask": filter.mask,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Csv => {
            println!("index,frequency,window,mask");
            for (i, (win, m)) in filter.window.iter().zip(&filter.mask).enumerate() {
                println!("{},{},{},{}", i, i as f64 * bin_hz, win, m);
            }
        }
        OutputFormat::Text => {
            println!("{:>6} {:>12} {:>10} {:>10}", "index", "freq (Hz)", "window", "mask");
            for (i, (win, m)) in filter.window.iter().zip(&filter.mask).enumerate() {
                println!("{:>6} {:>12.4} {:>10.6} {:>10.6}", i, i as f64 * bin_hz, win, m);
            }
        }
    }
    Ok(())
}

fn channel_name(channels: &[String], index: usize) -> &str {
    channels.get(index).map_or("?", String::as_str)
}

/// Nest an n-dimensional array into JSON arrays, last axis innermost.
fn nested<A, F>(data: &ArrayD<A>, leaf: F) -> serde_json::Value
where
    A: Clone,
    F: Fn(&A) -> serde_json::Value + Copy,
{
    if data.ndim() == 0 {
        return data.iter().next().map_or(serde_json::Value::Null, leaf);
    }
    if data.ndim() == 1 {
        return serde_json::Value::Array(data.iter().map(leaf).collect());
    }
    serde_json::Value::Array(
        data.outer_iter()
            .map(|sub| nested(&sub.to_owned(), leaf))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_dsp::spectrum::SpectrumResult;
    use ndarray::{Array1, Array2};

    fn results() -> PipelineResults {
        let power = Array2::from_shape_fn((2, 3), |(c, k)| (c * 10 + k) as f64);
        let bp = BandParameters {
            fcenter: Array1::from(vec![1usize, 2]).into_dyn(),
            nucenter: Array1::from(vec![0.5, 1.0]).into_dyn(),
            fmin: Array1::from(vec![0usize, 0]).into_dyn(),
            numin: Array1::from(vec![0.0, 0.0]).into_dyn(),
            fmax: Array1::from(vec![2usize, 2]).into_dyn(),
            numax: Array1::from(vec![1.0, 1.0]).into_dyn(),
        };
        PipelineResults {
            name: "unit".into(),
            channels: vec!["Fz".into(), "Cz".into()],
            missing: vec!["Oz".into()],
            sample_rate: Hertz(3.0),
            shape: vec![2, 6],
            envelope_mean: None,
            spectrum: SpectrumResult {
                spectrum: Signal::real(power),
                frequencies: Array1::from(vec![0.0, 0.5, 1.0]),
                band_parameters: Some(bp),
            },
        }
    }

    #[test]
    fn test_lane_labels() {
        assert_eq!(lane_label(&[4], 3), (None, 3));
        assert_eq!(lane_label(&[3, 4], 9), (Some(2), 1));
    }

    #[test]
    fn test_spectrum_csv() {
        let mut buf = Vec::new();
        write_spectrum(&mut buf, &results(), OutputFormat::Csv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "epoch,channel,frequency,power");
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[4], "-,Cz,0,10");
    }

    #[test]
    fn test_spectrum_json() {
        let mut buf = Vec::new();
        write_spectrum(&mut buf, &results(), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["values"][1][2], 12.0);
        assert_eq!(json["complex"], false);
    }

    #[test]
    fn test_band_parameters_csv() {
        let r = results();
        let mut buf = Vec::new();
        write_band_parameters(&mut buf, r.spectrum.band_parameters.as_ref().unwrap(), &r.channels, OutputFormat::Csv)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(2), Some("-,Cz,2,1,0,0,2,1"));
    }

    #[test]
    fn test_summary_mentions_missing_channels() {
        let mut buf = Vec::new();
        write_summary(&mut buf, &results()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Missing:      Oz"));
        assert!(text.contains("Sample rate:  3 Hz"));
    }
}
