//! Pipeline configuration and recording loading.

use anyhow::{Context, Result};
use lib_types::{BandSpec, DownsampleMode, FilterRequest, Hertz, MemorySource, Seconds, SpectrumConfig};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run name, repeated in the summary.
    pub name: String,

    /// Path to the recording JSON file. Relative paths resolve against the
    /// configuration file's directory.
    pub recording: PathBuf,

    /// Channels to analyse, in output order.
    pub channels: Vec<String>,

    /// Stretches of the recording to cut. Empty means the whole recording;
    /// one segment gives a continuous block, several give epochs.
    #[serde(default)]
    pub segments: Vec<Segment>,

    /// Band filter: `"none"`, a canonical band name, or a full band spec.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Remove per-segment or per-epoch means after filtering.
    #[serde(default)]
    pub baseline: bool,

    #[serde(default)]
    pub downsample: Option<DownsampleConfig>,

    /// Replace the block by its analytic envelope before the spectrum.
    #[serde(default)]
    pub envelope: Option<EnvelopeConfig>,

    #[serde(default)]
    pub spectrum: SpectrumConfig,
}

/// One stretch of the recording.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Seconds,
    pub duration: Seconds,
}

/// Filter selection as written in configuration files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterConfig {
    Named(String),
    Custom(BandSpec),
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::Named("none".into())
    }
}

impl FilterConfig {
    pub fn request(&self) -> Result<FilterRequest> {
        match self {
            Self::Named(name) => name
                .parse()
                .with_context(|| format!("Invalid filter {:?}", name)),
            Self::Custom(spec) => Ok(FilterRequest::Custom(spec.clone())),
        }
    }
}

/// Downsampling stage.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DownsampleConfig {
    /// Target rate in Hz.
    pub rate: Hertz,

    #[serde(default)]
    pub mode: DownsampleMode,
}

/// Analytic envelope stage.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct EnvelopeConfig {
    /// 1-based carrier bin to demodulate; the analytic signal is kept as is
    /// when absent.
    #[serde(default)]
    pub carrier: Option<usize>,
}

/// Recording file layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordingFile {
    pub sfreq: f64,
    pub channels: Vec<String>,
    /// One row per channel.
    pub data: Vec<Vec<f64>>,
    #[serde(default)]
    pub first_sample: usize,
}

impl RecordingFile {
    /// Validate the layout and move it into an in-memory source.
    pub fn into_source(self) -> Result<MemorySource> {
        let rows = self.data.len();
        let cols = self.data.first().map_or(0, Vec::len);
        if let Some((i, row)) = self.data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            anyhow::bail!(
                "Recording row {} has {} samples, expected {}",
                i,
                row.len(),
                cols
            );
        }
        let flat: Vec<f64> = self.data.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((rows, cols), flat).context("Recording data is not rectangular")?;
        let source = MemorySource::new(Hertz(self.sfreq), self.channels, data)
            .context("Invalid recording")?
            .with_first_sample(self.first_sample);
        Ok(source)
    }
}

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: PipelineConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if config.recording.is_relative() {
        if let Some(dir) = path.parent() {
            config.recording = dir.join(&config.recording);
        }
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load a recording JSON file.
pub fn load_recording(path: &Path) -> Result<MemorySource> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recording: {:?}", path))?;
    let file: RecordingFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse recording: {:?}", path))?;
    file.into_source()
}

/// Validate configuration.
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    if !config.recording.exists() {
        anyhow::bail!("Recording file not found: {:?}", config.recording);
    }

    if config.channels.is_empty() {
        anyhow::bail!("No channels requested");
    }

    config.filter.request()?;

    let mut lengths = config.segments.iter().map(|s| s.duration.0);
    if let Some(first) = lengths.next() {
        if config.segments.iter().any(|s| !(s.duration.0 > 0.0) || s.start.0 < 0.0) {
            anyhow::bail!("Segments need a non-negative start and a positive duration");
        }
        if lengths.any(|d| (d - first).abs() > 1e-12) {
            anyhow::bail!("All segments must have the same duration to form epochs");
        }
    }

    if let Some(ds) = &config.downsample {
        if !ds.rate.is_valid_rate() {
            anyhow::bail!("Downsampling rate must be positive, got {}", ds.rate);
        }
        if let DownsampleMode::Smooth { overlap: 0 } = ds.mode {
            anyhow::bail!("Downsampling overlap must be at least 1");
        }
    }

    if let Some(EnvelopeConfig { carrier: Some(0) }) = config.envelope {
        anyhow::bail!("Carrier bins are 1-based");
    }

    Ok(())
}
