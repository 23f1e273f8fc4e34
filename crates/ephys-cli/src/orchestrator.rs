//! Pipeline orchestration.

use crate::config::{load_recording, PipelineConfig, Segment};
use anyhow::{Context, Result};
use lib_dsp::analytic::analytic_signal;
use lib_dsp::downsample::downsample;
use lib_dsp::modulation::slow_modulation;
use lib_dsp::preprocess::{PreprocessConfig, Preprocessor};
use lib_dsp::spectrum::{compute_spectrum, SpectrumResult};
use lib_types::{Hertz, SampleSource, Signal};
use ndarray::{Array1, Array2, Axis};

/// Everything a pipeline run produces.
#[derive(Debug)]
pub struct PipelineResults {
    pub name: String,
    /// Channels actually found, in output order.
    pub channels: Vec<String>,
    /// Requested channels missing from the recording.
    pub missing: Vec<String>,
    /// Rate of the analysed block after downsampling.
    pub sample_rate: Hertz,
    /// Shape of the analysed block.
    pub shape: Vec<usize>,
    /// Mean envelope amplitude per channel, when the envelope stage ran.
    pub envelope_mean: Option<Vec<f64>>,
    pub spectrum: SpectrumResult,
}

/// Pipeline orchestrator.
pub struct Orchestrator {
    config: PipelineConfig,
    preprocessor: Preprocessor,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let preprocess = PreprocessConfig {
            channels: config.channels.clone(),
            filter: config.filter.request()?,
            baseline: config.baseline,
        };
        Ok(Self {
            preprocessor: Preprocessor::new(preprocess),
            config,
        })
    }

    /// Load the configured recording and run the pipeline on it.
    pub fn run(&self) -> Result<PipelineResults> {
        tracing::info!("Loading recording from {:?}", self.config.recording);
        let source = load_recording(&self.config.recording)?;
        self.run_on(&source)
    }

    /// Run the pipeline on an already opened recording.
    pub fn run_on<S: SampleSource + ?Sized>(&self, source: &S) -> Result<PipelineResults> {
        tracing::info!("Starting pipeline: {}", self.config.name);

        let sample_rate = source.sample_rate();
        let times = self.sample_times(source)?;

        let pre = self
            .preprocessor
            .run(source, times.view())
            .context("Preprocessing failed")?
            .with_context(|| format!("None of the channels {:?} found in recording", self.config.channels))?;
        tracing::info!("Preprocessed block of shape {:?}", pre.signal.shape());

        let missing = self
            .config
            .channels
            .iter()
            .enumerate()
            .filter(|(i, _)| !pre.selection.requested_positions.contains(i))
            .map(|(_, name)| name.clone())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            tracing::warn!("Channels not found in recording: {:?}", missing);
        }

        let (block, rate) = match &self.config.downsample {
            Some(ds) => {
                let out = downsample(pre.signal.view(), sample_rate, ds.rate, ds.mode).context("Downsampling failed")?;
                tracing::info!("Downsampled to {} ({} samples)", out.effective_rate, out.sample_indices.len());
                (out.signal, out.effective_rate)
            }
            None => (pre.signal, sample_rate),
        };

        let mut envelope_mean = None;
        let analysed = match &self.config.envelope {
            Some(envelope) => {
                let analytic = analytic_signal(&Signal::real(block), None).context("Analytic transform failed")?;
                envelope_mean = Some(channel_means(&analytic.mapv(|z| z.norm()))?);
                let analytic = Signal::complex(analytic);
                match envelope.carrier {
                    Some(carrier) => slow_modulation(&analytic, carrier).context("Demodulation failed")?,
                    None => analytic,
                }
            }
            None => Signal::real(block),
        };

        let shape = analysed.shape().to_vec();
        let spectrum = compute_spectrum(&analysed, rate, &self.config.spectrum).context("Spectrum failed")?;

        tracing::info!("Pipeline complete");
        Ok(PipelineResults {
            name: self.config.name.clone(),
            channels: pre.selection.names,
            missing,
            sample_rate: rate,
            shape,
            envelope_mean,
            spectrum,
        })
    }

    /// Times (seconds) of the samples to cut, one row per segment.
    ///
    /// Times sit half a sample past each sample instant so the floor in the
    /// index mapping always lands on the intended sample.
    fn sample_times<S: SampleSource + ?Sized>(&self, source: &S) -> Result<Array2<f64>> {
        let fs = source.sample_rate().0;
        if self.config.segments.is_empty() {
            let first = source.first_sample();
            return Ok(segment_row(first, source.samples(), fs).insert_axis(Axis(0)));
        }

        let rows: Vec<Array1<f64>> = self
            .config
            .segments
            .iter()
            .map(|Segment { start, duration }| {
                let first = (start.0 * fs).round() as usize;
                let len = (duration.0 * fs).round() as usize;
                segment_row(first, len, fs)
            })
            .collect();
        let len = rows.first().map_or(0, Array1::len);
        if len == 0 {
            anyhow::bail!("Segments shorter than one sample at {} Hz", fs);
        }
        let mut times = Array2::<f64>::zeros((rows.len(), len));
        for (mut dst, row) in times.rows_mut().into_iter().zip(&rows) {
            dst.assign(row);
        }
        Ok(times)
    }
}

fn segment_row(first: usize, len: usize, fs: f64) -> Array1<f64> {
    Array1::from_shape_fn(len, |i| (first + i) as f64 / fs + 0.5 / fs)
}

/// Mean over every axis but the channel axis (second to last).
fn channel_means(data: &ndarray::ArrayD<f64>) -> Result<Vec<f64>> {
    let mut reduced = data.clone();
    while reduced.ndim() > 1 {
        let axis = if reduced.ndim() == 2 { Axis(1) } else { Axis(0) };
        reduced = reduced.mean_axis(axis).context("Empty block")?;
    }
    Ok(reduced.iter().copied().collect())
}
