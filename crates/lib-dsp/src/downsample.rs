//! Integer-ratio downsampling by buffer averaging or sample picking.
//!
//! The ratio `N = sfreq / target` must be a whole number of samples. A
//! non-integer ratio is rounded with a warning, and the effective rate is
//! reported back.

use crate::error::{check_rate, DspError, DspResult};
use lib_types::{DownsampleMode, Hertz};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};

/// Ratio tolerance below which `sfreq / target` counts as an integer.
const INTEGER_TOLERANCE: f64 = 1e-9;

/// Result of [`downsample`].
#[derive(Clone, Debug, PartialEq)]
pub struct Downsampled {
    /// Block with the time axis shortened to the number of buffers.
    pub signal: ArrayD<f64>,
    /// Original sample index each output sample stands for.
    pub sample_indices: Vec<usize>,
    /// `sfreq / N` after rounding.
    pub effective_rate: Hertz,
}

/// Buffer layout shared by both modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Buffers {
    len: usize,
    step: usize,
    count: usize,
}

impl Buffers {
    fn start(&self, k: usize) -> usize {
        k * self.step
    }

    /// `round(N/2)` with ties to even, past the buffer start.
    fn center(&self, k: usize) -> usize {
        (self.len as f64 / 2.0).round_ties_even() as usize + self.start(k)
    }
}

/// Downsample a 2-axis or 3-axis real block along time.
pub fn downsample(
    data: ArrayViewD<'_, f64>,
    sample_rate: Hertz,
    target_rate: Hertz,
    mode: DownsampleMode,
) -> DspResult<Downsampled> {
    if !matches!(data.ndim(), 2 | 3) {
        return Err(DspError::AxisCount {
            expected: "2 or 3",
            actual: data.ndim(),
        });
    }
    check_rate(sample_rate)?;
    check_rate(target_rate)?;

    let time = Axis(data.ndim() - 1);
    let samples = data.len_of(time);

    let exact = sample_rate.0 / target_rate.0;
    let ratio = exact.round();
    if (exact - ratio).abs() > INTEGER_TOLERANCE {
        tracing::warn!(
            ratio = exact,
            effective_rate = sample_rate.0 / ratio,
            "Downsampling ratio is not an integer, rounding"
        );
    }
    if ratio < 1.0 {
        return Err(DspError::InvalidConfig(format!(
            "target rate {} exceeds sampling rate {}",
            target_rate, sample_rate
        )));
    }
    let len = ratio as usize;
    if len > samples {
        return Err(DspError::InsufficientData {
            needed: len,
            got: samples,
        });
    }

    let overlap = match mode {
        DownsampleMode::Smooth { overlap } => {
            if overlap == 0 || overlap > samples {
                return Err(DspError::InvalidConfig(format!(
                    "overlap must be in 1..={samples}, got {overlap}"
                )));
            }
            if overlap >= len {
                1
            } else {
                overlap
            }
        }
        DownsampleMode::Pick => 1,
    };
    let step = len / overlap;
    let buffers = Buffers {
        len,
        step,
        count: (samples - len) / step + 1,
    };
    let sample_indices: Vec<usize> = (0..buffers.count).map(|k| buffers.center(k)).collect();

    tracing::debug!(?buffers, ?mode, "Downsampling");

    let mut shape = data.shape().to_vec();
    shape[time.index()] = buffers.count;
    let mut out = ArrayD::<f64>::zeros(IxDyn(&shape));

    Zip::from(out.lanes_mut(time))
        .and(data.lanes(time))
        .par_for_each(|mut dst, src| match mode {
            DownsampleMode::Pick => {
                for (d, &t) in dst.iter_mut().zip(&sample_indices) {
                    *d = src[t];
                }
            }
            DownsampleMode::Smooth { .. } => {
                for (k, d) in dst.iter_mut().enumerate() {
                    let start = buffers.start(k);
                    let window = src.slice(ndarray::s![start..start + buffers.len]);
                    *d = window.sum() / buffers.len as f64;
                }
            }
        });

    Ok(Downsampled {
        signal: out,
        sample_indices,
        effective_rate: Hertz(sample_rate.0 / ratio),
    })
}
