//! Half-spectrum analysis and cumulative-energy band parameters.

use crate::error::{check_rate, DspError, DspResult};
use crate::fft::FftEngine;
use lib_types::{Hertz, Signal, SpectrumConfig, SpectrumKind};
use ndarray::{Array1, ArrayD, ArrayView1, ArrayViewD, Axis, Zip};

/// Cumulative-energy level defining the center frequency.
pub const CENTER_LEVEL: f64 = 0.5;
/// Cumulative-energy level defining the lower edge.
pub const LOW_LEVEL: f64 = 0.01;
/// Cumulative-energy level defining the upper edge.
pub const HIGH_LEVEL: f64 = 0.99;

/// Characteristic frequencies of every spectrum lane.
///
/// Indices are 0-based bins into the frequency vector; the `nu*` arrays hold
/// the matching frequencies in Hz. All arrays have the spectrum's shape
/// without the frequency axis.
#[derive(Clone, Debug, PartialEq)]
pub struct BandParameters {
    pub fcenter: ArrayD<usize>,
    pub nucenter: ArrayD<f64>,
    pub fmin: ArrayD<usize>,
    pub numin: ArrayD<f64>,
    pub fmax: ArrayD<usize>,
    pub numax: ArrayD<f64>,
}

const EMPTY_EPOCHS: DspError = DspError::InsufficientData { needed: 1, got: 0 };

/// Output of [`compute_spectrum`].
#[derive(Clone, Debug)]
pub struct SpectrumResult {
    /// Power (real) or Fourier coefficients (complex), frequency last.
    pub spectrum: Signal,
    /// Bin frequencies `k * Fs / T` for `k = 0..T/2`.
    pub frequencies: Array1<f64>,
    pub band_parameters: Option<BandParameters>,
}

/// Frequencies of the first `T/2` bins of a length-`T` transform.
pub fn half_spectrum_frequencies(len: usize, sample_rate: Hertz) -> Array1<f64> {
    Array1::from_shape_fn(len / 2, |k| k as f64 * sample_rate.0 / len as f64)
}

/// Spectrum of a 2-axis or 3-axis block along time.
pub fn compute_spectrum(signal: &Signal, sample_rate: Hertz, config: &SpectrumConfig) -> DspResult<SpectrumResult> {
    let Some(layout) = signal.layout() else {
        return Err(DspError::AxisCount {
            expected: "2 or 3",
            actual: signal.ndim(),
        });
    };
    check_rate(sample_rate)?;

    let len = layout.samples();
    if len < 2 {
        return Err(DspError::InsufficientData { needed: 2, got: len });
    }
    let half = len / 2;
    let time = Axis(signal.ndim() - 1);
    let mut engine = FftEngine::new();

    let coefficients = match signal {
        Signal::Real(data) => engine.rfft_along(data.view(), time)?,
        Signal::Complex(data) => engine.fft_along(data.view(), time),
    };
    let coefficients = coefficients.slice_axis(time, (0..half).into()).to_owned();

    let average = config.average && signal.ndim() == 3;
    if config.average && !average {
        tracing::debug!("Averaging ignored for continuous block");
    }

    let spectrum = match config.kind {
        SpectrumKind::Power => {
            let power = coefficients.mapv(|c| c.norm_sqr());
            if average {
                Signal::real(power.mean_axis(Axis(0)).ok_or(EMPTY_EPOCHS)?)
            } else {
                Signal::real(power)
            }
        }
        SpectrumKind::Fourier => {
            if average {
                tracing::warn!("Averaging Fourier coefficients across epochs");
                let mean = coefficients.mean_axis(Axis(0)).ok_or(EMPTY_EPOCHS)?;
                Signal::complex(mean)
            } else {
                Signal::complex(coefficients)
            }
        }
    };

    let frequencies = half_spectrum_frequencies(len, sample_rate);
    let band_parameters = if config.band_parameters {
        let power = match &spectrum {
            Signal::Real(p) => p.clone(),
            Signal::Complex(c) => c.mapv(|v| v.norm_sqr()),
        };
        Some(band_parameters(power.view(), frequencies.view())?)
    } else {
        None
    };

    Ok(SpectrumResult {
        spectrum,
        frequencies,
        band_parameters,
    })
}

/// Band parameters of a power-like array with frequency as the last axis.
///
/// Lanes without energy report bin 0.
pub fn band_parameters(power: ArrayViewD<'_, f64>, frequencies: ArrayView1<'_, f64>) -> DspResult<BandParameters> {
    let Some(last) = power.ndim().checked_sub(1) else {
        return Err(DspError::AxisCount {
            expected: "at least 1",
            actual: 0,
        });
    };
    let freq_axis = Axis(last);
    if power.len_of(freq_axis) != frequencies.len() {
        return Err(DspError::LengthMismatch {
            what: "frequency vector",
            expected: power.len_of(freq_axis),
            actual: frequencies.len(),
        });
    }

    let levels = Zip::from(power.lanes(freq_axis)).par_map_collect(crossing_bins);
    let fcenter = levels.mapv(|l| l[0]);
    let fmin = levels.mapv(|l| l[1]);
    let fmax = levels.mapv(|l| l[2]);

    Ok(BandParameters {
        nucenter: fcenter.mapv(|i| frequencies[i]),
        numin: fmin.mapv(|i| frequencies[i]),
        numax: fmax.mapv(|i| frequencies[i]),
        fcenter,
        fmin,
        fmax,
    })
}

/// Bins where normalized cumulative energy is closest to the center, low and
/// high levels. Ties go to the lower bin.
fn crossing_bins(power: ArrayView1<'_, f64>) -> [usize; 3] {
    let total: f64 = power.sum();
    if total <= 0.0 || !total.is_finite() {
        return [0; 3];
    }
    let targets = [CENTER_LEVEL, LOW_LEVEL, HIGH_LEVEL];
    let mut best = [(0usize, f64::INFINITY); 3];
    let mut cumulative = 0.0;
    for (bin, p) in power.iter().enumerate() {
        cumulative += p / total;
        for (slot, target) in best.iter_mut().zip(targets) {
            let distance = (cumulative - target).abs();
            if distance < slot.1 {
                *slot = (bin, distance);
            }
        }
    }
    best.map(|(bin, _)| bin)
}
