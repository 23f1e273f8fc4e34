//! Cosine-tapered spectral masks.
//!
//! A band specification is turned into a real frequency-domain multiplier of
//! the same length as the block. Each sub-band contributes a mask that is
//! flat outside its transition band and follows a squared cosine (or sine)
//! inside it; the masks are multiplied together so cascaded constraints
//! compose without renormalization.
//!
//! Frequencies are first normalized to cycles per block (`f / Fs * 2`). For a
//! block of `N` samples the transition band of a sub-band with normalized
//! center `f` and width `w` covers the fractional bin positions
//!
//! ```text
//! flow  = N * (f - w/2) / 2
//! fhigh = N * (f + w/2) / 2
//! ```
//!
//! Bins are counted from zero, so the transition covers bins `b` with
//! `flow <= b <= fhigh` at phase `(b - flow) / (fhigh - flow)`; in one-based
//! counting that is bins `ceil(flow) + 1 ..= floor(fhigh) + 1` at `b - flow - 1`.
//!
//! Only the first half of the spectrum (up to and including Nyquist) is
//! computed; the rest is its mirror image around Nyquist so that the mask
//! applied to a real signal's spectrum yields a real signal.

use crate::error::{check_rate, DspError, DspResult};
use crate::window::taper;
use lib_types::{BandSpec, FilterShape, Hertz};
use std::f64::consts::FRAC_PI_2;

/// Taper and mask for one block length and sampling rate.
#[derive(Clone, Debug, PartialEq)]
pub struct CosineFilter {
    /// Time-domain taper, one weight per sample.
    pub window: Vec<f64>,

    /// Frequency-domain multiplier, one value per FFT bin.
    pub mask: Vec<f64>,
}

impl CosineFilter {
    /// Number of samples the filter was designed for.
    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Non-redundant part of the mask, `N/2 + 1` bins, for real transforms.
    pub fn half_mask(&self) -> &[f64] {
        &self.mask[..self.mask.len() / 2 + 1]
    }
}

/// Build the taper and the mask for a block of `len` samples at `sample_rate`.
pub fn prepare_cosine_filter(spec: &BandSpec, len: usize, sample_rate: Hertz) -> DspResult<CosineFilter> {
    check_rate(sample_rate)?;
    if len < 2 {
        return Err(DspError::InsufficientData { needed: 2, got: len });
    }

    let window = taper(spec.window, len);
    let mut mask = vec![1.0; len];

    for band in spec.bands() {
        let freq = band.freq.normalized(sample_rate);
        let width = band.width.normalized(sample_rate);
        if !(width > 0.0 && width.is_finite()) {
            return Err(DspError::InvalidConfig(format!(
                "transition width of the {} sub-band at {} must be positive",
                band.shape, band.freq
            )));
        }
        let sub = subband_mask(band.shape, freq, width, len);
        mask.iter_mut().zip(sub).for_each(|(m, s)| *m *= s);
    }

    tracing::debug!(
        len,
        sample_rate = sample_rate.0,
        subbands = spec.len(),
        "Prepared cosine filter"
    );

    Ok(CosineFilter { window, mask })
}

/// Mask of a single sub-band over `len` bins.
///
/// `freq` and `width` are on the normalized `[0, 2)` scale, `width > 0`.
pub fn subband_mask(shape: FilterShape, freq: f64, width: f64, len: usize) -> Vec<f64> {
    let n = len as f64;
    let flow = n * (freq - width / 2.0) / 2.0;
    let fhigh = n * (freq + width / 2.0) / 2.0;
    let span = fhigh - flow;

    // First index of the mirrored half: ceil((N + 1) / 2)
    let split = (len + 2) / 2;
    let mut mult = vec![1.0; len];

    for (bin, m) in mult.iter_mut().enumerate().take(split) {
        let pos = bin as f64;
        let below = pos < flow;
        let above = pos > fhigh;
        let phase = (pos - flow) / span;

        *m = match shape {
            FilterShape::Low if below => 1.0,
            FilterShape::Low if above => 0.0,
            FilterShape::Low => (phase * FRAC_PI_2).cos().powi(2),
            FilterShape::High if below => 0.0,
            FilterShape::High if above => 1.0,
            FilterShape::High => (phase * FRAC_PI_2).sin().powi(2),
            FilterShape::Notch if below || above => 1.0,
            FilterShape::Notch => (phase * 2.0 * FRAC_PI_2).cos().powi(2),
        };
    }

    for bin in split..len {
        mult[bin] = mult[len - bin];
    }

    mult
}
