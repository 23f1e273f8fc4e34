//! FFT-based band filtering of signal blocks.
//!
//! Every channel of every epoch is an independent filtering unit: the taper
//! is applied along time, the lane is transformed, multiplied by the cosine
//! mask and transformed back. No state crosses epoch or channel boundaries,
//! so lanes are processed in parallel.

use crate::cosine::{prepare_cosine_filter, CosineFilter};
use crate::error::{check_rate, DspError, DspResult};
use crate::fft::{collect_status, drop_edge_imaginary, FftEngine};
use lib_types::{BandSpec, FilterRequest, Hertz, Signal};
use ndarray::{ArrayD, ArrayViewD, Axis, Zip};
use realfft::{ComplexToReal, RealToComplex};
use std::borrow::Cow;
use std::sync::Arc;

/// A cosine filter bound to one block length, with cached transform plans.
pub struct SpectralFilter {
    design: CosineFilter,
    forward: Arc<dyn RealToComplex<f64>>,
    inverse: Arc<dyn ComplexToReal<f64>>,
}

impl SpectralFilter {
    /// Design the filter for blocks of `len` samples at `sample_rate`.
    pub fn new(spec: &BandSpec, len: usize, sample_rate: Hertz) -> DspResult<Self> {
        let design = prepare_cosine_filter(spec, len, sample_rate)?;
        let mut engine = FftEngine::new();
        Ok(Self {
            forward: engine.get_rfft_forward(len),
            inverse: engine.get_rfft_inverse(len),
            design,
        })
    }

    /// The taper and mask in use.
    pub fn design(&self) -> &CosineFilter {
        &self.design
    }

    /// Block length this filter accepts.
    pub fn len(&self) -> usize {
        self.design.len()
    }

    pub fn is_empty(&self) -> bool {
        self.design.is_empty()
    }

    /// Filter every lane along the last axis of `data`.
    pub fn apply(&self, data: ArrayViewD<'_, f64>) -> DspResult<ArrayD<f64>> {
        if data.ndim() == 0 {
            return Err(DspError::AxisCount {
                expected: "at least 1",
                actual: 0,
            });
        }
        let axis = Axis(data.ndim() - 1);
        let len = data.len_of(axis);
        if len != self.len() {
            return Err(DspError::LengthMismatch {
                what: "time axis",
                expected: self.len(),
                actual: len,
            });
        }

        let window = &self.design.window;
        let half_mask = self.design.half_mask();
        let mut out = ArrayD::<f64>::zeros(data.raw_dim());

        let status = Zip::from(out.lanes_mut(axis))
            .and(data.lanes(axis))
            .par_map_collect(|mut dst, src| -> Result<(), realfft::FftError> {
                let mut tapered: Vec<f64> = src.iter().zip(window).map(|(x, w)| x * w).collect();
                let mut spectrum = self.forward.make_output_vec();
                self.forward.process(&mut tapered, &mut spectrum)?;

                spectrum
                    .iter_mut()
                    .zip(half_mask)
                    .for_each(|(bin, &m)| *bin *= m);
                drop_edge_imaginary(&mut spectrum, len);

                let mut filtered = self.inverse.make_output_vec();
                self.inverse.process(&mut spectrum, &mut filtered)?;

                let scale = 1.0 / len as f64;
                dst.iter_mut()
                    .zip(filtered)
                    .for_each(|(d, v)| *d = v * scale);
                Ok(())
            });
        collect_status(status)?;

        Ok(out)
    }
}

/// Filter a 2-axis `(channel, time)` or 3-axis `(epoch, channel, time)` block.
///
/// The `none` request returns an identical copy of the input, complex or
/// not. Any other request yields a real block of the input's shape: complex
/// input is reduced to its real part first, which with a real mirrored mask
/// equals the real part of the filtered complex signal.
pub fn filter_signal(signal: &Signal, sample_rate: Hertz, request: &FilterRequest) -> DspResult<Signal> {
    if signal.layout().is_none() {
        return Err(DspError::AxisCount {
            expected: "2 or 3",
            actual: signal.ndim(),
        });
    }
    check_rate(sample_rate)?;

    let Some(spec) = request.resolve() else {
        tracing::warn!("No filter applied, copying data");
        return Ok(signal.clone());
    };

    let data = match signal {
        Signal::Real(data) => Cow::Borrowed(data),
        Signal::Complex(_) => {
            tracing::warn!("Filtering complex input, imaginary part dropped");
            Cow::Owned(signal.real_part())
        }
    };

    tracing::debug!(shape = ?signal.shape(), subbands = spec.len(), "Filtering block");

    let filter = SpectralFilter::new(&spec, signal.time_len(), sample_rate)?;
    Ok(Signal::Real(filter.apply(data.view())?))
}
