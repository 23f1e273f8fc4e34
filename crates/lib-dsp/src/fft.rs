//! FFT/IFFT operations using rustfft and realfft.
//!
//! This module provides a high-level wrapper around the planners with:
//! - Planner caching for repeated transforms
//! - Arbitrary transform lengths (recording blocks are rarely powers of two)
//! - Lane-wise transforms along one axis of an n-dimensional array, run in
//!   parallel over the independent lanes

use crate::error::{DspError, DspResult};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};
use num_complex::Complex64;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// FFT engine with cached planners.
pub struct FftEngine {
    /// Complex FFT planner.
    complex_planner: FftPlanner<f64>,

    /// Real FFT planner.
    real_planner: RealFftPlanner<f64>,
}

impl FftEngine {
    /// Create a new FFT engine.
    pub fn new() -> Self {
        Self {
            complex_planner: FftPlanner::new(),
            real_planner: RealFftPlanner::new(),
        }
    }

    /// Get a cached forward FFT plan.
    pub fn get_fft_forward(&mut self, len: usize) -> Arc<dyn Fft<f64>> {
        self.complex_planner.plan_fft_forward(len)
    }

    /// Get a cached inverse FFT plan.
    pub fn get_fft_inverse(&mut self, len: usize) -> Arc<dyn Fft<f64>> {
        self.complex_planner.plan_fft_inverse(len)
    }

    /// Get a cached real-to-complex plan.
    pub fn get_rfft_forward(&mut self, len: usize) -> Arc<dyn RealToComplex<f64>> {
        self.real_planner.plan_fft_forward(len)
    }

    /// Get a cached complex-to-real plan.
    pub fn get_rfft_inverse(&mut self, len: usize) -> Arc<dyn ComplexToReal<f64>> {
        self.real_planner.plan_fft_inverse(len)
    }

    /// Forward FFT of every lane along `axis`.
    pub fn fft_along(&mut self, data: ArrayViewD<'_, Complex64>, axis: Axis) -> ArrayD<Complex64> {
        let plan = self.get_fft_forward(data.len_of(axis));
        transform_lanes(data, axis, &plan, 1.0)
    }

    /// Normalized inverse FFT of every lane along `axis`.
    pub fn ifft_along(&mut self, data: ArrayViewD<'_, Complex64>, axis: Axis) -> ArrayD<Complex64> {
        let len = data.len_of(axis);
        let plan = self.get_fft_inverse(len);
        transform_lanes(data, axis, &plan, 1.0 / len as f64)
    }

    /// Real-to-complex FFT of every lane along `axis`; that axis shrinks to
    /// `N/2 + 1` bins.
    pub fn rfft_along(&mut self, data: ArrayViewD<'_, f64>, axis: Axis) -> DspResult<ArrayD<Complex64>> {
        let len = data.len_of(axis);
        let r2c = self.get_rfft_forward(len);

        let mut shape = data.shape().to_vec();
        shape[axis.index()] = len / 2 + 1;
        let mut out = ArrayD::<Complex64>::zeros(IxDyn(&shape));

        let status = Zip::from(out.lanes_mut(axis))
            .and(data.lanes(axis))
            .par_map_collect(|mut dst, src| -> Result<(), realfft::FftError> {
                let mut input = src.to_vec();
                let mut output = r2c.make_output_vec();
                r2c.process(&mut input, &mut output)?;
                dst.iter_mut().zip(output).for_each(|(d, v)| *d = v);
                Ok(())
            });
        collect_status(status)?;
        Ok(out)
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero the imaginary parts a real signal's DC and Nyquist bins cannot have.
pub(crate) fn drop_edge_imaginary(half: &mut [Complex64], output_len: usize) {
    if let Some(dc) = half.first_mut() {
        dc.im = 0.0;
    }
    if output_len % 2 == 0 {
        if let Some(nyquist) = half.last_mut() {
            nyquist.im = 0.0;
        }
    }
}

/// Reduce per-lane results, reporting the first realfft failure.
pub(crate) fn collect_status(status: ArrayD<Result<(), realfft::FftError>>) -> DspResult<()> {
    status
        .into_iter()
        .collect::<Result<(), _>>()
        .map_err(|e| DspError::NumericalInstability(e.to_string()))
}

fn transform_lanes(
    data: ArrayViewD<'_, Complex64>,
    axis: Axis,
    plan: &Arc<dyn Fft<f64>>,
    scale: f64,
) -> ArrayD<Complex64> {
    let mut out = data.to_owned();
    Zip::from(out.lanes_mut(axis)).par_for_each(|mut lane| {
        let mut buf = lane.to_vec();
        plan.process(&mut buf);
        lane.iter_mut().zip(buf).for_each(|(d, v)| *d = v * scale);
    });
    out
}
