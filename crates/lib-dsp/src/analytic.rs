//! Analytic-signal transform.
//!
//! The analytic signal keeps the non-negative half of the spectrum: the DC
//! bin (and the Nyquist bin for even lengths) unscaled, strictly positive
//! bins doubled and negative bins zeroed. Its real part reproduces the input
//! and its imaginary part is the Hilbert quadrature.

use crate::error::{DspError, DspResult};
use crate::fft::FftEngine;
use lib_types::Signal;
use ndarray::{ArrayD, ArrayViewD, Axis, Zip};
use num_complex::Complex64;

/// Spectral weights turning a length-`n` spectrum into its analytic form.
pub fn analytic_weights(n: usize) -> Vec<f64> {
    let mut h = vec![0.0; n];
    if n == 0 {
        return h;
    }
    h[0] = 1.0;
    let half = n / 2;
    if n % 2 == 0 {
        h[1..half].iter_mut().for_each(|w| *w = 2.0);
        h[half] = 1.0;
    } else {
        h[1..=half].iter_mut().for_each(|w| *w = 2.0);
    }
    h
}

/// Analytic signal along `axis` of a real array.
pub fn analytic_along(data: ArrayViewD<'_, f64>, axis: Axis) -> DspResult<ArrayD<Complex64>> {
    if axis.index() >= data.ndim() {
        return Err(DspError::InvalidConfig(format!(
            "axis {} out of range for {}-axis input",
            axis.index(),
            data.ndim()
        )));
    }
    let n = data.len_of(axis);
    match n {
        0 => return Err(DspError::InsufficientData { needed: 2, got: 0 }),
        1 => return Err(DspError::DegenerateAxis { axis: axis.index() }),
        _ => {}
    }

    let mut engine = FftEngine::new();
    let forward = engine.get_fft_forward(n);
    let inverse = engine.get_fft_inverse(n);
    let weights = analytic_weights(n);
    let scale = 1.0 / n as f64;

    let mut out = data.mapv(|v| Complex64::new(v, 0.0));
    Zip::from(out.lanes_mut(axis)).par_for_each(|mut lane| {
        let mut buf = lane.to_vec();
        forward.process(&mut buf);
        buf.iter_mut().zip(&weights).for_each(|(b, &w)| *b *= w);
        inverse.process(&mut buf);
        lane.iter_mut().zip(buf).for_each(|(d, v)| *d = v * scale);
    });
    Ok(out)
}

/// Analytic signal of `signal` along `axis` (default: the last axis).
///
/// Complex input is reduced to its real part with a warning. The output has
/// the input's shape and axis order.
pub fn analytic_signal(signal: &Signal, axis: Option<usize>) -> DspResult<ArrayD<Complex64>> {
    if signal.ndim() == 0 {
        return Err(DspError::AxisCount {
            expected: "at least 1",
            actual: 0,
        });
    }
    let axis = Axis(axis.unwrap_or(signal.ndim() - 1));

    match signal {
        Signal::Real(data) => analytic_along(data.view(), axis),
        Signal::Complex(_) => {
            tracing::warn!("Analytic transform of complex input, imaginary part dropped");
            let real = signal.real_part();
            analytic_along(real.view(), axis)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, Array3};
    use std::f64::consts::PI;

    #[test]
    fn test_weights_even_and_odd() {
        assert_eq!(analytic_weights(6), vec![1.0, 2.0, 2.0, 1.0, 0.0, 0.0]);
        assert_eq!(analytic_weights(5), vec![1.0, 2.0, 2.0, 0.0, 0.0]);
        assert_eq!(analytic_weights(2), vec![1.0, 1.0]);
    }

    #[test]
    fn test_cosine_becomes_unit_phasor() {
        let n = 128;
        let k = 5.0;
        let x = Array1::from_shape_fn(n, |t| (2.0 * PI * k * t as f64 / n as f64).cos());
        let z = analytic_signal(&Signal::real(x.clone()), None).unwrap();

        for (t, (zt, xt)) in z.iter().zip(x.iter()).enumerate() {
            assert!((zt.re - xt).abs() < 1e-10);
            assert!((zt.norm() - 1.0).abs() < 1e-10);
            let expected = (2.0 * PI * k * t as f64 / n as f64).sin();
            assert!((zt.im - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_real_part_preserved_odd_length() {
        let x = Array2::from_shape_fn((3, 37), |(c, t)| ((c + 1) as f64 * t as f64 * 0.37).sin() + c as f64);
        let z = analytic_signal(&Signal::real(x.clone()), None).unwrap();
        assert_eq!(z.shape(), x.shape());
        for (a, b) in z.iter().zip(x.iter()) {
            assert!((a.re - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_non_default_axis_keeps_order() {
        let n = 64;
        let x = Array3::from_shape_fn((2, n, 3), |(_, t, _)| (2.0 * PI * 4.0 * t as f64 / n as f64).cos());
        let z = analytic_signal(&Signal::real(x), Some(1)).unwrap();
        assert_eq!(z.shape(), &[2, n, 3]);
        for v in z.iter() {
            assert!((v.norm() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_rejects_degenerate_and_out_of_range_axis() {
        let x = Signal::real(Array2::<f64>::zeros((4, 1)));
        assert!(matches!(analytic_signal(&x, None), Err(DspError::DegenerateAxis { axis: 1 })));
        assert!(matches!(analytic_signal(&x, Some(2)), Err(DspError::InvalidConfig(_))));
    }

    #[test]
    fn test_complex_input_uses_real_part() {
        let x = Array1::from_shape_fn(16, |t| (t as f64 * 0.5).cos());
        let c = x.mapv(|v| Complex64::new(v, 7.0));
        let a = analytic_signal(&Signal::real(x), None).unwrap();
        let b = analytic_signal(&Signal::complex(c), None).unwrap();
        for (p, q) in a.iter().zip(b.iter()) {
            assert!((p - q).norm() < 1e-12);
        }
    }
}
