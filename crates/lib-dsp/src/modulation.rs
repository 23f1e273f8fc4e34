//! Carrier demodulation.

use crate::analytic::analytic_along;
use crate::error::{DspError, DspResult};
use lib_types::Signal;
use ndarray::{Array1, ArrayD, Axis, Zip};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Unit phasor `exp(2πi (fcenter-1) t / T)` for `t = 0..T`.
pub fn carrier(fcenter: usize, len: usize) -> Array1<Complex64> {
    let k = fcenter.saturating_sub(1) as f64;
    Array1::from_shape_fn(len, |t| {
        Complex64::from_polar(1.0, 2.0 * PI * k * t as f64 / len as f64)
    })
}

/// Remove the carrier at 1-based bin `fcenter` and keep the slow modulation.
///
/// Real input is made analytic along time first and the real part of the
/// demodulated signal is returned; complex input is treated as analytic
/// already and stays complex.
pub fn slow_modulation(signal: &Signal, fcenter: usize) -> DspResult<Signal> {
    if !matches!(signal.ndim(), 2 | 3) {
        return Err(DspError::AxisCount {
            expected: "2 or 3",
            actual: signal.ndim(),
        });
    }
    let len = signal.time_len();
    if fcenter == 0 || fcenter > len {
        return Err(DspError::IndexOutOfRange {
            name: "fcenter",
            index: fcenter,
            max: len,
        });
    }

    let time = Axis(signal.ndim() - 1);
    let wave = carrier(fcenter, len);

    match signal {
        Signal::Real(data) => {
            let analytic = analytic_along(data.view(), time)?;
            let slow = demodulate(analytic, &wave, time);
            Ok(Signal::real(slow.mapv(|c| c.re)))
        }
        Signal::Complex(data) => Ok(Signal::complex(demodulate(data.clone(), &wave, time))),
    }
}

fn demodulate(mut data: ArrayD<Complex64>, wave: &Array1<Complex64>, time: Axis) -> ArrayD<Complex64> {
    Zip::from(data.lanes_mut(time)).par_for_each(|mut lane| {
        lane.iter_mut().zip(wave).for_each(|(z, w)| *z /= w);
    });
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_removes_literal_carrier() {
        let len = 200;
        let fcenter = 12;
        let x = Array2::from_shape_fn((2, len), |(_, t)| (2.0 * PI * fcenter as f64 * t as f64 / len as f64).cos());
        // bin fcenter+1 in 1-based counting carries frequency fcenter
        let out = slow_modulation(&Signal::real(x), fcenter + 1).unwrap();
        let out = out.as_real().unwrap();
        for v in out.iter() {
            assert!((v - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_complex_stays_complex() {
        let len = 64;
        let z = Array3::from_shape_fn((2, 1, len), |(_, _, t)| Complex64::from_polar(2.0, 2.0 * PI * 3.0 * t as f64 / len as f64));
        let out = slow_modulation(&Signal::complex(z), 4).unwrap();
        assert!(out.is_complex());
        for v in out.as_complex().unwrap().iter() {
            assert!((v - Complex64::new(2.0, 0.0)).norm() < 1e-9);
        }
    }

    #[test]
    fn test_fcenter_one_is_identity_on_analytic_input() {
        let z = Array2::from_shape_fn((1, 8), |(_, t)| Complex64::new(t as f64, 1.0));
        let out = slow_modulation(&Signal::complex(z.clone()), 1).unwrap();
        assert_eq!(out.as_complex().unwrap(), &z.into_dyn());
    }

    #[test]
    fn test_rejects_out_of_range_carrier() {
        let x = Signal::real(Array2::<f64>::zeros((1, 16)));
        assert!(matches!(slow_modulation(&x, 0), Err(DspError::IndexOutOfRange { .. })));
        assert!(matches!(slow_modulation(&x, 17), Err(DspError::IndexOutOfRange { max: 16, .. })));
        assert!(slow_modulation(&x, 16).is_ok());
    }

    #[test]
    fn test_rejects_flat_input() {
        let x = Signal::real(Array1::<f64>::zeros(16));
        assert!(matches!(slow_modulation(&x, 1), Err(DspError::AxisCount { actual: 1, .. })));
    }
}
