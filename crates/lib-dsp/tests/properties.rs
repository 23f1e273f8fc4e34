//! Behavioural properties checked across module boundaries.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use lib_dsp::analytic::analytic_signal;
use lib_dsp::cosine::prepare_cosine_filter;
use lib_dsp::error::{DspError, ErrorCategory};
use lib_dsp::filter::filter_signal;
use lib_dsp::leakage::correct_leakage;
use lib_dsp::modulation::slow_modulation;
use lib_dsp::spectrum::compute_spectrum;
use lib_types::{
    BandSpec, CanonicalBand, FilterRequest, FilterShape, Hertz, LeakageMethod, Signal, SpectrumConfig, SubBand,
    WindowType,
};
use ndarray::{Array2, Array3, Axis};
use std::f64::consts::PI;

fn noise(shape: (usize, usize), seed: u64) -> Array2<f64> {
    // xorshift, enough for decorrelated test data
    let mut state = seed.max(1);
    Array2::from_shape_fn(shape, |_| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 10_000) as f64 / 5_000.0 - 1.0
    })
}

#[test]
fn mask_is_mirror_symmetric_for_every_shape() {
    for shape in [FilterShape::Low, FilterShape::High, FilterShape::Notch] {
        for len in [100, 101, 256, 777] {
            let spec = BandSpec::new(WindowType::Hann, vec![SubBand::new(shape, 40.0, 6.0)]).unwrap();
            let filter = prepare_cosine_filter(&spec, len, Hertz(250.0)).unwrap();
            for i in 1..len {
                assert_eq!(filter.mask[i], filter.mask[len - i], "{shape} len {len} bin {i}");
            }
        }
    }
}

#[test]
fn every_canonical_mask_stays_in_unit_range() {
    for band in CanonicalBand::ALL {
        let filter = prepare_cosine_filter(&band.spec(), 2000, Hertz(500.0)).unwrap();
        assert!(filter.mask.iter().all(|m| (0.0..=1.0).contains(m)), "{band}");
        assert!(filter.window.iter().all(|&w| w == 1.0));
    }
}

#[test]
fn full_span_band_pass_is_flat() {
    // high-pass below DC, low-pass beyond Nyquist
    let spec = BandSpec::from_parts(
        WindowType::Boxcar,
        &[FilterShape::High, FilterShape::Low],
        &[-10.0, 200.0],
        &[1.0, 1.0],
    )
    .unwrap();
    let filter = prepare_cosine_filter(&spec, 512, Hertz(256.0)).unwrap();
    for m in &filter.mask {
        assert_abs_diff_eq!(*m, 1.0, epsilon = 1e-12);
    }

    let x = noise((3, 512), 7);
    let y = filter_signal(&Signal::real(x.clone()), Hertz(256.0), &spec.into()).unwrap().real_part();
    for (a, b) in y.iter().zip(x.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
    }
}

#[test]
fn none_filter_is_a_deep_copy() {
    let x = Array3::from_shape_fn((2, 3, 40), |(e, c, t)| (e * 100 + c * 10 + t) as f64);
    let input = Signal::real(x.clone());
    let mut y = filter_signal(&input, Hertz(100.0), &FilterRequest::None)
        .unwrap()
        .into_real()
        .unwrap();
    assert_eq!(y, x.clone().into_dyn());
    y.fill(0.0);
    assert_eq!(input.as_real().unwrap(), &x.into_dyn());
}

#[test]
fn filtering_is_linear() {
    let a = noise((2, 300), 3);
    let b = noise((2, 300), 11);
    let request: FilterRequest = CanonicalBand::Theta.into();
    let fs = Hertz(150.0);

    let fa = filter_signal(&Signal::real(a.clone()), fs, &request).unwrap().real_part();
    let fb = filter_signal(&Signal::real(b.clone()), fs, &request).unwrap().real_part();
    let fab = filter_signal(&Signal::real(&a * 2.0 - &b), fs, &request).unwrap().real_part();
    for ((x, y), z) in fa.iter().zip(fb.iter()).zip(fab.iter()) {
        assert_abs_diff_eq!(2.0 * x - y, *z, epsilon = 1e-10);
    }
}

#[test]
fn analytic_sinusoid_has_constant_magnitude_and_linear_phase() {
    let n = 500;
    let fs = 250.0;
    let f = 12.5;
    let x = Array2::from_shape_fn((1, n), |(_, t)| 3.0 * (2.0 * PI * f * t as f64 / fs).cos());
    let z = analytic_signal(&Signal::real(x), None).unwrap();

    let step = 2.0 * PI * f / fs;
    let lane = z.index_axis(Axis(0), 0);
    for t in 0..n {
        assert_relative_eq!(lane[t].norm(), 3.0, epsilon = 1e-9);
        if t > 0 {
            let advance = (lane[t] / lane[t - 1]).arg();
            assert_abs_diff_eq!(advance, step, epsilon = 1e-9);
        }
    }
}

#[test]
fn analytic_rejects_single_sample_axis() {
    let x = Signal::real(Array2::<f64>::ones((3, 1)));
    let err = analytic_signal(&x, None).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::DomainPrecondition);
}

#[test]
fn slow_modulation_flattens_its_carrier() {
    let n = 400;
    let k = 20;
    let x = Array3::from_shape_fn((2, 2, n), |(_, _, t)| (2.0 * PI * k as f64 * t as f64 / n as f64).cos());
    let slow = slow_modulation(&Signal::real(x), k + 1).unwrap();
    let slow = slow.as_real().unwrap();
    for v in slow.iter() {
        assert_abs_diff_eq!(*v, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn custom_zero_beta_returns_target() {
    let x = noise((4, 100), 5);
    let y = noise((2, 100), 9);
    let method = LeakageMethod::Custom { beta: Array2::zeros((4, 2)) };
    let z = correct_leakage(&Signal::real(x.clone()), &Signal::real(y), &method).unwrap();
    assert_eq!(z, Signal::real(x));
}

#[test]
fn orth_instantaneous_rejects_real_pair() {
    let x = Signal::real(noise((2, 100), 1));
    let y = Signal::real(noise((2, 100), 2));
    let err = correct_leakage(&x, &y, &LeakageMethod::OrthInstantaneous).unwrap_err();
    assert!(matches!(err, DspError::RequiresComplex(_)));
    assert_eq!(err.category(), ErrorCategory::DomainPrecondition);
}

#[test]
fn orth_instantaneous_on_analytic_signals() {
    let x = analytic_signal(&Signal::real(noise((3, 128), 4)), None).unwrap();
    let y = analytic_signal(&Signal::real(noise((1, 128), 8)), None).unwrap();
    let z = correct_leakage(&Signal::complex(x.clone()), &Signal::complex(y), &LeakageMethod::OrthInstantaneous)
        .unwrap();
    assert_eq!(z.shape(), x.shape());
    assert!(z.is_complex());
}

#[test]
fn power_spectrum_shape_and_frequency_axis() {
    let x = noise((4, 100), 21);
    let result = compute_spectrum(&Signal::real(x), Hertz(100.0), &SpectrumConfig::power()).unwrap();
    assert_eq!(result.spectrum.shape(), &[4, 50]);
    assert_eq!(result.frequencies.len(), 50);
    assert!(result.frequencies.iter().all(|&f| f >= 0.0));
    for pair in result.frequencies.as_slice().unwrap().windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

#[test]
fn band_parameters_are_ordered() {
    let x = Array3::from_shape_fn((3, 4, 256), |(e, c, t)| {
        let t = t as f64 / 128.0;
        (2.0 * PI * (5.0 + 7.0 * c as f64) * t).sin() + 0.5 * (2.0 * PI * (20.0 + e as f64) * t).cos()
    });
    let config = SpectrumConfig::fourier().with_band_parameters();
    let result = compute_spectrum(&Signal::real(x), Hertz(128.0), &config).unwrap();
    let bp = result.band_parameters.unwrap();
    assert_eq!(bp.fcenter.shape(), &[3, 4]);
    for ((lo, mid), hi) in bp.numin.iter().zip(bp.nucenter.iter()).zip(bp.numax.iter()) {
        assert!(lo <= mid && mid <= hi);
    }
}

#[test]
fn filtered_power_concentrates_in_band() {
    let fs = Hertz(200.0);
    let x = noise((2, 2000), 13);
    let filtered = filter_signal(&Signal::real(x), fs, &CanonicalBand::Beta.into()).unwrap();
    let result = compute_spectrum(&filtered, fs, &SpectrumConfig::power().with_band_parameters()).unwrap();
    let bp = result.band_parameters.unwrap();
    for (lo, hi) in bp.numin.iter().zip(bp.numax.iter()) {
        assert!(*lo >= 10.0, "low edge {lo}");
        assert!(*hi <= 32.0, "high edge {hi}");
    }
}
