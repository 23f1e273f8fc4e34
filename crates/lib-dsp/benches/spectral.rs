//! Spectral pipeline benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lib_dsp::analytic::analytic_signal;
use lib_dsp::filter::{filter_signal, SpectralFilter};
use lib_dsp::spectrum::compute_spectrum;
use lib_types::{CanonicalBand, Hertz, Signal, SpectrumConfig};
use ndarray::Array3;

const SAMPLE_RATE: f64 = 1000.0;

fn block(epochs: usize, channels: usize, samples: usize) -> Signal {
    Signal::real(Array3::from_shape_fn((epochs, channels, samples), |(e, c, t)| {
        let t = t as f64 / SAMPLE_RATE;
        (2.0 * std::f64::consts::PI * (8.0 + c as f64) * t).sin() + 0.1 * e as f64
    }))
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    // Odd lengths on purpose: recordings are rarely powers of two
    for samples in [1000, 2500, 10_000].iter() {
        let signal = block(8, 32, *samples);

        group.bench_with_input(BenchmarkId::new("alpha", samples), &signal, |b, s| {
            b.iter(|| filter_signal(black_box(s), Hertz(SAMPLE_RATE), &CanonicalBand::Alpha.into()));
        });

        let filter = SpectralFilter::new(&CanonicalBand::Beta.spec(), *samples, Hertz(SAMPLE_RATE)).unwrap();
        let data = signal.real_part();
        group.bench_with_input(BenchmarkId::new("prepared", samples), &data, |b, d| {
            b.iter(|| filter.apply(black_box(d.view())));
        });
    }

    group.finish();
}

fn bench_analytic_and_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    for samples in [1000, 4096].iter() {
        let signal = block(4, 64, *samples);

        group.bench_with_input(BenchmarkId::new("analytic", samples), &signal, |b, s| {
            b.iter(|| analytic_signal(black_box(s), None));
        });

        let config = SpectrumConfig::power().averaged().with_band_parameters();
        group.bench_with_input(BenchmarkId::new("spectrum", samples), &signal, |b, s| {
            b.iter(|| compute_spectrum(black_box(s), Hertz(SAMPLE_RATE), &config));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_analytic_and_spectrum);
criterion_main!(benches);
