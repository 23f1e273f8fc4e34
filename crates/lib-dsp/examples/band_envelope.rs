//! Band envelope example.
//!
//! This example demonstrates:
//! 1. Building a synthetic two-channel recording with an alpha burst
//! 2. Cutting it into epochs
//! 3. Filtering to the alpha band and taking the analytic signal
//! 4. Demodulating the 10 Hz carrier and summarizing the spectrum

use lib_dsp::analytic::analytic_signal;
use lib_dsp::epoch::epoch;
use lib_dsp::filter::filter_signal;
use lib_dsp::modulation::slow_modulation;
use lib_dsp::spectrum::compute_spectrum;
use lib_types::{CanonicalBand, EpochMode, Hertz, Signal, SpectrumConfig};
use ndarray::Array2;
use std::f64::consts::PI;

fn main() -> anyhow::Result<()> {
    let sfreq = Hertz(250.0);
    let recording = synthetic_recording(sfreq, 5000);

    println!("=== Band Envelope Example ===\n");

    let epochs = epoch(&Signal::real(recording), EpochMode::EpochLength, 1000)?;
    println!("Epoched block: {:?}", epochs.shape());

    let alpha = filter_signal(&epochs, sfreq, &CanonicalBand::Alpha.into())?;
    let analytic = analytic_signal(&alpha, None)?;
    let envelope: Vec<f64> = analytic
        .index_axis(ndarray::Axis(0), 0)
        .index_axis(ndarray::Axis(0), 0)
        .iter()
        .map(|z| z.norm())
        .collect();
    let peak = envelope.iter().cloned().fold(0.0, f64::max);
    println!("Alpha envelope peak (epoch 0, channel 0): {:.3}", peak);

    // 10 Hz over 1000 samples at 250 Hz is bin 40, the 41st in 1-based counting
    let slow = slow_modulation(&Signal::complex(analytic), 41)?;
    println!("Demodulated block complex: {}", slow.is_complex());

    let spectrum = compute_spectrum(&epochs, sfreq, &SpectrumConfig::power().averaged().with_band_parameters())?;
    if let Some(bp) = spectrum.band_parameters {
        for (channel, nu) in bp.nucenter.iter().enumerate() {
            println!(
                "Channel {}: center {:.2} Hz, 1% edge {:.2} Hz, 99% edge {:.2} Hz",
                channel, nu, bp.numin[[channel]], bp.numax[[channel]]
            );
        }
    }

    Ok(())
}

fn synthetic_recording(sfreq: Hertz, samples: usize) -> Array2<f64> {
    Array2::from_shape_fn((2, samples), |(c, t)| {
        let time = t as f64 / sfreq.0;
        let burst = 1.0 + 0.5 * (2.0 * PI * 0.5 * time).sin();
        let alpha = burst * (2.0 * PI * 10.0 * time).sin();
        let drift = 0.2 * (2.0 * PI * 1.5 * time + c as f64).cos();
        alpha + drift + 0.05 * (2.0 * PI * 60.0 * time).sin()
    })
}
