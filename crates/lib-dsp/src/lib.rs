//! # lib-dsp
//!
//! Spectral processing engine for multichannel electrophysiology recordings.
//!
//! This crate provides the numerical core:
//!
//! - **FFT/IFFT**: Cached planners and lane-wise transforms along one axis
//! - **Cosine Filters**: Tapered band masks built from sub-band descriptors
//! - **Spectral Filtering**: Per-channel, per-epoch FFT filtering with Rayon
//! - **Analytic Signals**: One-sided spectrum reconstruction
//! - **Leakage Correction**: Geometric, least-squares and instantaneous
//!   orthogonalization between target and reference signals
//! - **Slow Modulation**: Carrier demodulation of analytic signals
//! - **Spectra**: Power/Fourier half spectra and cumulative-energy band
//!   parameters
//! - **Preprocessing**: Channel selection, epoching, downsampling and
//!   baseline correction of raw recordings
//!
//! All operations take borrowed input and return freshly allocated output.
//! Non-fatal anomalies are reported through `tracing`.

pub mod analytic;
pub mod baseline;
pub mod cosine;
pub mod downsample;
pub mod epoch;
pub mod error;
pub mod fft;
pub mod filter;
pub mod leakage;
pub mod modulation;
pub mod preprocess;
pub mod spectrum;
pub mod window;

pub use analytic::analytic_signal;
pub use cosine::{prepare_cosine_filter, CosineFilter};
pub use downsample::{downsample, Downsampled};
pub use epoch::{concatenate, epoch};
pub use error::{DspError, DspResult, ErrorCategory};
pub use fft::FftEngine;
pub use filter::{filter_signal, SpectralFilter};
pub use leakage::correct_leakage;
pub use modulation::slow_modulation;
pub use preprocess::{ChannelSelection, PreprocessConfig, Preprocessed, Preprocessor};
pub use spectrum::{compute_spectrum, BandParameters, SpectrumResult};
