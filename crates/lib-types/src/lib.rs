//! # lib-types
//!
//! Core type definitions for multichannel spectral processing.
//!
//! This crate provides the data model shared by the DSP engine and the CLI:
//! - Physical units (Hz, seconds)
//! - Signal blocks in the real or complex domain
//! - Band specifications and the canonical physiological band table
//! - Leakage-correction methods and inverse-operator records
//! - Spectrum and reshaping options
//! - The recording boundary used by external readers

pub mod band;
pub mod error;
pub mod leakage;
pub mod recording;
pub mod reshape;
pub mod signal;
pub mod spectrum;
pub mod units;

pub use band::*;
pub use error::*;
pub use leakage::*;
pub use recording::*;
pub use reshape::*;
pub use signal::*;
pub use spectrum::*;
pub use units::*;

/// Re-export num_complex for convenience
pub use num_complex::Complex64;
