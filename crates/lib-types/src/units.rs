//! Physical units with type safety.
//!
//! These newtypes keep frequencies and durations apart so that a band edge
//! in Hz can never be confused with a sample period.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Time duration in seconds.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Seconds(pub f64);

impl Seconds {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub fn from_ms(ms: f64) -> Self {
        Self(ms * 1e-3)
    }

    #[inline]
    pub fn as_ms(&self) -> f64 {
        self.0 * 1e3
    }

    /// Convert to frequency (reciprocal).
    #[inline]
    pub fn to_frequency(&self) -> Hertz {
        Hertz(1.0 / self.0)
    }
}

impl Add for Seconds {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Seconds {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Seconds {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

/// Frequency in Hertz.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Hertz(pub f64);

impl Hertz {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub fn from_khz(khz: f64) -> Self {
        Self(khz * 1e3)
    }

    /// Convert to period (reciprocal).
    #[inline]
    pub fn to_period(&self) -> Seconds {
        Seconds(1.0 / self.0)
    }

    /// Express this frequency on the `[0, 2)` cycles-per-block scale used by
    /// spectral masks, where `2.0` is the sampling rate and `1.0` is Nyquist.
    #[inline]
    pub fn normalized(&self, sample_rate: Hertz) -> f64 {
        self.0 / sample_rate.0 * 2.0
    }

    /// Nyquist frequency for this sampling rate.
    #[inline]
    pub fn nyquist(&self) -> Hertz {
        Hertz(self.0 / 2.0)
    }

    /// True for a finite, strictly positive rate.
    #[inline]
    pub fn is_valid_rate(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl Add for Hertz {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Hertz {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Hertz {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Hertz {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Div<Hertz> for Hertz {
    type Output = f64;
    fn div(self, rhs: Hertz) -> f64 {
        self.0 / rhs.0
    }
}

impl std::fmt::Display for Hertz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_frequency() {
        let fs = Hertz(1000.0);
        assert!((Hertz(250.0).normalized(fs) - 0.5).abs() < 1e-12);
        assert!((fs.nyquist().normalized(fs) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_period_roundtrip() {
        let fs = Hertz::from_khz(2.0);
        assert!((fs.to_period().0 - 5e-4).abs() < 1e-15);
        assert!((fs.to_period().to_frequency().0 - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_validity() {
        assert!(Hertz(512.0).is_valid_rate());
        assert!(!Hertz(0.0).is_valid_rate());
        assert!(!Hertz(-1.0).is_valid_rate());
        assert!(!Hertz(f64::NAN).is_valid_rate());
    }
}
