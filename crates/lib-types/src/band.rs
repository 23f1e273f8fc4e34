//! Band specifications for cosine-tapered spectral filters.
//!
//! A [`BandSpec`] is an ordered list of sub-bands (low-pass, high-pass or
//! notch, each with a center frequency and a transition width in Hz) plus one
//! time-domain taper applied to the whole block before the transform. The
//! final spectral mask is the elementwise product of the sub-band masks.

use crate::error::{TypeError, TypeResult};
use crate::units::Hertz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time-domain taper applied before the forward transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// No weighting (rectangular window).
    #[default]
    #[serde(alias = "rectangular")]
    Boxcar,

    /// Hann (raised cosine) window.
    #[serde(alias = "hanning")]
    Hann,

    /// Hamming window.
    Hamming,

    /// Blackman window.
    Blackman,

    /// Kaiser-Bessel window with configurable beta parameter.
    Kaiser { beta: f64 },
}

impl WindowType {
    /// Kaiser beta used when none is given.
    pub const DEFAULT_KAISER_BETA: f64 = 6.0;
}

impl FromStr for WindowType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "boxcar" | "rectangular" | "rect" => Ok(Self::Boxcar),
            "hann" | "hanning" => Ok(Self::Hann),
            "hamming" => Ok(Self::Hamming),
            "blackman" => Ok(Self::Blackman),
            "kaiser" => Ok(Self::Kaiser {
                beta: Self::DEFAULT_KAISER_BETA,
            }),
            other => match other.strip_prefix("kaiser:") {
                Some(beta) => beta
                    .parse::<f64>()
                    .map(|beta| Self::Kaiser { beta })
                    .map_err(|_| TypeError::InvalidValue {
                        field: "window",
                        reason: format!("cannot parse kaiser beta from '{}'", beta),
                    }),
                None => Err(TypeError::UnknownTag {
                    kind: "window",
                    value: s.to_string(),
                }),
            },
        }
    }
}

/// Shape of a single sub-band multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterShape {
    /// Pass below the transition, stop above.
    Low,
    /// Stop below the transition, pass above.
    High,
    /// Pass outside the transition, zero at its center.
    Notch,
}

impl FilterShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
            Self::Notch => "notch",
        }
    }
}

impl fmt::Display for FilterShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterShape {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "lowpass" | "low-pass" => Ok(Self::Low),
            "high" | "highpass" | "high-pass" => Ok(Self::High),
            "notch" => Ok(Self::Notch),
            _ => Err(TypeError::UnknownTag {
                kind: "filter shape",
                value: s.to_string(),
            }),
        }
    }
}

/// One sub-band descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubBand {
    pub shape: FilterShape,
    /// Center of the transition band.
    pub freq: Hertz,
    /// Full width of the transition band.
    pub width: Hertz,
}

impl SubBand {
    pub fn new(shape: FilterShape, freq: f64, width: f64) -> Self {
        Self {
            shape,
            freq: Hertz(freq),
            width: Hertz(width),
        }
    }

    fn validate(&self) -> TypeResult<()> {
        if !self.freq.0.is_finite() {
            return Err(TypeError::InvalidValue {
                field: "freq",
                reason: format!("center frequency must be finite, got {}", self.freq.0),
            });
        }
        if !(self.width.0.is_finite() && self.width.0 > 0.0) {
            return Err(TypeError::InvalidValue {
                field: "width",
                reason: format!("transition width must be positive, got {}", self.width.0),
            });
        }
        Ok(())
    }
}

/// Validated band specification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BandSpecRepr", into = "BandSpecRepr")]
pub struct BandSpec {
    pub window: WindowType,
    bands: Vec<SubBand>,
}

#[derive(Serialize, Deserialize)]
struct BandSpecRepr {
    #[serde(default)]
    window: WindowType,
    bands: Vec<SubBand>,
}

impl TryFrom<BandSpecRepr> for BandSpec {
    type Error = TypeError;

    fn try_from(repr: BandSpecRepr) -> Result<Self, Self::Error> {
        Self::new(repr.window, repr.bands)
    }
}

impl From<BandSpec> for BandSpecRepr {
    fn from(spec: BandSpec) -> Self {
        Self {
            window: spec.window,
            bands: spec.bands,
        }
    }
}

impl BandSpec {
    /// Build from a list of sub-bands. The list must be non-empty and every
    /// width strictly positive.
    pub fn new(window: WindowType, bands: Vec<SubBand>) -> TypeResult<Self> {
        if bands.is_empty() {
            return Err(TypeError::Empty("bands"));
        }
        for band in &bands {
            band.validate()?;
        }
        Ok(Self { window, bands })
    }

    /// Build from three parallel sequences, the way band tables are usually
    /// written down (`par`, `freq`, `width`).
    pub fn from_parts(
        window: WindowType,
        shapes: &[FilterShape],
        freqs: &[f64],
        widths: &[f64],
    ) -> TypeResult<Self> {
        if shapes.len() != freqs.len() || shapes.len() != widths.len() {
            return Err(TypeError::SubBandLengthMismatch {
                shapes: shapes.len(),
                freqs: freqs.len(),
                widths: widths.len(),
            });
        }
        let bands = shapes
            .iter()
            .zip(freqs)
            .zip(widths)
            .map(|((&shape, &freq), &width)| SubBand::new(shape, freq, width))
            .collect();
        Self::new(window, bands)
    }

    pub fn bands(&self) -> &[SubBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Always false for a validated spec.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// Named physiological frequency bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanonicalBand {
    Delta,
    Theta,
    Alpha,
    Beta,
    BetaLow,
    BetaHigh,
    Gamma,
    GammaLow,
    GammaHigh,
}

impl CanonicalBand {
    pub const ALL: [CanonicalBand; 9] = [
        Self::Delta,
        Self::Theta,
        Self::Alpha,
        Self::Beta,
        Self::BetaLow,
        Self::BetaHigh,
        Self::Gamma,
        Self::GammaLow,
        Self::GammaHigh,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Theta => "theta",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::BetaLow => "beta-low",
            Self::BetaHigh => "beta-high",
            Self::Gamma => "gamma",
            Self::GammaLow => "gamma-low",
            Self::GammaHigh => "gamma-high",
        }
    }

    /// `(high-pass edge, low-pass edge, transition width)` in Hz.
    pub fn edges(&self) -> (f64, f64, f64) {
        match self {
            Self::Delta => (1.0, 4.0, 0.5),
            Self::Theta => (4.0, 8.0, 1.0),
            Self::Alpha => (8.0, 12.0, 1.0),
            Self::Beta => (12.0, 30.0, 2.0),
            Self::BetaLow => (12.0, 21.0, 1.0),
            Self::BetaHigh => (21.0, 30.0, 1.0),
            Self::Gamma => (30.0, 45.0, 2.0),
            Self::GammaLow => (30.0, 37.5, 1.0),
            Self::GammaHigh => (37.5, 45.0, 1.0),
        }
    }

    /// Boxcar taper, high-pass at the lower edge, low-pass at the upper edge.
    pub fn spec(&self) -> BandSpec {
        let (lo, hi, width) = self.edges();
        BandSpec {
            window: WindowType::Boxcar,
            bands: vec![
                SubBand::new(FilterShape::High, lo, width),
                SubBand::new(FilterShape::Low, hi, width),
            ],
        }
    }
}

impl fmt::Display for CanonicalBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CanonicalBand {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|band| band.name().replace('-', "") == key)
            .ok_or_else(|| TypeError::UnknownTag {
                kind: "band",
                value: s.to_string(),
            })
    }
}

/// What a caller asks the spectral filter to do.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterRequest {
    /// Identity: return a copy of the input.
    None,
    Named(CanonicalBand),
    Custom(BandSpec),
}

impl FilterRequest {
    /// The band specification to apply, or `None` for the identity request.
    pub fn resolve(&self) -> Option<BandSpec> {
        match self {
            Self::None => None,
            Self::Named(band) => Some(band.spec()),
            Self::Custom(spec) => Some(spec.clone()),
        }
    }
}

impl From<CanonicalBand> for FilterRequest {
    fn from(band: CanonicalBand) -> Self {
        Self::Named(band)
    }
}

impl From<BandSpec> for FilterRequest {
    fn from(spec: BandSpec) -> Self {
        Self::Custom(spec)
    }
}

impl FromStr for FilterRequest {
    type Err = TypeError;

    /// Parses `none` or one of the canonical band names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        s.parse().map(Self::Named)
    }
}
