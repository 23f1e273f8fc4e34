//! Spectrum request configuration.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which spectral quantity to report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectrumKind {
    /// Squared magnitude of the Fourier coefficients.
    #[default]
    Power,
    /// Complex Fourier coefficients.
    Fourier,
}

impl FromStr for SpectrumKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "power" => Ok(Self::Power),
            "fourier" => Ok(Self::Fourier),
            _ => Err(TypeError::UnknownTag {
                kind: "spectrum kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Spectrum computation options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectrumConfig {
    #[serde(default)]
    pub kind: SpectrumKind,

    /// Average across epochs. Ignored for continuous blocks.
    #[serde(default)]
    pub average: bool,

    /// Also derive center/edge frequencies from cumulative energy.
    #[serde(default)]
    pub band_parameters: bool,
}

impl SpectrumConfig {
    pub fn power() -> Self {
        Self::default()
    }

    pub fn fourier() -> Self {
        Self {
            kind: SpectrumKind::Fourier,
            ..Self::default()
        }
    }

    pub fn averaged(mut self) -> Self {
        self.average = true;
        self
    }

    pub fn with_band_parameters(mut self) -> Self {
        self.band_parameters = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flags() {
        let cfg = SpectrumConfig::fourier().averaged().with_band_parameters();
        assert_eq!(cfg.kind, SpectrumKind::Fourier);
        assert!(cfg.average);
        assert!(cfg.band_parameters);
        assert_eq!(SpectrumConfig::power().kind, SpectrumKind::Power);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Power".parse::<SpectrumKind>(), Ok(SpectrumKind::Power));
        assert!("amplitude".parse::<SpectrumKind>().is_err());
    }
}
