//! Leakage-correction configuration.
//!
//! Leakage (bleed-through) is the part of a target signal explained by a
//! reference signal. Each [`LeakageMethod`] variant carries exactly the
//! parameters its correction needs.

use crate::error::{TypeError, TypeResult};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inverse-operator record for geometric correction.
///
/// `leadfield` maps sources to sensors (`channels x sources`), `invop` maps
/// sensors back to sources (`sources x channels`).
#[derive(Clone, Debug, PartialEq)]
pub struct InverseOperator {
    leadfield: Array2<f64>,
    invop: Array2<f64>,
    nsource: usize,
}

impl InverseOperator {
    pub fn new(leadfield: Array2<f64>, invop: Array2<f64>, nsource: usize) -> TypeResult<Self> {
        if nsource == 0 {
            return Err(TypeError::InvalidValue {
                field: "nsource",
                reason: "source count must be at least 1".into(),
            });
        }
        if invop.nrows() != nsource {
            return Err(TypeError::InvalidValue {
                field: "invop",
                reason: format!(
                    "inverse operator has {} rows but the source count is {}",
                    invop.nrows(),
                    nsource
                ),
            });
        }
        let expected = (invop.ncols(), nsource);
        if leadfield.dim() != expected {
            return Err(TypeError::ShapeMismatch {
                name: "leadfield",
                expected,
                actual: leadfield.dim(),
            });
        }
        Ok(Self {
            leadfield,
            invop,
            nsource,
        })
    }

    pub fn leadfield(&self) -> &Array2<f64> {
        &self.leadfield
    }

    pub fn invop(&self) -> &Array2<f64> {
        &self.invop
    }

    pub fn nsource(&self) -> usize {
        self.nsource
    }

    /// Number of sensor channels the operator was built for.
    pub fn nchannel(&self) -> usize {
        self.invop.ncols()
    }

    /// Lead-field column of a 1-based source index.
    pub fn topography(&self, source: usize) -> Option<ArrayView1<'_, f64>> {
        if source == 0 || source > self.nsource {
            return None;
        }
        Some(self.leadfield.column(source - 1))
    }
}

/// Method tag without parameters, as written in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeakageKind {
    Gcs,
    #[serde(alias = "orthstat")]
    OrthStatic,
    #[serde(alias = "orthinst")]
    OrthInstantaneous,
    Custom,
}

impl LeakageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcs => "gcs",
            Self::OrthStatic => "orth-static",
            Self::OrthInstantaneous => "orth-instantaneous",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for LeakageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeakageKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gcs" => Ok(Self::Gcs),
            "orth-static" | "orthstat" | "orth_static" => Ok(Self::OrthStatic),
            "orth-instantaneous" | "orthinst" | "orth_instantaneous" => {
                Ok(Self::OrthInstantaneous)
            }
            "custom" => Ok(Self::Custom),
            _ => Err(TypeError::UnknownTag {
                kind: "leakage method",
                value: s.to_string(),
            }),
        }
    }
}

/// Leakage-correction strategy with its parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum LeakageMethod {
    /// Geometric correction from an inverse operator; `source` is 1-based.
    Gcs {
        inverse: InverseOperator,
        source: usize,
    },
    /// Static least-squares orthogonalization.
    OrthStatic,
    /// Instantaneous orthogonalization of analytic signals.
    OrthInstantaneous,
    /// Caller-supplied `targets x references` coefficients.
    Custom { beta: Array2<f64> },
}

impl LeakageMethod {
    /// Geometric correction, checking the source index against the operator.
    pub fn gcs(inverse: InverseOperator, source: usize) -> TypeResult<Self> {
        if source == 0 || source > inverse.nsource() {
            return Err(TypeError::InvalidValue {
                field: "source",
                reason: format!(
                    "source index {} outside 1..={}",
                    source,
                    inverse.nsource()
                ),
            });
        }
        Ok(Self::Gcs { inverse, source })
    }

    pub fn kind(&self) -> LeakageKind {
        match self {
            Self::Gcs { .. } => LeakageKind::Gcs,
            Self::OrthStatic => LeakageKind::OrthStatic,
            Self::OrthInstantaneous => LeakageKind::OrthInstantaneous,
            Self::Custom { .. } => LeakageKind::Custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn operator() -> InverseOperator {
        let leadfield = array![[1.0, 0.5], [0.2, 1.0], [0.0, 0.3]];
        let invop = array![[0.8, 0.1, 0.0], [0.1, 0.7, 0.2]];
        InverseOperator::new(leadfield, invop, 2).unwrap()
    }

    #[test]
    fn test_inverse_operator_shapes() {
        let op = operator();
        assert_eq!(op.nchannel(), 3);
        assert_eq!(op.topography(2).unwrap().to_vec(), vec![0.5, 1.0, 0.3]);
        assert!(op.topography(0).is_none());
        assert!(op.topography(3).is_none());
    }

    #[test]
    fn test_inverse_operator_rejects_row_mismatch() {
        let leadfield = Array2::<f64>::zeros((3, 2));
        let invop = Array2::<f64>::zeros((3, 3));
        assert!(matches!(
            InverseOperator::new(leadfield, invop, 2),
            Err(TypeError::InvalidValue { field: "invop", .. })
        ));
    }

    #[test]
    fn test_gcs_source_range() {
        assert!(LeakageMethod::gcs(operator(), 2).is_ok());
        assert!(LeakageMethod::gcs(operator(), 0).is_err());
        assert!(LeakageMethod::gcs(operator(), 3).is_err());
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!("orthinst".parse::<LeakageKind>(), Ok(LeakageKind::OrthInstantaneous));
        assert_eq!("ORTH-STATIC".parse::<LeakageKind>(), Ok(LeakageKind::OrthStatic));
        assert!("pca".parse::<LeakageKind>().is_err());
        assert_eq!(LeakageMethod::OrthStatic.kind(), LeakageKind::OrthStatic);
    }
}
