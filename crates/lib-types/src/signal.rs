//! Multichannel signal blocks.
//!
//! A block is either continuous `(channel, time)` or epoched
//! `(epoch, channel, time)`. The time axis is always the last axis and its
//! length is shared by every channel and epoch of the block.
//!
//! Samples may be real or complex. Complex blocks usually carry analytic
//! signals; several operations only make sense in one of the two domains, so
//! the domain is kept explicit rather than promoting everything to complex.

use ndarray::{Array, ArrayD, Dimension};
use num_complex::Complex64;

/// Axis arrangement of a signal block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockLayout {
    /// `(channel, time)`.
    Continuous { channels: usize, samples: usize },
    /// `(epoch, channel, time)`.
    Epoched {
        epochs: usize,
        channels: usize,
        samples: usize,
    },
}

impl BlockLayout {
    /// Classify a shape, returning `None` for anything other than 2 or 3 axes.
    pub fn from_shape(shape: &[usize]) -> Option<Self> {
        match *shape {
            [channels, samples] => Some(Self::Continuous { channels, samples }),
            [epochs, channels, samples] => Some(Self::Epoched {
                epochs,
                channels,
                samples,
            }),
            _ => None,
        }
    }

    /// Length of the time axis.
    #[inline]
    pub fn samples(&self) -> usize {
        match *self {
            Self::Continuous { samples, .. } | Self::Epoched { samples, .. } => samples,
        }
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        match *self {
            Self::Continuous { channels, .. } | Self::Epoched { channels, .. } => channels,
        }
    }

    /// Number of epochs (1 for a continuous block).
    #[inline]
    pub fn epochs(&self) -> usize {
        match *self {
            Self::Continuous { .. } => 1,
            Self::Epoched { epochs, .. } => epochs,
        }
    }
}

/// A real or complex signal array of any rank.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    Real(ArrayD<f64>),
    Complex(ArrayD<Complex64>),
}

impl Signal {
    /// Wrap a real array of any dimensionality.
    pub fn real<D: Dimension>(data: Array<f64, D>) -> Self {
        Self::Real(data.into_dyn())
    }

    /// Wrap a complex array of any dimensionality.
    pub fn complex<D: Dimension>(data: Array<Complex64, D>) -> Self {
        Self::Complex(data.into_dyn())
    }

    /// Array shape.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Real(a) => a.shape(),
            Self::Complex(a) => a.shape(),
        }
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// True when the block holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    /// Length of the last (time) axis, 0 for a rank-0 array.
    #[inline]
    pub fn time_len(&self) -> usize {
        self.shape().last().copied().unwrap_or(0)
    }

    /// Block layout, if this is a 2- or 3-axis array.
    pub fn layout(&self) -> Option<BlockLayout> {
        BlockLayout::from_shape(self.shape())
    }

    pub fn as_real(&self) -> Option<&ArrayD<f64>> {
        match self {
            Self::Real(a) => Some(a),
            Self::Complex(_) => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ArrayD<Complex64>> {
        match self {
            Self::Real(_) => None,
            Self::Complex(a) => Some(a),
        }
    }

    pub fn into_real(self) -> Option<ArrayD<f64>> {
        match self {
            Self::Real(a) => Some(a),
            Self::Complex(_) => None,
        }
    }

    pub fn into_complex(self) -> Option<ArrayD<Complex64>> {
        match self {
            Self::Real(_) => None,
            Self::Complex(a) => Some(a),
        }
    }

    /// Real part of the samples as a new array.
    pub fn real_part(&self) -> ArrayD<f64> {
        match self {
            Self::Real(a) => a.clone(),
            Self::Complex(a) => a.mapv(|c| c.re),
        }
    }

    /// Samples promoted to complex as a new array.
    pub fn to_complex(&self) -> ArrayD<Complex64> {
        match self {
            Self::Real(a) => a.mapv(|v| Complex64::new(v, 0.0)),
            Self::Complex(a) => a.clone(),
        }
    }
}

impl From<ArrayD<f64>> for Signal {
    fn from(data: ArrayD<f64>) -> Self {
        Self::Real(data)
    }
}

impl From<ArrayD<Complex64>> for Signal {
    fn from(data: ArrayD<Complex64>) -> Self {
        Self::Complex(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_layout_classification() {
        assert_eq!(
            BlockLayout::from_shape(&[4, 100]),
            Some(BlockLayout::Continuous {
                channels: 4,
                samples: 100
            })
        );
        let epoched = BlockLayout::from_shape(&[3, 4, 100]).unwrap();
        assert_eq!(epoched.epochs(), 3);
        assert_eq!(epoched.channels(), 4);
        assert_eq!(epoched.samples(), 100);
        assert_eq!(BlockLayout::from_shape(&[100]), None);
        assert_eq!(BlockLayout::from_shape(&[1, 2, 3, 4]), None);
    }

    #[test]
    fn test_signal_domain_accessors() {
        let real = Signal::real(Array2::from_elem((2, 8), 1.5));
        assert!(!real.is_complex());
        assert_eq!(real.time_len(), 8);
        assert_eq!(real.len(), 16);
        assert!(real.as_complex().is_none());

        let promoted = real.to_complex();
        assert!(promoted.iter().all(|c| c.re == 1.5 && c.im == 0.0));

        let complex = Signal::complex(Array3::from_elem((2, 3, 5), Complex64::new(0.5, -2.0)));
        assert!(complex.is_complex());
        assert_eq!(complex.layout().map(|l| l.epochs()), Some(2));
        assert!(complex.real_part().iter().all(|&v| v == 0.5));
    }
}
