//! Baseline correction.
//!
//! Epoched blocks have each epoch's per-channel mean removed. A continuous
//! block built from several stretches of a recording is split wherever the
//! source sample index jumps by more than one, and every stretch has its own
//! per-channel mean removed.

use crate::error::{DspError, DspResult};
use ndarray::{s, ArrayD, ArrayViewD, Axis, Zip};
use std::ops::Range;

/// Contiguous runs of `indices`, split after every jump larger than one.
///
/// The runs cover `0..indices.len()` without overlap.
pub fn contiguous_segments(indices: &[usize]) -> Vec<Range<usize>> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, pair) in indices.windows(2).enumerate() {
        if pair[1] > pair[0] + 1 {
            segments.push(start..i + 1);
            start = i + 1;
        }
    }
    if start < indices.len() {
        segments.push(start..indices.len());
    }
    segments
}

/// Remove the baseline of a 2-axis or 3-axis block.
///
/// `sample_indices` maps each time sample of a continuous block to its
/// source sample; it is ignored for epoched blocks.
pub fn baseline_correct(data: ArrayViewD<'_, f64>, sample_indices: &[usize]) -> DspResult<ArrayD<f64>> {
    let time = match data.ndim() {
        2 | 3 => Axis(data.ndim() - 1),
        n => {
            return Err(DspError::AxisCount {
                expected: "2 or 3",
                actual: n,
            })
        }
    };
    let samples = data.len_of(time);

    let segments = if data.ndim() == 3 {
        vec![0..samples]
    } else {
        if sample_indices.len() != samples {
            return Err(DspError::LengthMismatch {
                what: "sample indices",
                expected: samples,
                actual: sample_indices.len(),
            });
        }
        contiguous_segments(sample_indices)
    };
    tracing::debug!(segments = segments.len(), "Baseline correction");

    let mut out = data.to_owned();
    Zip::from(out.lanes_mut(time)).par_for_each(|mut lane| {
        for segment in &segments {
            let mut part = lane.slice_mut(s![segment.clone()]);
            if let Some(mean) = part.mean() {
                part -= mean;
            }
        }
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_segments_split_at_gaps() {
        assert_eq!(contiguous_segments(&[10, 11, 12, 20, 21, 30]), vec![0..3, 3..5, 5..6]);
        assert_eq!(contiguous_segments(&[4, 5, 6]), vec![0..3]);
        assert!(contiguous_segments(&[]).is_empty());
    }

    #[test]
    fn test_every_sample_in_one_segment() {
        let indices = [0, 1, 5, 6, 7, 9, 15, 16];
        let segments = contiguous_segments(&indices);
        let covered: usize = segments.iter().map(|r| r.len()).sum();
        assert_eq!(covered, indices.len());
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_continuous_segments_demeaned() {
        let x = array![[1.0, 3.0, 10.0, 20.0], [0.0, 0.0, 5.0, 5.0]].into_dyn();
        let out = baseline_correct(x.view(), &[100, 101, 200, 201]).unwrap();
        assert_eq!(out, array![[-1.0, 1.0, -5.0, 5.0], [0.0, 0.0, 0.0, 0.0]].into_dyn());
    }

    #[test]
    fn test_epochs_demeaned_independently() {
        let x = Array3::from_shape_fn((2, 2, 4), |(e, c, t)| (e * 10 + c) as f64 + t as f64).into_dyn();
        let out = baseline_correct(x.view(), &[]).unwrap();
        for lane in out.lanes(Axis(2)) {
            assert!(lane.sum().abs() < 1e-12);
            assert_eq!(lane[0], -1.5);
        }
    }

    #[test]
    fn test_index_length_checked() {
        let x = array![[1.0, 2.0]].into_dyn();
        assert!(matches!(
            baseline_correct(x.view(), &[0]),
            Err(DspError::LengthMismatch { .. })
        ));
    }
}
