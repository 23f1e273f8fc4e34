//! Channel selection, sample cutting, filtering and baseline correction of a
//! raw recording.

use crate::baseline::baseline_correct;
use crate::error::{check_rate, DspError, DspResult};
use crate::filter::filter_signal;
use lib_types::{FilterRequest, Hertz, SampleSource, Signal};
use ndarray::{Array2, Array3, ArrayD, ArrayView2, Axis};

/// What to extract from a recording and how to condition it.
#[derive(Clone, Debug, PartialEq)]
pub struct PreprocessConfig {
    /// Channel names to read, in output order.
    pub channels: Vec<String>,
    /// Band filter applied after cutting; `FilterRequest::None` skips it.
    pub filter: FilterRequest,
    /// Remove per-segment (continuous) or per-epoch means.
    pub baseline: bool,
}

impl PreprocessConfig {
    pub fn new(channels: Vec<String>) -> Self {
        Self {
            channels,
            filter: FilterRequest::None,
            baseline: false,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<FilterRequest>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_baseline(mut self) -> Self {
        self.baseline = true;
        self
    }
}

/// Requested channels found in a recording.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelSelection {
    /// Storage index of each found channel in the recording.
    pub indices: Vec<usize>,
    /// Position of each found channel in the request.
    pub requested_positions: Vec<usize>,
    pub names: Vec<String>,
}

impl ChannelSelection {
    /// Match `requested` against `available`, keeping request order and
    /// skipping names the recording does not have.
    pub fn resolve(requested: &[String], available: &[String]) -> Self {
        let mut selection = Self::default();
        for (position, name) in requested.iter().enumerate() {
            if let Some(index) = available.iter().position(|a| a == name) {
                selection.indices.push(index);
                selection.requested_positions.push(position);
                selection.names.push(name.clone());
            }
        }
        selection
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A preprocessed block and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Preprocessed {
    /// `(channel, time)` for one row of times, `(epoch, channel, time)` otherwise.
    pub signal: ArrayD<f64>,
    pub selection: ChannelSelection,
    /// True sampling rate of the recording.
    pub sample_rate: Hertz,
    /// Recording sample index of every output sample, one row per epoch.
    pub sample_indices: Array2<usize>,
}

/// Runs a [`PreprocessConfig`] against recordings.
#[derive(Clone, Debug)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Cut and condition the requested channels at `times` (seconds).
    ///
    /// A single row of times yields a continuous block, `K` rows yield `K`
    /// epochs. Returns `Ok(None)` when none of the requested channels exist.
    pub fn run<S: SampleSource + ?Sized>(
        &self,
        source: &S,
        times: ArrayView2<'_, f64>,
    ) -> DspResult<Option<Preprocessed>> {
        let (rows, samples) = times.dim();
        if rows == 0 || samples == 0 {
            return Err(DspError::InsufficientData {
                needed: 1,
                got: rows * samples,
            });
        }
        let sample_rate = source.sample_rate();
        check_rate(sample_rate)?;

        let selection = ChannelSelection::resolve(&self.config.channels, source.channel_names());
        if selection.is_empty() {
            tracing::warn!(requested = ?self.config.channels, "No requested channel found in recording");
            return Ok(None);
        }
        tracing::debug!(channels = ?selection.names, rows, samples, "Reading recording");

        let raw = source.read(&selection.indices)?;
        let sample_indices = sample_indices(times, sample_rate, source.first_sample(), raw.ncols())?;

        let block = if rows == 1 {
            raw.select(Axis(1), &sample_indices.row(0).to_vec()).into_dyn()
        } else {
            Array3::from_shape_fn((rows, selection.len(), samples), |(k, c, t)| {
                raw[[c, sample_indices[[k, t]]]]
            })
            .into_dyn()
        };

        let mut signal = match self.config.filter {
            FilterRequest::None => block,
            ref request => match filter_signal(&Signal::Real(block), sample_rate, request)? {
                Signal::Real(filtered) => filtered,
                other => other.real_part(),
            },
        };

        if self.config.baseline {
            let row = sample_indices.row(0).to_vec();
            signal = baseline_correct(signal.view(), &row)?;
        }

        Ok(Some(Preprocessed {
            signal,
            selection,
            sample_rate,
            sample_indices,
        }))
    }
}

/// `floor(t * Fs) - first_sample` for every time, checked against the
/// recording length.
pub fn sample_indices(
    times: ArrayView2<'_, f64>,
    sample_rate: Hertz,
    first_sample: usize,
    recorded: usize,
) -> DspResult<Array2<usize>> {
    let mut out = Array2::<usize>::zeros(times.raw_dim());
    for (dst, &t) in out.iter_mut().zip(times.iter()) {
        let absolute = (t * sample_rate.0).floor();
        let index = absolute - first_sample as f64;
        if !index.is_finite() || index < 0.0 || index >= recorded as f64 {
            return Err(DspError::InvalidConfig(format!(
                "time {t} s maps to sample {index} outside the {recorded} recorded samples"
            )));
        }
        *dst = index as usize;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::{CanonicalBand, MemorySource};
    use ndarray::{array, Array1};

    fn source() -> MemorySource {
        let data = Array2::from_shape_fn((3, 100), |(c, t)| (c * 1000 + t) as f64);
        MemorySource::new(
            Hertz(8.0),
            vec!["Fz".into(), "Cz".into(), "Pz".into()],
            data,
        )
        .unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_selection_keeps_request_order() {
        let selection = ChannelSelection::resolve(&names(&["Pz", "Oz", "Fz"]), &names(&["Fz", "Cz", "Pz"]));
        assert_eq!(selection.indices, vec![2, 0]);
        assert_eq!(selection.requested_positions, vec![0, 2]);
        assert_eq!(selection.names, names(&["Pz", "Fz"]));
    }

    #[test]
    fn test_continuous_cut() {
        let pre = Preprocessor::new(PreprocessConfig::new(names(&["Cz"])));
        let times = Array1::from_shape_fn(5, |i| 1.0 + i as f64 * 0.125).insert_axis(Axis(0));
        let out = pre.run(&source(), times.view()).unwrap().unwrap();
        assert_eq!(out.signal.shape(), &[1, 5]);
        assert_eq!(out.signal[[0, 0]], 1008.0);
        assert_eq!(out.sample_indices.row(0).to_vec(), vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_first_sample_offset() {
        let src = source().with_first_sample(20);
        let pre = Preprocessor::new(PreprocessConfig::new(names(&["Fz"])));
        let out = pre.run(&src, array![[2.5, 2.625]].view()).unwrap().unwrap();
        assert_eq!(out.sample_indices, array![[0, 1]]);
        assert_eq!(out.signal[[0, 1]], 1.0);
        assert!(pre.run(&src, array![[1.0]].view()).is_err());
    }

    #[test]
    fn test_epoched_cut_with_baseline() {
        let pre = Preprocessor::new(PreprocessConfig::new(names(&["Fz", "Pz"])).with_baseline());
        let times = array![[0.0, 0.125, 0.25], [5.0, 5.125, 5.25]];
        let out = pre.run(&source(), times.view()).unwrap().unwrap();
        assert_eq!(out.signal.shape(), &[2, 2, 3]);
        assert_eq!(out.signal[[1, 1, 0]], -1.0);
        assert_eq!(out.signal[[0, 0, 2]], 1.0);
    }

    #[test]
    fn test_continuous_baseline_per_segment() {
        let pre = Preprocessor::new(PreprocessConfig::new(names(&["Fz"])).with_baseline());
        let times = array![[0.0, 0.125, 3.0, 3.125, 3.25]];
        let out = pre.run(&source(), times.view()).unwrap().unwrap();
        let row: Vec<f64> = out.signal.iter().copied().collect();
        assert_eq!(row, vec![-0.5, 0.5, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_filter_applied() {
        let config = PreprocessConfig::new(names(&["Fz"])).with_filter(CanonicalBand::Delta);
        let pre = Preprocessor::new(config);
        let times = Array1::from_shape_fn(64, |i| i as f64 / 8.0).insert_axis(Axis(0));
        let out = pre.run(&source(), times.view()).unwrap().unwrap();
        assert_eq!(out.signal.shape(), &[1, 64]);
        assert!(out.signal.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_no_channels_found() {
        let pre = Preprocessor::new(PreprocessConfig::new(names(&["Oz"])));
        assert!(pre.run(&source(), array![[0.0]].view()).unwrap().is_none());
    }
}
