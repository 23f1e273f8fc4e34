//! Boundary contract with recording readers.
//!
//! Readers for vendor formats live outside this workspace. They hand over a
//! channel list, the true sampling rate and a sample matrix through
//! [`SampleSource`]; nothing here parses files.

use crate::error::{TypeError, TypeResult};
use crate::units::Hertz;
use ndarray::{Array2, Axis};

/// A recording that can deliver raw samples for selected channels.
pub trait SampleSource {
    /// True sampling rate of the stored samples.
    fn sample_rate(&self) -> Hertz;

    /// Names of every channel present, in storage order.
    fn channel_names(&self) -> &[String];

    /// Number of stored samples per channel.
    fn samples(&self) -> usize;

    /// Absolute index of the first stored sample.
    fn first_sample(&self) -> usize {
        0
    }

    /// Samples of the given channels (storage indices), `channel x time`.
    fn read(&self, channels: &[usize]) -> TypeResult<Array2<f64>>;
}

/// A recording held entirely in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct MemorySource {
    sample_rate: Hertz,
    names: Vec<String>,
    data: Array2<f64>,
    first_sample: usize,
}

impl MemorySource {
    pub fn new(sample_rate: Hertz, names: Vec<String>, data: Array2<f64>) -> TypeResult<Self> {
        if !sample_rate.is_valid_rate() {
            return Err(TypeError::InvalidValue {
                field: "sample_rate",
                reason: format!("sampling rate must be positive, got {}", sample_rate.0),
            });
        }
        if names.len() != data.nrows() {
            return Err(TypeError::InvalidValue {
                field: "channels",
                reason: format!(
                    "{} channel names for {} data rows",
                    names.len(),
                    data.nrows()
                ),
            });
        }
        Ok(Self {
            sample_rate,
            names,
            data,
            first_sample: 0,
        })
    }

    pub fn with_first_sample(mut self, first_sample: usize) -> Self {
        self.first_sample = first_sample;
        self
    }
}

impl SampleSource for MemorySource {
    fn sample_rate(&self) -> Hertz {
        self.sample_rate
    }

    fn channel_names(&self) -> &[String] {
        &self.names
    }

    fn samples(&self) -> usize {
        self.data.ncols()
    }

    fn first_sample(&self) -> usize {
        self.first_sample
    }

    fn read(&self, channels: &[usize]) -> TypeResult<Array2<f64>> {
        if let Some(&index) = channels.iter().find(|&&c| c >= self.names.len()) {
            return Err(TypeError::ChannelOutOfRange {
                index,
                available: self.names.len(),
            });
        }
        Ok(self.data.select(Axis(0), channels))
    }
}
