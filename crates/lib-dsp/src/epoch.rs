//! Cutting continuous blocks into epochs and joining them back.

use crate::error::{DspError, DspResult};
use lib_types::{EpochMode, Signal};
use ndarray::{Array2, Array3, ArrayD, Ix2, Ix3};

/// Cut a `(channel, time)` block into `(epoch, channel, length)`.
///
/// Epoch `k` covers samples `[k * length, (k + 1) * length)`; samples past
/// the last full epoch are dropped.
pub fn epoch(signal: &Signal, mode: EpochMode, amount: usize) -> DspResult<Signal> {
    if signal.ndim() != 2 {
        return Err(DspError::AxisCount {
            expected: "2",
            actual: signal.ndim(),
        });
    }
    let samples = signal.time_len();
    let (count, length) = epoch_geometry(mode, amount, samples)?;
    tracing::debug!(count, length, dropped = samples - count * length, "Epoching block");

    Ok(match signal {
        Signal::Real(data) => Signal::real(cut(data, count, length)?),
        Signal::Complex(data) => Signal::complex(cut(data, count, length)?),
    })
}

/// Join the first `min(amount, K)` epochs of `(epoch, channel, time)` along
/// time into `(channel, amount * time)`.
pub fn concatenate(signal: &Signal, amount: usize) -> DspResult<Signal> {
    if signal.ndim() != 3 {
        return Err(DspError::AxisCount {
            expected: "3",
            actual: signal.ndim(),
        });
    }
    if amount == 0 {
        return Err(DspError::InvalidConfig("epoch count must be positive".into()));
    }
    Ok(match signal {
        Signal::Real(data) => Signal::real(join(data, amount)?),
        Signal::Complex(data) => Signal::complex(join(data, amount)?),
    })
}

/// `(count, length)` of the epochs cut from `samples` samples.
fn epoch_geometry(mode: EpochMode, amount: usize, samples: usize) -> DspResult<(usize, usize)> {
    if amount == 0 {
        return Err(DspError::InvalidConfig("epoch length or count must be positive".into()));
    }
    match mode {
        EpochMode::EpochLength => {
            let length = amount.min(samples);
            if length == 0 {
                return Err(DspError::InsufficientData { needed: 1, got: 0 });
            }
            Ok((samples / length, length))
        }
        EpochMode::EpochCount => {
            if amount > samples {
                return Err(DspError::InvalidConfig(format!(
                    "{amount} epochs leave no samples out of {samples}"
                )));
            }
            Ok((amount, samples / amount))
        }
    }
}

fn cut<A: Clone>(data: &ArrayD<A>, count: usize, length: usize) -> DspResult<Array3<A>> {
    let data = data.view().into_dimensionality::<Ix2>().map_err(|_| DspError::AxisCount {
        expected: "2",
        actual: data.ndim(),
    })?;
    Ok(Array3::from_shape_fn((count, data.nrows(), length), |(k, c, t)| {
        data[[c, k * length + t]].clone()
    }))
}

fn join<A: Clone>(data: &ArrayD<A>, amount: usize) -> DspResult<Array2<A>> {
    let data = data.view().into_dimensionality::<Ix3>().map_err(|_| DspError::AxisCount {
        expected: "3",
        actual: data.ndim(),
    })?;
    let (epochs, channels, length) = data.dim();
    let keep = amount.min(epochs);
    Ok(Array2::from_shape_fn((channels, keep * length), |(c, s)| {
        data[[s / length, c, s % length]].clone()
    }))
}
