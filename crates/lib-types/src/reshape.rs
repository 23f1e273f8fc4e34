//! Options for temporal downsampling and epoch bookkeeping.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How each downsampling buffer is reduced to one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleMode {
    /// Mean over the buffer; `overlap` buffers start within each buffer length.
    Smooth { overlap: usize },
    /// Keep the sample at the buffer center.
    Pick,
}

impl Default for DownsampleMode {
    fn default() -> Self {
        Self::Smooth { overlap: 1 }
    }
}

/// Meaning of the length argument when cutting a continuous block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EpochMode {
    /// The argument is the epoch length in samples.
    #[default]
    EpochLength,
    /// The argument is the number of epochs.
    EpochCount,
}

impl FromStr for EpochMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "epoch-length" | "epochlength" | "length" => Ok(Self::EpochLength),
            "epoch-count" | "epochnum" | "count" => Ok(Self::EpochCount),
            _ => Err(TypeError::UnknownTag {
                kind: "epoch mode",
                value: s.to_string(),
            }),
        }
    }
}
