use crate::util::OutDim;
use serde::{Deserialize, Serialize};

/// Scaling of pixel values before the first convolution.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy, Default)]
pub enum ObsNormalization {
    /// Pixel values are used as they are, in `[0, 255]`.
    #[default]
    Raw,

    /// Pixel values are divided by 255.
    UnitInterval,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Cnn`](super::Cnn).
pub struct CnnConfig {
    /// The number of stacked frames. The input shape is `[batch, n_stack, 84, 84]`.
    pub n_stack: i64,

    /// The number of actions.
    pub out_dim: i64,

    /// Scaling of pixel values.
    #[serde(default)]
    pub normalization: ObsNormalization,
}

impl CnnConfig {
    /// Constructs [`CnnConfig`].
    pub fn new(n_stack: i64, out_dim: i64) -> Self {
        Self {
            n_stack,
            out_dim,
            normalization: ObsNormalization::default(),
        }
    }

    /// Sets the scaling of pixel values.
    pub fn normalization(mut self, v: ObsNormalization) -> Self {
        self.normalization = v;
        self
    }
}

impl OutDim for CnnConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: i64) {
        self.out_dim = v;
    }
}
