//! Configuration of [`CatchEnv`](super::CatchEnv).
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Configurations of [`CatchEnv`](super::CatchEnv).
///
/// The frame size, 84, must be divisible by both `n_rows` and `n_cols`.
pub struct CatchEnvConfig {
    pub(super) n_rows: usize,
    pub(super) n_cols: usize,
}

impl Default for CatchEnvConfig {
    fn default() -> Self {
        Self {
            n_rows: 12,
            n_cols: 12,
        }
    }
}

impl CatchEnvConfig {
    /// Sets the number of rows of the grid.
    pub fn n_rows(mut self, v: usize) -> Self {
        self.n_rows = v;
        self
    }

    /// Sets the number of columns of the grid.
    pub fn n_cols(mut self, v: usize) -> Self {
        self.n_cols = v;
        self
    }
}
