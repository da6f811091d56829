//! Convolutional neural network with actor and critic heads.
mod base;
mod config;
pub use base::Cnn;
pub use config::{CnnConfig, ObsNormalization};
