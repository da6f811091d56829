//! Multilayer perceptron with actor and critic heads.
mod base;
mod config;
pub use base::Mlp;
pub use config::MlpConfig;
