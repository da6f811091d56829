//! Synchronous advantage actor-critic.
mod base;
mod config;
mod model;
pub use base::A2c;
pub use config::A2cConfig;
pub use model::{ActorCriticModel, ActorCriticModelConfig};
