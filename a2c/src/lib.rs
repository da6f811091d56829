//! Synchronous advantage actor-critic (A2C) with bootstrapped n-step returns and
//! generalized advantage estimation.
//!
//! The learner consists of the following crates:
//!
//! * [a2c-core](a2c_core) provides backend-independent traits of environments and agents,
//!   return estimation, the trajectory buffer, environment workers and the synchronous
//!   training loop.
//! * [a2c-candle-agent](a2c_candle_agent) implements the policy-value network and the
//!   optimization step on [candle](https://crates.io/crates/candle-core).
//! * [a2c-catch-env](a2c_catch_env) is a small environment with 84x84 pixel observations.
//! * [a2c-tensorboard](a2c_tensorboard) writes records to TensorBoard event files via
//!   [tensorboard-rs](https://crates.io/crates/tensorboard-rs).
//!
//! This crate re-exports them and has an example training an agent in Catch:
//!
//! ```bash
//! cargo run --release --example a2c_catch -- --max-frames 200000 --logdir ./runs/catch
//! ```
//!
//! [`catch_agent_config`] and [`catch_trainer_config`] give the configurations used by the
//! example.
pub use a2c_candle_agent;
pub use a2c_catch_env;
pub use a2c_core;
pub use a2c_tensorboard;

use a2c_candle_agent::{
    a2c::{A2cConfig, ActorCriticModelConfig},
    cnn::{CnnConfig, ObsNormalization},
    opt::OptimizerConfig,
    Device,
};
use a2c_catch_env::CatchAct;
use a2c_core::{returns::ReturnConfig, TrainerConfig};

/// Returns the configuration of an agent for Catch.
///
/// The network takes a single frame, scaled to `[0, 1]`, and outputs logits of the three
/// paddle moves.
pub fn catch_agent_config(lr: f64, device: Device) -> A2cConfig<CnnConfig> {
    let model_config = ActorCriticModelConfig::default()
        .net_config(
            CnnConfig::new(1, CatchAct::N as i64).normalization(ObsNormalization::UnitInterval),
        )
        .opt_config(OptimizerConfig::default().learning_rate(lr));
    A2cConfig::default()
        .model_config(model_config)
        .device(device)
}

/// Returns the configuration of the training loop for Catch.
pub fn catch_trainer_config(
    max_frames: usize,
    n_workers: usize,
    batch_size: usize,
    returns: ReturnConfig,
) -> TrainerConfig {
    TrainerConfig::default()
        .max_frames(max_frames)
        .n_workers(n_workers)
        .batch_size(batch_size)
        .report_interval(n_workers * batch_size * 100)
        .returns(returns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_configs_are_valid() {
        assert!(catch_agent_config(7e-4, Device::Cpu).validate().is_ok());
        assert!(catch_trainer_config(1000, 4, 5, ReturnConfig::default())
            .validate()
            .is_ok());
        assert!(catch_agent_config(0.0, Device::Cpu).validate().is_err());
    }
}
