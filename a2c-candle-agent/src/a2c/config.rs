//! Configuration of A2C agent.
use super::ActorCriticModelConfig;
use crate::{util::OutDim, Device};
use a2c_core::error::A2cError;
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`A2c`](super::A2c) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct A2cConfig<P>
where
    P: OutDim,
{
    /// Configuration of the network and the optimizer.
    pub model_config: ActorCriticModelConfig<P>,

    /// Weight of the critic loss.
    pub critic_coef: f64,

    /// Weight of the entropy bonus.
    pub entropy_coef: f64,

    /// Maximum norm of the gradient.
    pub clip_grad_norm: f64,

    /// Device on which the model is placed.
    pub device: Option<Device>,

    /// Random seed for sampling actions.
    pub seed: u64,
}

impl<P> Default for A2cConfig<P>
where
    P: OutDim,
{
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            critic_coef: 0.5,
            entropy_coef: 0.01,
            clip_grad_norm: 0.5,
            device: None,
            seed: 42,
        }
    }
}

impl<P> A2cConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the model.
    pub fn model_config(mut self, v: ActorCriticModelConfig<P>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the weight of the critic loss.
    pub fn critic_coef(mut self, v: f64) -> Self {
        self.critic_coef = v;
        self
    }

    /// Sets the weight of the entropy bonus.
    pub fn entropy_coef(mut self, v: f64) -> Self {
        self.entropy_coef = v;
        self
    }

    /// Sets the maximum norm of the gradient.
    pub fn clip_grad_norm(mut self, v: f64) -> Self {
        self.clip_grad_norm = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks the ranges of the parameters.
    pub fn validate(&self) -> Result<(), A2cError> {
        let invalid = |msg: String| Err(A2cError::InvalidConfig(msg));

        if !(self.critic_coef.is_finite() && self.critic_coef >= 0.0) {
            return invalid(format!("critic_coef must be non-negative, got {}", self.critic_coef));
        }
        if !(self.entropy_coef.is_finite() && self.entropy_coef >= 0.0) {
            return invalid(format!(
                "entropy_coef must be non-negative, got {}",
                self.entropy_coef
            ));
        }
        if !(self.clip_grad_norm > 0.0) {
            return invalid(format!(
                "clip_grad_norm must be positive, got {}",
                self.clip_grad_norm
            ));
        }
        let lr = self.model_config.opt_config.get_learning_rate();
        if !(lr.is_finite() && lr > 0.0) {
            return invalid(format!("learning rate must be positive, got {}", lr));
        }
        if self.model_config.net_config.is_none() {
            return invalid("net_config is not set".into());
        }
        Ok(())
    }

    /// Constructs [`A2cConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`A2cConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cnn::{CnnConfig, ObsNormalization},
        opt::OptimizerConfig,
    };
    use tempdir::TempDir;

    fn config() -> A2cConfig<CnnConfig> {
        let model_config = ActorCriticModelConfig::default()
            .net_config(CnnConfig::new(1, 3).normalization(ObsNormalization::UnitInterval))
            .opt_config(OptimizerConfig::Adam { lr: 1e-4 });
        A2cConfig::default()
            .model_config(model_config)
            .entropy_coef(0.02)
            .device(Device::Cpu)
    }

    #[test]
    fn test_serde_a2c_config() -> Result<()> {
        let config = config();
        let dir = TempDir::new("a2c_config")?;
        let path = dir.path().join("a2c_config.yaml");
        config.save(&path)?;
        let config_ = A2cConfig::<CnnConfig>::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());
        assert!(config().clip_grad_norm(0.0).validate().is_err());
        assert!(config().entropy_coef(-1.0).validate().is_err());
        assert!(config().critic_coef(f64::NAN).validate().is_err());
        assert!(A2cConfig::<CnnConfig>::default().validate().is_err());

        let model_config = config()
            .model_config
            .opt_config(OptimizerConfig::Sgd { lr: 0.0 });
        assert!(config().model_config(model_config).validate().is_err());
    }
}
