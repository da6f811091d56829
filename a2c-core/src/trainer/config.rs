//! Configuration of [`Trainer`](super::Trainer).
use crate::{error::A2cError, returns::ReturnConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of environment steps, summed over all workers, after which training stops.
    pub max_frames: usize,

    /// The number of environment steps each worker takes per cycle.
    pub batch_size: usize,

    /// The number of workers.
    pub n_workers: usize,

    /// Interval of reporting in environment steps.
    pub report_interval: usize,

    /// Interval of evaluation in cycles. `0` disables evaluation.
    pub eval_interval: usize,

    /// Random seed of the environment of the first worker. The `i`-th worker uses `seed + i`.
    pub seed: i64,

    /// The number of consecutive environment faults after which a worker gives up.
    /// `None` lets workers retry forever.
    pub max_env_faults: Option<usize>,

    /// Delay in milliseconds before the second consecutive recovery attempt of a worker.
    /// The delay doubles with every further consecutive fault.
    pub env_fault_backoff_ms: u64,

    /// Return estimation.
    pub returns: ReturnConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_frames: 0,
            batch_size: 5,
            n_workers: 16,
            report_interval: 10_000,
            eval_interval: 0,
            seed: 42,
            max_env_faults: None,
            env_fault_backoff_ms: 100,
            returns: ReturnConfig::default(),
        }
    }
}

impl TrainerConfig {
    /// Sets the frame budget.
    pub fn max_frames(mut self, v: usize) -> Self {
        self.max_frames = v;
        self
    }

    /// Sets the number of steps per worker per cycle.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of workers.
    pub fn n_workers(mut self, v: usize) -> Self {
        self.n_workers = v;
        self
    }

    /// Sets the interval of reporting in environment steps.
    pub fn report_interval(mut self, v: usize) -> Self {
        self.report_interval = v;
        self
    }

    /// Sets the interval of evaluation in cycles.
    pub fn eval_interval(mut self, v: usize) -> Self {
        self.eval_interval = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Makes workers give up after `v` consecutive environment faults.
    pub fn max_env_faults(mut self, v: usize) -> Self {
        self.max_env_faults = Some(v);
        self
    }

    /// Sets the initial backoff delay of environment recovery in milliseconds.
    pub fn env_fault_backoff_ms(mut self, v: u64) -> Self {
        self.env_fault_backoff_ms = v;
        self
    }

    /// Sets the configuration of return estimation.
    pub fn returns(mut self, v: ReturnConfig) -> Self {
        self.returns = v;
        self
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), A2cError> {
        if self.batch_size == 0 {
            return Err(A2cError::InvalidConfig("batch_size must be positive".into()));
        }
        if self.n_workers == 0 {
            return Err(A2cError::InvalidConfig("n_workers must be positive".into()));
        }
        if self.report_interval == 0 {
            return Err(A2cError::InvalidConfig(
                "report_interval must be positive".into(),
            ));
        }
        self.returns.validate()
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::ReturnEstimator;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .max_frames(1_000_000)
            .n_workers(4)
            .max_env_faults(20)
            .returns(
                ReturnConfig::default()
                    .gamma(0.95)
                    .estimator(ReturnEstimator::Gae { lambda: 0.95 }),
            );

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(TrainerConfig::default().validate().is_ok());
        assert!(TrainerConfig::default().batch_size(0).validate().is_err());
        assert!(TrainerConfig::default().n_workers(0).validate().is_err());
        assert!(TrainerConfig::default()
            .returns(ReturnConfig::default().gamma(1.0))
            .validate()
            .is_err());
    }
}
