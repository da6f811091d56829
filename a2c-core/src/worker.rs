//! Environment worker.
use crate::{
    error::A2cError,
    record::MonitorLog,
    returns::{target_values, ReturnConfig, ReturnEstimator},
    Agent, Env, TrainerConfig, TrajectoryBatch,
};
use anyhow::{bail, Result};
use log::{trace, warn};
use std::{thread, time::Duration};

const MAX_BACKOFF_MS: u64 = 10_000;

/// A segment produced by [`Worker::get_batch`].
pub type Segment<E> = TrajectoryBatch<<E as Env>::Obs, <E as Env>::Act>;

/// Owns one environment and its current observation, and produces fixed-length
/// segments of experience.
///
/// # Fault handling
///
/// An error returned by [`Env::step`] does not abort [`Worker::get_batch`]. The worker
/// marks the last collected transition as the end of an episode, so that no return
/// is bootstrapped across the fault, resets the environment and continues. If
/// resetting fails as well, the environment is rebuilt from its configuration.
///
/// Recovery is retried until it succeeds. From the second consecutive fault on, the
/// worker sleeps before retrying, starting at `env_fault_backoff_ms` and doubling up to
/// ten seconds. A successful step clears the streak. Only if `max_env_faults` is set,
/// a longer streak makes [`Worker::get_batch`] fail with [`A2cError::EnvironmentFault`].
pub struct Worker<E: Env> {
    env: E,
    env_config: E::Config,
    seed: i64,
    obs: E::Obs,
    episode_reward: f32,
    batch_size: usize,
    returns: ReturnConfig,
    max_env_faults: Option<usize>,
    backoff_ms: u64,
    n_consecutive_faults: usize,
    n_faults: usize,
}

impl<E: Env> Worker<E> {
    /// Builds a worker and resets its environment.
    pub fn build(env_config: &E::Config, seed: i64, config: &TrainerConfig) -> Result<Self> {
        let mut env = E::build(env_config, seed)?;
        let obs = env.reset()?;

        Ok(Self {
            env,
            env_config: env_config.clone(),
            seed,
            obs,
            episode_reward: 0.0,
            batch_size: config.batch_size,
            returns: config.returns.clone(),
            max_env_faults: config.max_env_faults,
            backoff_ms: config.env_fault_backoff_ms,
            n_consecutive_faults: 0,
            n_faults: 0,
        })
    }

    /// Returns the current observation.
    pub fn obs(&self) -> &E::Obs {
        &self.obs
    }

    /// Returns the cumulative reward of the ongoing episode.
    pub fn episode_reward(&self) -> f32 {
        self.episode_reward
    }

    /// Returns the number of environment faults the worker has encountered.
    ///
    /// Failed steps, resets and rebuilds are counted separately.
    pub fn n_faults(&self) -> usize {
        self.n_faults
    }

    fn backoff(&self) -> Duration {
        let ms = match self.n_consecutive_faults {
            0 | 1 => 0,
            k => {
                let shift = (k - 2).min(16) as u32;
                self.backoff_ms.saturating_mul(1 << shift).min(MAX_BACKOFF_MS)
            }
        };
        Duration::from_millis(ms)
    }

    fn on_fault(&mut self, e: anyhow::Error) -> Result<()> {
        self.n_faults += 1;
        self.n_consecutive_faults += 1;

        if let Some(max) = self.max_env_faults {
            if self.n_consecutive_faults > max {
                return Err(A2cError::EnvironmentFault(format!(
                    "{} consecutive faults, last: {:#}",
                    self.n_consecutive_faults, e
                ))
                .into());
            }
        }

        let delay = self.backoff();
        warn!(
            "Environment fault ({} in a row), recovering in {} ms: {:#}",
            self.n_consecutive_faults,
            delay.as_millis(),
            e
        );
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        Ok(())
    }

    fn reset_or_rebuild(&mut self) -> Result<E::Obs> {
        match self.env.reset() {
            Ok(obs) => Ok(obs),
            Err(e) => {
                warn!("Failed to reset the environment, rebuilding it: {}", e);
                self.n_faults += 1;
                self.env = E::build(&self.env_config, self.seed)?;
                self.env.reset()
            }
        }
    }

    fn recover(&mut self) -> Result<E::Obs> {
        loop {
            match self.reset_or_rebuild() {
                Ok(obs) => return Ok(obs),
                Err(e) => self.on_fault(e)?,
            }
        }
    }

    /// Collects `batch_size` transitions with `agent` and computes their target values.
    ///
    /// Returns of finished episodes are appended to `log`.
    pub fn get_batch<A: Agent<E>>(
        &mut self,
        agent: &mut A,
        log: &mut MonitorLog,
    ) -> Result<Segment<E>> {
        let n = self.batch_size;
        let mut obs = Vec::with_capacity(n);
        let mut act = Vec::with_capacity(n);
        let mut rewards = Vec::with_capacity(n);
        let mut dones = Vec::with_capacity(n);

        while rewards.len() < n {
            let a = agent.sample(&self.obs)?;

            match self.env.step(&a) {
                Ok((step, _)) => {
                    self.n_consecutive_faults = 0;
                    let is_done = step.is_done();
                    self.episode_reward += step.reward;
                    rewards.push(step.reward);
                    dones.push(is_done);
                    act.push(a);
                    obs.push(std::mem::replace(&mut self.obs, step.obs));

                    if is_done {
                        trace!("Episode finished with return {}", self.episode_reward);
                        log.push_episode_reward(self.episode_reward);
                        self.episode_reward = 0.0;
                        self.obs = self.recover()?;
                    }
                }
                Err(e) => {
                    self.on_fault(e.context("environment step failed"))?;

                    // The interrupted episode is not logged.
                    if let Some(done) = dones.last_mut() {
                        *done = true;
                    }
                    self.episode_reward = 0.0;
                    self.obs = self.recover()?;
                }
            }
        }

        let values = match self.returns.estimator {
            ReturnEstimator::Bootstrap => match dones.last() {
                Some(true) => vec![0.0],
                _ => agent.value(std::slice::from_ref(&self.obs))?,
            },
            ReturnEstimator::Gae { .. } => {
                let mut all = obs.clone();
                all.push(self.obs.clone());
                let values = agent.value(&all)?;
                if values.len() != n + 1 {
                    bail!("Expected {} values, got {}", n + 1, values.len());
                }
                values
            }
        };
        let target = target_values(&self.returns, &rewards, &dones, &values)?;

        Ok(TrajectoryBatch { obs, act, target })
    }
}
