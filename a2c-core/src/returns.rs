//! Estimation of regression targets for the critic.
//!
//! Two estimators are provided, selected with [`ReturnEstimator`]:
//!
//! * [`bootstrapped_returns`]: n-step discounted returns bootstrapped with the critic's
//!   estimate of the state following the segment,
//! * [`gae`]: generalized advantage estimation,
//!   `A_t = δ_t + γλ A_{t+1}` with `δ_t = r_t + γ V(s_{t+1}) - V(s_t)`.
//!
//! Neither estimator looks past a done flag. At a terminal step the bootstrap term
//! is zero, as there is no continuation of the episode.
use crate::error::A2cError;
use serde::{Deserialize, Serialize};

/// Selects how target values are computed from a segment.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum ReturnEstimator {
    /// Bootstrapped n-step returns.
    Bootstrap,

    /// Generalized advantage estimation. The target value is `A_t + V(s_t)`.
    Gae {
        /// Exponential weight of the n-step advantage estimates, `0 <= lambda <= 1`.
        lambda: f32,
    },
}

impl Default for ReturnEstimator {
    fn default() -> Self {
        Self::Bootstrap
    }
}

/// Configuration of return estimation.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReturnConfig {
    /// Discount factor, `0 < gamma < 1`.
    pub gamma: f32,

    /// Estimator.
    pub estimator: ReturnEstimator,
}

impl Default for ReturnConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            estimator: ReturnEstimator::Bootstrap,
        }
    }
}

impl ReturnConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the estimator.
    pub fn estimator(mut self, v: ReturnEstimator) -> Self {
        self.estimator = v;
        self
    }

    /// Checks the ranges of the parameters.
    pub fn validate(&self) -> Result<(), A2cError> {
        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return Err(A2cError::InvalidConfig(format!(
                "gamma must be in (0, 1), got {}",
                self.gamma
            )));
        }
        if let ReturnEstimator::Gae { lambda } = self.estimator {
            if !(0.0..=1.0).contains(&lambda) {
                return Err(A2cError::InvalidConfig(format!(
                    "lambda must be in [0, 1], got {}",
                    lambda
                )));
            }
        }
        Ok(())
    }
}

/// Computes discounted values of every state in a segment, including the state after it.
///
/// The returned vector has `rewards.len() + 1` elements; the last one is `bootstrap`.
/// Fails with [`A2cError::InvalidSegment`] if `dones` is not as long as `rewards`.
pub fn discounted_values(
    rewards: &[f32],
    dones: &[bool],
    bootstrap: f32,
    gamma: f32,
) -> Result<Vec<f32>, A2cError> {
    check_len("dones", rewards.len(), dones.len())?;
    let n = rewards.len();
    let mut values = vec![0f32; n + 1];
    values[n] = bootstrap;

    for i in (0..n).rev() {
        values[i] = match dones[i] {
            true => rewards[i],
            false => rewards[i] + gamma * values[i + 1],
        };
    }

    Ok(values)
}

fn check_len(name: &str, expected: usize, got: usize) -> Result<(), A2cError> {
    match expected == got {
        true => Ok(()),
        false => Err(A2cError::InvalidSegment(format!(
            "expected {} {}, got {}",
            expected, name, got
        ))),
    }
}

/// Bootstrapped n-step returns of a segment.
///
/// `bootstrap` is the value estimate of the state following the last step. It is ignored
/// when the last step is terminal.
pub fn bootstrapped_returns(
    rewards: &[f32],
    dones: &[bool],
    bootstrap: f32,
    gamma: f32,
) -> Result<Vec<f32>, A2cError> {
    let mut values = discounted_values(rewards, dones, bootstrap, gamma)?;
    values.pop();
    Ok(values)
}

/// Generalized advantage estimates of a segment.
///
/// `values` holds the critic's estimates `V(s_0), ..., V(s_T)`, one more than `rewards`.
/// Other lengths are rejected with [`A2cError::InvalidSegment`].
pub fn gae(
    rewards: &[f32],
    values: &[f32],
    dones: &[bool],
    gamma: f32,
    lambda: f32,
) -> Result<Vec<f32>, A2cError> {
    check_len("values", rewards.len() + 1, values.len())?;
    check_len("dones", rewards.len(), dones.len())?;
    let n = rewards.len();
    let mut advantages = vec![0f32; n];
    let mut acc = 0f32;

    for i in (0..n).rev() {
        let not_done = if dones[i] { 0f32 } else { 1f32 };
        let delta = rewards[i] + gamma * not_done * values[i + 1] - values[i];
        acc = delta + gamma * lambda * not_done * acc;
        advantages[i] = acc;
    }

    Ok(advantages)
}

/// Regression targets of the critic for a segment.
///
/// `values` must hold `V(s_0), ..., V(s_T)` for [`ReturnEstimator::Gae`]; for
/// [`ReturnEstimator::Bootstrap`] only its last element, `V(s_T)`, is used.
pub fn target_values(
    config: &ReturnConfig,
    rewards: &[f32],
    dones: &[bool],
    values: &[f32],
) -> Result<Vec<f32>, A2cError> {
    let bootstrap = values.last().copied().unwrap_or(0.0);
    match config.estimator {
        ReturnEstimator::Bootstrap => bootstrapped_returns(rewards, dones, bootstrap, config.gamma),
        ReturnEstimator::Gae { lambda } => Ok(gae(rewards, values, dones, config.gamma, lambda)?
            .into_iter()
            .zip(values.iter())
            .map(|(a, v)| a + v)
            .collect()),
    }
}
