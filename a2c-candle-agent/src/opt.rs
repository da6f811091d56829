//! Optimizers.
use anyhow::Result;
use candle_core::{backprop::GradStore, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW, SGD};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Configuration of optimizer for training neural networks in an RL agent.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// AdamW optimizer.
    AdamW {
        /// Learning rate.
        lr: f64,
        #[serde(default = "default_beta1")]
        /// Decay rate of the first moment.
        beta1: f64,
        #[serde(default = "default_beta2")]
        /// Decay rate of the second moment.
        beta2: f64,
        #[serde(default = "default_eps")]
        /// Term added to the denominator.
        eps: f64,
        #[serde(default = "default_weight_decay")]
        /// Weight decay.
        weight_decay: f64,
    },

    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// Stochastic gradient descent.
    Sgd {
        /// Learning rate.
        lr: f64,
    },
}

fn default_beta1() -> f64 {
    ParamsAdamW::default().beta1
}

fn default_beta2() -> f64 {
    ParamsAdamW::default().beta2
}

fn default_eps() -> f64 {
    ParamsAdamW::default().eps
}

fn default_weight_decay() -> f64 {
    ParamsAdamW::default().weight_decay
}

impl OptimizerConfig {
    /// Constructs an optimizer of the given variables.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        match &self {
            OptimizerConfig::AdamW {
                lr,
                beta1,
                beta2,
                eps,
                weight_decay,
            } => {
                let params = ParamsAdamW {
                    lr: *lr,
                    beta1: *beta1,
                    beta2: *beta2,
                    eps: *eps,
                    weight_decay: *weight_decay,
                };
                let opt = AdamW::new(vars, params)?;
                Ok(Optimizer::AdamW(opt))
            }
            OptimizerConfig::Adam { lr } => {
                let params = ParamsAdam {
                    lr: *lr,
                    ..ParamsAdam::default()
                };
                let opt = Adam::new(vars, params)?;
                Ok(Optimizer::Adam(opt))
            }
            OptimizerConfig::Sgd { lr } => Ok(Optimizer::Sgd(SGD::new(vars, *lr)?)),
        }
    }

    /// Returns the learning rate.
    pub fn get_learning_rate(&self) -> f64 {
        match self {
            Self::AdamW { lr, .. } | Self::Adam { lr } | Self::Sgd { lr } => *lr,
        }
    }

    /// Override learning rate.
    pub fn learning_rate(self, lr: f64) -> Self {
        match self {
            Self::AdamW {
                lr: _,
                beta1,
                beta2,
                eps,
                weight_decay,
            } => Self::AdamW {
                lr,
                beta1,
                beta2,
                eps,
                weight_decay,
            },
            Self::Adam { lr: _ } => Self::Adam { lr },
            Self::Sgd { lr: _ } => Self::Sgd { lr },
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 7e-4 }
    }
}

/// Optimizers.
pub enum Optimizer {
    /// AdamW optimizer.
    AdamW(AdamW),

    /// Adam optimizer.
    Adam(Adam),

    /// Stochastic gradient descent.
    Sgd(SGD),
}

impl Optimizer {
    /// Updates the variables with the given gradients.
    pub fn step(&mut self, grads: &GradStore) -> Result<()> {
        match self {
            Self::AdamW(opt) => Ok(opt.step(grads)?),
            Self::Adam(opt) => Ok(opt.step(grads)?),
            Self::Sgd(opt) => Ok(opt.step(grads)?),
        }
    }
}
