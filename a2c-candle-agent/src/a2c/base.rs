//! A2C agent implemented with candle.
use super::{A2cConfig, ActorCriticModel};
use crate::{
    model::SubModel1,
    util::{cat_batch, OutDim},
};
use a2c_core::{
    error::A2cError,
    record::{Record, RecordValue::Scalar},
    Agent, Env, Policy, TrajectoryBatch,
};
use anyhow::{Context, Result};
use candle_core::{Device, Tensor};
use log::warn;
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

/// Synchronous advantage actor-critic agent.
///
/// # Optimization step
///
/// Given a batch of observations `s`, actions `a` and target values `G`,
///
/// * `advantage = G - V(s)`,
/// * `critic_loss = mean(advantage^2)`,
/// * `actor_loss = -mean(log pi(a|s) * advantage)`, where `advantage` is detached,
/// * `loss = critic_coef * critic_loss + actor_loss - entropy_coef * entropy`.
///
/// One gradient step is taken on `loss` with the gradient norm clipped to `clip_grad_norm`.
/// If the loss or the gradient norm is not finite, the step is skipped and the returned
/// record has `update_skipped = 1`.
///
/// Observations are converted to tensors with a leading batch dimension of size 1 and
/// concatenated along it. Actions are converted from and to indices.
pub struct A2c<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
{
    model: ActorCriticModel<P>,
    critic_coef: f64,
    entropy_coef: f64,
    train: bool,
    n_opts: usize,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E, P> A2c<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    E::Act: From<usize> + Into<usize>,
{
    /// Constructs A2C agent.
    ///
    /// Fails with [`A2cError::InvalidConfig`](a2c_core::error::A2cError::InvalidConfig)
    /// before any parameter is created if `config` is invalid.
    pub fn build(config: A2cConfig<P::Config>) -> Result<Self> {
        config.validate()?;
        let device: Device = config
            .device
            .context("No device is given for A2C agent")?
            .try_into()?;
        let model = ActorCriticModel::build(config.model_config, config.clip_grad_norm, device)?;

        Ok(Self {
            model,
            critic_coef: config.critic_coef,
            entropy_coef: config.entropy_coef,
            train: false,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }

    /// Returns the actor-critic model.
    pub fn model(&self) -> &ActorCriticModel<P> {
        &self.model
    }

    /// Returns the number of optimization steps, including skipped ones.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    fn obs_to_tensor(obs: Vec<E::Obs>) -> Result<Tensor> {
        let xs = obs
            .into_iter()
            .map(|o| o.try_into())
            .collect::<Result<Vec<Tensor>, _>>()?;
        cat_batch(xs)
    }

    fn act_to_tensor(&self, act: Vec<E::Act>) -> Result<Tensor> {
        let act: Vec<u32> = act.into_iter().map(|a| Into::<usize>::into(a) as u32).collect();
        let n = act.len();
        Ok(Tensor::from_vec(act, (n,), self.model.device())?)
    }

    fn reflect(&mut self, batch: TrajectoryBatch<E::Obs, E::Act>) -> Result<Record> {
        anyhow::ensure!(!batch.is_empty(), "Empty batch");
        let (obs, act, target) = batch.unpack();
        let n = target.len();
        let obs = Self::obs_to_tensor(obs)?;
        let act = self.act_to_tensor(act)?;
        let target = Tensor::from_vec(target, (n,), self.model.device())?;

        let (values, log_p, entropy) = self.model.evaluate(&obs, &act)?;
        let adv = (target - &values)?;
        let critic_loss = adv.sqr()?.mean_all()?;
        let actor_loss = (log_p * adv.detach())?.mean_all()?.neg()?;
        let loss = ((&critic_loss * self.critic_coef)? + &actor_loss)?;
        let loss = (loss - (&entropy * self.entropy_coef)?)?;

        let loss_value = loss.to_scalar::<f32>()?;
        let grad_norm = match loss_value.is_finite() {
            true => self.model.update(&loss)?,
            false => None,
        };
        self.n_opts += 1;

        let mut record = Record::from_slice(&[
            ("loss", Scalar(loss_value)),
            ("loss_critic", Scalar(critic_loss.to_scalar::<f32>()?)),
            ("loss_actor", Scalar(actor_loss.to_scalar::<f32>()?)),
            ("entropy", Scalar(entropy.to_scalar::<f32>()?)),
            ("value_mean", Scalar(values.mean_all()?.to_scalar::<f32>()?)),
        ]);
        match grad_norm {
            Some(norm) => {
                record.insert("grad_norm", Scalar(norm));
                record.insert("update_skipped", Scalar(0.0));
            }
            None => {
                match loss_value.is_finite() {
                    true => warn!("Skipped update {}: non-finite gradient", self.n_opts),
                    false => warn!(
                        "Skipped update {}: {}",
                        self.n_opts,
                        A2cError::NonFiniteLoss(loss_value)
                    ),
                }
                record.insert("update_skipped", Scalar(1.0));
            }
        }

        Ok(record)
    }
}

impl<E, P> Policy<E> for A2c<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    E::Act: From<usize> + Into<usize>,
{
    /// Samples an action in training mode, takes the most probable one in evaluation mode.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let obs: Tensor = obs.clone().try_into()?;
        let act = self.model.act(&obs, &mut self.rng, !self.train)?;
        let act = *act.first().context("No action")?;
        Ok(act.into())
    }
}

impl<E, P> Agent<E> for A2c<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: DeserializeOwned + Serialize + OutDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: TryInto<Tensor, Error = candle_core::Error>,
    E::Act: From<usize> + Into<usize>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn value(&mut self, obs: &[E::Obs]) -> Result<Vec<f32>> {
        let obs = Self::obs_to_tensor(obs.to_vec())?;
        Ok(self.model.value_only(&obs)?.to_vec1::<f32>()?)
    }

    fn opt(&mut self, batch: TrajectoryBatch<E::Obs, E::Act>) -> Result<Record> {
        self.reflect(batch)
    }
}
