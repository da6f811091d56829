use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{clip_grad_norm, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{
    ops::{log_softmax, softmax},
    VarBuilder, VarMap,
};
use log::trace;
use rand::{distributions::WeightedIndex, Rng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`ActorCriticModel`].
pub struct ActorCriticModelConfig<P>
where
    P: OutDim,
{
    /// Configuration of the network.
    pub net_config: Option<P>,

    /// Configuration of the optimizer, including the learning rate.
    pub opt_config: OptimizerConfig,
}

impl<P> Default for ActorCriticModelConfig<P>
where
    P: OutDim,
{
    fn default() -> Self {
        Self {
            net_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<P> ActorCriticModelConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations of the network.
    pub fn net_config(mut self, v: P) -> Self {
        self.net_config = Some(v);
        self
    }

    /// Sets output dimension of the model.
    pub fn out_dim(mut self, v: i64) -> Self {
        if let Some(net_config) = &mut self.net_config {
            net_config.set_out_dim(v);
        }
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// A network with actor and critic heads, owning its parameters and optimizer.
///
/// The network `P` maps a batch of observations to `(logits, values)`.
pub struct ActorCriticModel<P>
where
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
{
    device: Device,
    varmap: VarMap,
    net: P,
    opt: Optimizer,
    clip_grad_norm: f64,
}

impl<P> ActorCriticModel<P>
where
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`ActorCriticModel`].
    pub fn build(
        config: ActorCriticModelConfig<P::Config>,
        clip_grad_norm: f64,
        device: Device,
    ) -> Result<Self> {
        let net_config = config.net_config.context("net_config is not set.")?;
        let varmap = VarMap::new();
        let net = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            P::build(vb, net_config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            device,
            varmap,
            net,
            opt,
            clip_grad_norm,
        })
    }

    /// Returns action logits and state values.
    pub fn forward(&self, obs: &Tensor) -> Result<(Tensor, Tensor)> {
        self.net.forward(&obs.to_device(&self.device)?)
    }

    /// Selects an action for every observation in the batch.
    ///
    /// Actions are sampled from the policy, or the most probable ones are taken if
    /// `greedy` is `true`.
    pub fn act(&self, obs: &Tensor, rng: &mut impl Rng, greedy: bool) -> Result<Vec<usize>> {
        let (logits, _) = self.forward(obs)?;

        if greedy {
            let act = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
            Ok(act.into_iter().map(|a| a as usize).collect())
        } else {
            let probs = softmax(&logits.detach(), D::Minus1)?.to_vec2::<f32>()?;
            probs
                .iter()
                .map(|p| -> Result<usize> { Ok(rng.sample(WeightedIndex::new(p)?)) })
                .collect()
        }
    }

    /// Returns state values, log-probabilities of the given actions, and the mean entropy
    /// of the policy over the batch.
    ///
    /// `act` is a `u32` tensor of shape `[batch]`. Log-probabilities are computed with
    /// log-softmax of the logits, not by taking the log of probabilities.
    pub fn evaluate(&self, obs: &Tensor, act: &Tensor) -> Result<(Tensor, Tensor, Tensor)> {
        let (logits, values) = self.forward(obs)?;
        let log_p = log_softmax(&logits, D::Minus1)?;
        let entropy = (log_p.exp()? * &log_p)?
            .sum(D::Minus1)?
            .mean_all()?
            .neg()?;
        let act = act.to_device(&self.device)?.unsqueeze(D::Minus1)?;
        let log_p_act = log_p.gather(&act, D::Minus1)?.squeeze(D::Minus1)?;
        Ok((values, log_p_act, entropy))
    }

    /// Returns state values, detached from the computation graph.
    pub fn value_only(&self, obs: &Tensor) -> Result<Tensor> {
        let (_, values) = self.forward(obs)?;
        Ok(values.detach())
    }

    /// Performs a gradient step on `loss` with the gradient norm clipped.
    ///
    /// Returns the norm of the gradient before clipping. If the norm is not finite, the
    /// parameters are not updated and `None` is returned.
    pub fn update(&mut self, loss: &Tensor) -> Result<Option<f32>> {
        let mut grads = loss.backward()?;
        let vars = self.varmap.all_vars();
        let norm = clip_grad_norm(&vars, &mut grads, self.clip_grad_norm)?;

        if !norm.is_finite() {
            return Ok(None);
        }
        trace!("grad_norm = {}", norm);
        self.opt.step(&grads)?;

        Ok(Some(norm))
    }

    /// Returns the parameters.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Returns the device.
    pub fn device(&self) -> &Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::{Mlp, MlpConfig};
    use rand::{rngs::SmallRng, SeedableRng};

    fn model() -> Result<ActorCriticModel<Mlp>> {
        let config = ActorCriticModelConfig::default()
            .net_config(MlpConfig::new(3, vec![8], 4))
            .opt_config(OptimizerConfig::Sgd { lr: 0.1 });
        ActorCriticModel::build(config, 0.5, Device::Cpu)
    }

    fn obs() -> Result<Tensor> {
        Ok(Tensor::new(
            &[[0.1f32, -0.2, 0.3], [1.0, 0.5, -1.0]],
            &Device::Cpu,
        )?)
    }

    #[test]
    fn test_evaluate() -> Result<()> {
        let model = model()?;
        let obs = obs()?;
        let act = Tensor::new(&[2u32, 0], &Device::Cpu)?;
        let (values, log_p_act, entropy) = model.evaluate(&obs, &act)?;

        let (logits, values_) = model.forward(&obs)?;
        let log_p = log_softmax(&logits, D::Minus1)?.to_vec2::<f32>()?;
        let log_p_act = log_p_act.to_vec1::<f32>()?;
        assert!((log_p_act[0] - log_p[0][2]).abs() < 1e-6);
        assert!((log_p_act[1] - log_p[1][0]).abs() < 1e-6);
        assert_eq!(values.to_vec1::<f32>()?, values_.to_vec1::<f32>()?);

        // Entropy of a distribution over 4 actions lies in [0, ln 4].
        let entropy = entropy.to_scalar::<f32>()?;
        assert!(entropy >= 0.0 && entropy <= 4f32.ln() + 1e-6);
        Ok(())
    }

    #[test]
    fn test_greedy_act() -> Result<()> {
        let model = model()?;
        let obs = obs()?;
        let mut rng = SmallRng::seed_from_u64(0);
        let (logits, _) = model.forward(&obs)?;
        let expected: Vec<usize> = logits
            .argmax(D::Minus1)?
            .to_vec1::<u32>()?
            .into_iter()
            .map(|a| a as usize)
            .collect();

        for _ in 0..3 {
            assert_eq!(model.act(&obs, &mut rng, true)?, expected);
        }
        let sampled = model.act(&obs, &mut rng, false)?;
        assert!(sampled.iter().all(|&a| a < 4));
        Ok(())
    }

    fn params(model: &ActorCriticModel<Mlp>) -> Result<Vec<Vec<f32>>> {
        model
            .get_varmap()
            .all_vars()
            .iter()
            .map(|v| Ok(v.as_tensor().flatten_all()?.to_vec1::<f32>()?))
            .collect()
    }

    #[test]
    fn test_skip_non_finite_gradient() -> Result<()> {
        let mut model = model()?;
        let obs = obs()?;
        let params_before = params(&model)?;

        // sqrt(0 * v) is 0, but its gradient is 0 * inf.
        let (_, values) = model.forward(&obs)?;
        let loss = values.affine(0.0, 0.0)?.sqrt()?.sum_all()?;
        assert_eq!(loss.to_scalar::<f32>()?, 0.0);
        assert_eq!(model.update(&loss)?, None);
        assert_eq!(params(&model)?, params_before);

        let (_, values) = model.forward(&obs)?;
        let loss = (values - 1.0)?.sqr()?.mean_all()?;
        let norm = model.update(&loss)?;
        assert!(norm.map_or(false, |n| n.is_finite()));
        assert_ne!(params(&model)?, params_before);
        Ok(())
    }
}
