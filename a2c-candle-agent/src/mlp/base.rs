use super::MlpConfig;
use crate::model::SubModel1;
use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor, D};
use candle_nn::{linear, Linear, VarBuilder};

/// Returns vector of linear modules of the shared hidden layers.
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let mut in_dims = vec![config.in_dim];
    in_dims.extend(&config.units[..config.units.len() - 1]);
    let vs = vs.pp(prefix);

    in_dims
        .iter()
        .zip(config.units.iter())
        .enumerate()
        .map(|(i, (&in_dim, &out_dim))| {
            Ok(linear(in_dim as _, out_dim as _, vs.pp(format!("ln{}", i)))?)
        })
        .collect()
}

/// Multilayer perceptron with ReLU activation function, followed by an actor head and a
/// critic head.
///
/// The output is `(logits, values)` with shapes `[batch, out_dim]` and `[batch]`.
pub struct Mlp {
    device: Device,
    layers: Vec<Linear>,
    actor: Linear,
    critic: Linear,
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = (Tensor, Tensor);

    fn forward(&self, xs: &Self::Input) -> Result<Self::Output> {
        let mut xs = xs.to_device(&self.device)?;
        for layer in self.layers.iter() {
            xs = layer.forward(&xs)?.relu()?;
        }
        let logits = self.actor.forward(&xs)?;
        let values = self.critic.forward(&xs)?.squeeze(D::Minus1)?;
        Ok((logits, values))
    }

    fn build(vs: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vs.device().clone();
        let in_dim = *config.units.last().context("MlpConfig.units is empty")?;
        let layers = create_linear_layers("mlp", vs.clone(), &config)?;
        let actor = linear(in_dim as _, config.out_dim as _, vs.pp("actor"))?;
        let critic = linear(in_dim as _, 1, vs.pp("critic"))?;

        Ok(Self {
            device,
            layers,
            actor,
            critic,
        })
    }
}
