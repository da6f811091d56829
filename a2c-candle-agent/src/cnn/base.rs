use super::{CnnConfig, ObsNormalization};
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{DType::F32, Device, Module, Tensor, D};
use candle_nn::{
    conv::Conv2dConfig,
    conv2d_no_bias, linear,
    sequential::{seq, Sequential},
    Linear, VarBuilder,
};

#[allow(clippy::upper_case_acronyms)]
/// Convolutional neural network, which has the same architecture of the DQN paper,
/// followed by an actor head and a critic head.
///
/// The input is a batch of `84x84` images with `n_stack` channels. The output is
/// `(logits, values)` with shapes `[batch, out_dim]` and `[batch]`.
pub struct Cnn {
    device: Device,
    seq: Sequential,
    actor: Linear,
    critic: Linear,
}

impl Cnn {
    fn stride(s: i64) -> Conv2dConfig {
        Conv2dConfig {
            stride: s as _,
            ..Default::default()
        }
    }

    fn create_net(
        vb: &VarBuilder,
        n_stack: i64,
        normalization: ObsNormalization,
    ) -> Result<Sequential> {
        let seq = seq()
            .add_fn(move |xs| {
                let xs = xs.to_dtype(F32)?;
                match normalization {
                    ObsNormalization::Raw => Ok(xs),
                    ObsNormalization::UnitInterval => xs / 255.0,
                }
            })
            .add(conv2d_no_bias(
                n_stack as _,
                32,
                8,
                Self::stride(4),
                vb.pp("c1"),
            )?)
            .add_fn(|xs| xs.relu())
            .add(conv2d_no_bias(32, 64, 4, Self::stride(2), vb.pp("c2"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d_no_bias(64, 64, 3, Self::stride(1), vb.pp("c3"))?)
            .add_fn(|xs| xs.relu()?.flatten_from(1))
            .add(linear(3136, 512, vb.pp("l1"))?)
            .add_fn(|xs| xs.relu());

        Ok(seq)
    }
}

impl SubModel1 for Cnn {
    type Config = CnnConfig;
    type Input = Tensor;
    type Output = (Tensor, Tensor);

    fn forward(&self, x: &Self::Input) -> Result<Self::Output> {
        let xs = self.seq.forward(&x.to_device(&self.device)?)?;
        let logits = self.actor.forward(&xs)?;
        let values = self.critic.forward(&xs)?.squeeze(D::Minus1)?;
        Ok((logits, values))
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let seq = Self::create_net(&vb, config.n_stack, config.normalization)?;
        let actor = linear(512, config.out_dim as _, vb.pp("actor"))?;
        let critic = linear(512, 1, vb.pp("critic"))?;

        Ok(Self {
            device,
            seq,
            actor,
            critic,
        })
    }
}
