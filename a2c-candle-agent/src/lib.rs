//! Actor-critic agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! [`a2c::A2c`] implements [`a2c_core::Agent`]: it samples actions from the actor, provides
//! bootstrap values from the critic, and performs one clipped gradient step per batch.
//! The network is a [`model::SubModel1`] returning action logits and state values; [`cnn::Cnn`]
//! and [`mlp::Mlp`] are provided.
pub mod a2c;
pub mod cnn;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod util;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
