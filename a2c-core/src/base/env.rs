//! Environment.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// Both [`Env::reset`] and [`Env::step`] are fallible. [`Worker`](crate::Worker) treats
/// an error of [`Env::step`] as a fault of the environment, resets it and continues.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performes an environment step.
    ///
    /// The environment is not reset even if the episode ends; callers are expected
    /// to call [`Env::reset`] after a step with [`Step::is_done`].
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Resets the environment with a given index.
    ///
    /// The index is used in an arbitrary way. For example, it can be used as a random seed,
    /// which is useful when evaluation of a trained agent. This method is called by
    /// [`DefaultEvaluator`](crate::DefaultEvaluator).
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs>;
}
