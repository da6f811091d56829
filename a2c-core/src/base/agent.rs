//! Agent.
use super::{Env, Policy};
use crate::{record::Record, TrajectoryBatch};
use anyhow::Result;

/// Represents a trainable actor-critic on an environment.
///
/// The actor is the [`Policy`] part. The critic is exposed by [`Agent::value`], which
/// [`Worker`](crate::Worker) uses for bootstrapping.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Returns the critic's value estimates of the given observations.
    ///
    /// The estimates are used only as constants; no gradient flows through them.
    fn value(&mut self, obs: &[E::Obs]) -> Result<Vec<f32>>;

    /// Performs an optimization step on a batch drained from a
    /// [`TrajectoryBuffer`](crate::TrajectoryBuffer).
    ///
    /// The returned record must contain the mean value estimate over the batch
    /// with key `value_mean`.
    fn opt(&mut self, batch: TrajectoryBatch<E::Obs, E::Act>) -> Result<Record>;
}
