//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use policy::Policy;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Vectorized environments are not supported. A [`Worker`](crate::Worker) holds exactly
/// one observation of its environment at a time.
pub trait Obs: Clone + Debug {}

/// An action of an environment.
pub trait Act: Clone + Debug {}
