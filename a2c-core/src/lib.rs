#![warn(missing_docs)]
//! Core of a synchronous advantage actor-critic (A2C) learner.
//!
//! This crate is independent of any deep learning backend. It provides
//!
//! * traits at the boundaries of the training loop: [`Env`], [`Policy`], [`Agent`] and
//!   [`Evaluator`],
//! * return estimation, either bootstrapped n-step returns or generalized advantage
//!   estimation ([`returns`]),
//! * [`TrajectoryBuffer`], which accumulates `(observation, action, target value)` triples
//!   between optimization steps,
//! * [`Worker`], which owns one environment and produces fixed-length segments,
//! * [`Trainer`], which polls the workers round-robin and drives the optimization steps
//!   until a frame budget is exhausted,
//! * [`record`], used for monitoring the training process.
pub mod error;
pub mod record;
pub mod returns;

mod base;
pub use base::{Act, Agent, Env, Info, Obs, Policy, Step};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trajectory_buffer;
pub use trajectory_buffer::{TrajectoryBatch, TrajectoryBuffer};

mod worker;
pub use worker::{Segment, Worker};

mod trainer;
pub use trainer::{Trainer, TrainerConfig, TrainerState};

#[cfg(test)]
pub(crate) mod dummy;
