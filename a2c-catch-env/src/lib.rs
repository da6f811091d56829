//! Catch, an environment with 84x84 single-channel pixel observations.
//!
//! A ball falls from a random column at the top of a grid, one row per step. The agent
//! moves a paddle on the bottom row left, right, or keeps it. When the ball reaches the
//! bottom row the episode terminates with reward `+1` if the paddle is under the ball and
//! `-1` otherwise. All other steps have reward `0`.
//!
//! The grid is rendered into an `84x84` frame with pixel values `0` (background) and
//! `255` (ball and paddle). The frame is not normalized.
//!
//! ```
//! use a2c_catch_env::{CatchAct, CatchEnv, CatchEnvConfig};
//! use a2c_core::Env as _;
//!
//! let mut env = CatchEnv::build(&CatchEnvConfig::default(), 42).unwrap();
//! let obs = env.reset().unwrap();
//! assert_eq!(obs.frame().len(), 84 * 84);
//!
//! let mut reward = 0.0;
//! loop {
//!     let (step, _) = env.step(&CatchAct::Stay).unwrap();
//!     reward += step.reward;
//!     if step.is_done() {
//!         break;
//!     }
//! }
//! assert!(reward == 1.0 || reward == -1.0);
//! ```
mod act;
mod env;
mod obs;
pub use act::CatchAct;
pub use env::{CatchEnv, CatchEnvConfig};
pub use obs::{CatchObs, FRAME_SIZE};
