//! Classical and learned control of a simulated cart-pole.
//!
//! Three control strategies implement [`Actor`] and are driven by [`run_episode`]:
//! * [`StateFeedbackController`] - fixed-gain linear state feedback `u = -(K · s)`.
//! * [`PidController`] - PID on the pole angle with an integral accumulator.
//! * [`PolicyActor`] - any [`Policy`] exposing `predict(observation, deterministic)`.
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)]
pub mod controllers;
pub mod envs;
mod error;
pub mod logging;
pub mod simulation;

pub use controllers::{
    discretize, Actor, Controller, Discretized, GainVector, PidConfig, PidController, PidGains,
    Policy, PolicyActor, StateFeedbackController,
};
pub use envs::{CartPole, CartPoleConfig, CartPoleState, Environment, Push, Successor};
pub use error::{ConfigError, PolecartError};
pub use simulation::{
    run_episode, run_episodes, EpisodeConfig, EpisodeEnd, EpisodeResult, EpisodesSummary,
    SimulationError,
};

/// Pseudo-random number generator used for environment and policy sampling.
pub type Prng = rand_chacha::ChaCha8Rng;
