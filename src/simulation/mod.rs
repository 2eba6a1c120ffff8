//! Simulating controller-environment interaction
mod serial;
mod summary;

pub use serial::{run_episode, run_episodes};
pub use summary::EpisodesSummary;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration of a single episode run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Hard cap on the number of steps per episode.
    pub max_steps: u64,
    /// Real-time delay before each step, for watching a rendered run.
    ///
    /// Has no effect on the simulation outcome.
    pub pacing: Option<Duration>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_steps: 500,
            pacing: None,
        }
    }
}

impl EpisodeConfig {
    pub const fn new(max_steps: u64) -> Self {
        Self {
            max_steps,
            pacing: None,
        }
    }

    /// Pace steps at the given period.
    pub const fn with_pacing(self, period: Duration) -> Self {
        Self {
            pacing: Some(period),
            ..self
        }
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == 0 {
            Err(ConfigError::ZeroStepBudget)
        } else {
            Ok(())
        }
    }
}

/// How an episode ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeEnd {
    /// The environment entered a terminal state.
    Terminated,
    /// The environment cut the episode off.
    Truncated,
    /// The runner's step budget ran out.
    StepBudget,
}

/// Outcome of one episode.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Sum of the rewards of every step.
    pub total_reward: f64,
    /// Number of steps executed; the 1-indexed step on which the episode ended.
    pub steps: u64,
    pub end: EpisodeEnd,
}

/// Error running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError<E> {
    #[error("invalid simulation configuration")]
    Config(#[from] ConfigError),
    #[error("environment error")]
    Environment(#[source] E),
}
