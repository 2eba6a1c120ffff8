//! Error type
use crate::simulation::SimulationError;
use std::error::Error as StdError;
use thiserror::Error;

/// Invalid controller or simulation configuration.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("gain {name} must be finite, got {value}")]
    NonFiniteGain { name: &'static str, value: f64 },
    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f64),
    #[error("integral limit must be finite and positive, got {0}")]
    InvalidIntegralLimit(f64),
    #[error("episode step budget must be at least 1")]
    ZeroStepBudget,
}

/// Error from the polecart crate.
///
/// The environment error type is erased.
#[derive(Error, Debug)]
pub enum PolecartError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error("environment failed")]
    Environment(#[source] Box<dyn StdError + Send + Sync>),
}

impl<E> From<SimulationError<E>> for PolecartError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: SimulationError<E>) -> Self {
        match err {
            SimulationError::Config(err) => Self::Config(err),
            SimulationError::Environment(err) => Self::Environment(Box::new(err)),
        }
    }
}
