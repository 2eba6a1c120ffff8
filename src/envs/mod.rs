//! Simulation environments
mod cartpole;
mod step_limit;
#[cfg(test)]
pub mod testing;

pub use cartpole::{
    CartPole, CartPoleConfig, CartPoleError, CartPoleState, EnvironmentParams, PhysicalConstants,
};
pub use step_limit::StepLimit;

use serde::{Deserialize, Serialize};
use std::error::Error;

/// A simulation environment with internal state.
///
/// The environment is driven by [`reset`](Environment::reset) followed by a sequence of
/// [`step`](Environment::step) calls until the returned [`Successor`] ends the episode.
pub trait Environment {
    /// Observation of the environment state.
    type Observation;
    /// Action accepted by the environment.
    type Action;
    /// Error raised by the environment. Fatal to the current episode.
    type Error: Error;

    /// Reset the environment to an initial state.
    ///
    /// Must be called before each new episode.
    ///
    /// # Returns
    /// An observation of the initial state.
    fn reset(&mut self) -> Result<Self::Observation, Self::Error>;

    /// Take a step in the environment.
    ///
    /// # Returns
    /// * `successor`: How the episode continues, along with the next observation if any.
    /// * `reward`: The reward value for this transition.
    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<(Successor<Self::Observation>, f64), Self::Error>;

    /// Release any resources held by the environment.
    ///
    /// Called once when the environment is no longer used.
    fn close(&mut self) {}
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    type Observation = E::Observation;
    type Action = E::Action;
    type Error = E::Error;

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        E::reset(self)
    }

    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<(Successor<Self::Observation>, f64), Self::Error> {
        E::step(self, action)
    }

    fn close(&mut self) {
        E::close(self)
    }
}

/// The successor of an environment step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Successor<O> {
    /// The episode continues with the given observation.
    Continue(O),
    /// The episode ends by entering a terminal state.
    ///
    /// Corresponds to `terminated` in the gym interface.
    Terminate,
    /// The episode is cut off (truncated) in the given non-terminal state.
    ///
    /// Corresponds to `truncated` in the gym interface.
    Interrupt(O),
}

impl<O> Successor<O> {
    /// Whether this successor ends the episode.
    pub const fn episode_done(&self) -> bool {
        !matches!(self, Self::Continue(_))
    }

    /// Whether the episode ended in a terminal state.
    pub const fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminate)
    }

    /// Whether the episode was cut off in a non-terminal state.
    pub const fn is_truncated(&self) -> bool {
        matches!(self, Self::Interrupt(_))
    }

    /// The next observation if the episode continues.
    #[allow(clippy::missing_const_for_fn)] // not allowed to be const at time of writing
    pub fn continue_value(self) -> Option<O> {
        match self {
            Self::Continue(o) => Some(o),
            _ => None,
        }
    }

    /// Apply a function to the successor observation, if any.
    pub fn map<F, U>(self, f: F) -> Successor<U>
    where
        F: FnOnce(O) -> U,
    {
        match self {
            Self::Continue(o) => Successor::Continue(f(o)),
            Self::Terminate => Successor::Terminate,
            Self::Interrupt(o) => Successor::Interrupt(f(o)),
        }
    }
}

/// Cart push direction; the binary action of a cart-pole environment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Push {
    /// Push the cart to the left. Action index 0.
    Left,
    /// Push the cart to the right. Action index 1.
    Right,
}

impl Push {
    /// Discretize a continuous control signal.
    ///
    /// Positive signals push right; everything else, including `0.0` and NaN, pushes left.
    #[inline]
    pub fn from_signal(signal: f64) -> Self {
        if signal > 0.0 {
            Self::Right
        } else {
            Self::Left
        }
    }

    /// Action index: `0` for [`Push::Left`] and `1` for [`Push::Right`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Action from its index, if valid.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }
}

/// An action drawn from a finite set, identified by index.
pub trait Indexed {
    /// Number of distinct values.
    const SIZE: usize;

    /// Index of this value in `0 .. SIZE`.
    fn as_index(&self) -> usize;
}

impl Indexed for Push {
    const SIZE: usize = 2;

    fn as_index(&self) -> usize {
        self.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Push::Left, 0)]
    #[case(Push::Right, 1)]
    fn push_index(#[case] push: Push, #[case] index: usize) {
        assert_eq!(push.index(), index);
        assert_eq!(push.as_index(), index);
        assert_eq!(Push::from_index(index), Some(push));
    }

    #[test]
    fn push_invalid_index() {
        assert_eq!(Push::from_index(2), None);
    }

    #[test]
    fn successor_flags() {
        let cont = Successor::Continue(1);
        let term = Successor::<i32>::Terminate;
        let interrupt = Successor::Interrupt(2);
        assert!(!cont.episode_done());
        assert!(term.episode_done() && term.is_terminated() && !term.is_truncated());
        assert!(interrupt.episode_done() && interrupt.is_truncated());
        assert_eq!(cont.continue_value(), Some(1));
        assert_eq!(interrupt.continue_value(), None);
        assert_eq!(interrupt.map(|x| x * 10), Successor::Interrupt(20));
    }
}
