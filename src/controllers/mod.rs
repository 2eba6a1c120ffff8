//! Cart-pole controllers
//!
//! A [`Controller`] maps a state to a continuous control signal.
//! An [`Actor`] maps an observation to an action and is what the episode runner drives.
//! [`Discretized`] turns a controller into an actor with [`discretize`]
//! and [`PolicyActor`] does the same for a learned [`Policy`].
mod pid;
mod policy;
mod state_feedback;

pub use pid::{PidConfig, PidController, PidGains};
pub use policy::{LogisticPolicy, LogisticPolicyParams, Policy, PolicyActor};
pub use state_feedback::{GainVector, StateFeedbackController};

use crate::envs::{CartPoleState, Push};

/// Produces actions given observations.
pub trait Actor<O, A> {
    /// Choose an action in the environment.
    ///
    /// This must be called sequentially within an episode.
    fn act(&mut self, observation: &O) -> A;

    /// Reset any per-episode state.
    ///
    /// Called at the start of every episode.
    fn reset(&mut self) {}
}

impl<O, A, T: Actor<O, A> + ?Sized> Actor<O, A> for &mut T {
    fn act(&mut self, observation: &O) -> A {
        T::act(self, observation)
    }
    fn reset(&mut self) {
        T::reset(self)
    }
}

impl<O, A, T: Actor<O, A> + ?Sized> Actor<O, A> for Box<T> {
    fn act(&mut self, observation: &O) -> A {
        T::act(self, observation)
    }
    fn reset(&mut self) {
        T::reset(self)
    }
}

/// Computes a continuous control signal from the cart-pole state.
///
/// Positive signals call for a push to the right.
pub trait Controller {
    /// Control signal for the current state.
    fn control_signal(&mut self, state: &CartPoleState) -> f64;

    /// Reset any per-episode state.
    fn reset(&mut self) {}

    /// Wrap into an [`Actor`] that discretizes the control signal.
    fn discretized(self) -> Discretized<Self>
    where
        Self: Sized,
    {
        Discretized::new(self)
    }
}

impl<T: Controller + ?Sized> Controller for &mut T {
    fn control_signal(&mut self, state: &CartPoleState) -> f64 {
        T::control_signal(self, state)
    }
    fn reset(&mut self) {
        T::reset(self)
    }
}

/// Map a continuous control signal to a binary push.
///
/// `signal > 0` pushes right; `0.0`, negative values and NaN push left.
#[inline]
pub fn discretize(signal: f64) -> Push {
    Push::from_signal(signal)
}

/// An [`Actor`] that acts by discretizing the signal of a [`Controller`].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Discretized<C> {
    controller: C,
    /// Control signal behind the most recent action.
    last_signal: Option<f64>,
}

impl<C> Discretized<C> {
    pub const fn new(controller: C) -> Self {
        Self {
            controller,
            last_signal: None,
        }
    }

    pub const fn controller(&self) -> &C {
        &self.controller
    }

    /// The control signal computed by the most recent call to `act` in this episode.
    pub const fn last_signal(&self) -> Option<f64> {
        self.last_signal
    }

    #[allow(clippy::missing_const_for_fn)] // not allowed to be const at time of writing
    pub fn into_inner(self) -> C {
        self.controller
    }
}

impl<C: Controller> Actor<CartPoleState, Push> for Discretized<C> {
    fn act(&mut self, observation: &CartPoleState) -> Push {
        let signal = self.controller.control_signal(observation);
        self.last_signal = Some(signal);
        discretize(signal)
    }

    fn reset(&mut self) {
        self.last_signal = None;
        self.controller.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, Push::Left)]
    #[case(-0.0, Push::Left)]
    #[case(1e-9, Push::Right)]
    #[case(-1e-9, Push::Left)]
    #[case(f64::INFINITY, Push::Right)]
    #[case(f64::NEG_INFINITY, Push::Left)]
    #[case(f64::NAN, Push::Left)]
    fn discretize_signal(#[case] signal: f64, #[case] expected: Push) {
        assert_eq!(discretize(signal), expected);
    }

    /// Controller returning a fixed signal and counting resets.
    struct Constant {
        signal: f64,
        resets: usize,
    }

    impl Controller for Constant {
        fn control_signal(&mut self, _: &CartPoleState) -> f64 {
            self.signal
        }
        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[test]
    fn discretized_actor() {
        let mut actor = Constant {
            signal: 2.5,
            resets: 0,
        }
        .discretized();
        assert_eq!(actor.last_signal(), None);
        assert_eq!(actor.act(&CartPoleState::default()), Push::Right);
        assert_eq!(actor.last_signal(), Some(2.5));

        actor.reset();
        assert_eq!(actor.last_signal(), None);
        assert_eq!(actor.controller().resets, 1);
    }

    #[test]
    fn actor_through_mut_ref() {
        let mut inner = Constant {
            signal: -1.0,
            resets: 0,
        }
        .discretized();
        let actor: &mut dyn Actor<CartPoleState, Push> = &mut inner;
        assert_eq!(actor.act(&CartPoleState::default()), Push::Left);
        actor.reset();
        assert_eq!(inner.controller().resets, 1);
    }
}
