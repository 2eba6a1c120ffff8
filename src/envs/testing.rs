//! Environment testing utilities
use super::{CartPoleState, Environment, Push, Successor};
use thiserror::Error;

/// Scripted cart-pole-like environment for exercising episode runners.
///
/// Observations cycle through `states`; the reset observation is `states[0]` and
/// step `k` (1-indexed) observes `states[k % states.len()]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StubEnv {
    pub states: Vec<CartPoleState>,
    /// Reward returned on every step.
    pub reward: f64,
    /// Terminate on this step of each episode (1-indexed).
    pub terminate_at: Option<u64>,
    /// Fail on this step of each episode (1-indexed).
    pub fail_at: Option<u64>,
    /// Steps taken in the current episode.
    pub num_steps: u64,
    pub num_resets: u64,
    pub num_closes: u64,
    /// Every action received, across episodes.
    pub actions: Vec<Push>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("stub environment failed on step {0}")]
pub struct StubError(pub u64);

impl StubEnv {
    /// An environment that never ends an episode.
    pub fn endless() -> Self {
        Self {
            states: vec![CartPoleState::default()],
            reward: 1.0,
            terminate_at: None,
            fail_at: None,
            num_steps: 0,
            num_resets: 0,
            num_closes: 0,
            actions: Vec::new(),
        }
    }

    /// An environment that terminates on the given step of each episode.
    pub fn terminating_at(step: u64) -> Self {
        Self {
            terminate_at: Some(step),
            ..Self::endless()
        }
    }

    /// An environment that fails on the given step of each episode.
    pub fn failing_at(step: u64) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::endless()
        }
    }

    pub fn with_states(self, states: Vec<CartPoleState>) -> Self {
        assert!(!states.is_empty());
        Self { states, ..self }
    }

    pub fn with_reward(self, reward: f64) -> Self {
        Self { reward, ..self }
    }

    fn observation(&self) -> CartPoleState {
        // Step counts are small in tests
        #[allow(clippy::cast_possible_truncation)]
        let index = self.num_steps as usize % self.states.len();
        self.states[index]
    }
}

impl Environment for StubEnv {
    type Observation = CartPoleState;
    type Action = Push;
    type Error = StubError;

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        self.num_steps = 0;
        self.num_resets += 1;
        Ok(self.observation())
    }

    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<(Successor<Self::Observation>, f64), Self::Error> {
        self.num_steps += 1;
        if self.fail_at == Some(self.num_steps) {
            return Err(StubError(self.num_steps));
        }
        self.actions.push(*action);
        let successor = if self.terminate_at == Some(self.num_steps) {
            Successor::Terminate
        } else {
            Successor::Continue(self.observation())
        };
        Ok((successor, self.reward))
    }

    fn close(&mut self) {
        self.num_closes += 1;
    }
}
