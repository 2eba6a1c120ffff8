use super::{Environment, Successor};

/// Environment wrapper that cuts off episodes after a set number of steps.
///
/// The final step of a cut-off episode is reported as [`Successor::Interrupt`] (truncated)
/// unless the inner environment terminated on that same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepLimit<E> {
    inner: E,
    /// Maximum number of steps per episode
    max_steps_per_episode: u64,
    /// Steps taken in the current episode
    current_steps: u64,
}

impl<E> StepLimit<E> {
    pub const fn new(inner: E, max_steps_per_episode: u64) -> Self {
        Self {
            inner,
            max_steps_per_episode,
            current_steps: 0,
        }
    }

    pub const fn max_steps_per_episode(&self) -> u64 {
        self.max_steps_per_episode
    }

    /// Steps taken so far in the current episode.
    pub const fn current_steps(&self) -> u64 {
        self.current_steps
    }

    pub const fn inner(&self) -> &E {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.inner
    }

    #[allow(clippy::missing_const_for_fn)] // not allowed to be const at time of writing
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Environment> Environment for StepLimit<E> {
    type Observation = E::Observation;
    type Action = E::Action;
    type Error = E::Error;

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        self.current_steps = 0;
        self.inner.reset()
    }

    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<(Successor<Self::Observation>, f64), Self::Error> {
        let (successor, reward) = self.inner.step(action)?;
        self.current_steps += 1;

        // Cut off the episode without marking the state as terminal
        let successor = match successor {
            Successor::Continue(obs) if self.current_steps >= self.max_steps_per_episode => {
                Successor::Interrupt(obs)
            }
            s => s,
        };
        Ok((successor, reward))
    }

    fn close(&mut self) {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::StubEnv;
    use super::super::Push;
    use super::*;

    #[test]
    fn step_limit() {
        let mut env = StepLimit::new(StubEnv::endless(), 2);
        env.reset().unwrap();

        let (successor, _) = env.step(&Push::Left).unwrap();
        assert!(!successor.episode_done());

        let (successor, _) = env.step(&Push::Left).unwrap();
        assert!(successor.is_truncated());
        assert_eq!(env.current_steps(), 2);
    }

    #[test]
    fn reset_clears_count() {
        let mut env = StepLimit::new(StubEnv::endless(), 3);
        env.reset().unwrap();
        env.step(&Push::Right).unwrap();
        env.step(&Push::Right).unwrap();
        env.reset().unwrap();
        assert_eq!(env.current_steps(), 0);
        let (successor, _) = env.step(&Push::Right).unwrap();
        assert!(!successor.episode_done());
    }

    #[test]
    fn termination_takes_priority() {
        let mut env = StepLimit::new(StubEnv::terminating_at(1), 1);
        env.reset().unwrap();
        let (successor, _) = env.step(&Push::Left).unwrap();
        assert!(successor.is_terminated());
    }

    #[test]
    fn close_forwards() {
        let mut env = StepLimit::new(StubEnv::endless(), 3);
        env.close();
        assert_eq!(env.inner().num_closes, 1);
    }
}
