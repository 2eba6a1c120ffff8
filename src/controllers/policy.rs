use super::{discretize, Actor};
use crate::envs::{CartPoleState, Push};
use crate::error::ConfigError;
use crate::Prng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A learned policy that predicts actions from observations.
pub trait Policy<O, A> {
    /// Predict an action.
    ///
    /// # Args
    /// * `observation` - The current observation.
    /// * `deterministic` - Take the most likely action instead of sampling.
    fn predict(&mut self, observation: &O, deterministic: bool) -> A;

    /// Reset any per-episode state (e.g. recurrent memory).
    fn reset(&mut self) {}
}

impl<O, A, T: Policy<O, A> + ?Sized> Policy<O, A> for Box<T> {
    fn predict(&mut self, observation: &O, deterministic: bool) -> A {
        T::predict(self, observation, deterministic)
    }
    fn reset(&mut self) {
        T::reset(self)
    }
}

/// An [`Actor`] that acts with a [`Policy`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PolicyActor<P> {
    policy: P,
    deterministic: bool,
}

impl<P> PolicyActor<P> {
    pub const fn new(policy: P, deterministic: bool) -> Self {
        Self {
            policy,
            deterministic,
        }
    }

    pub const fn policy(&self) -> &P {
        &self.policy
    }

    pub const fn deterministic(&self) -> bool {
        self.deterministic
    }
}

impl<O, A, P: Policy<O, A>> Actor<O, A> for PolicyActor<P> {
    fn act(&mut self, observation: &O) -> A {
        self.policy.predict(observation, self.deterministic)
    }

    fn reset(&mut self) {
        self.policy.reset()
    }
}

/// Serialized parameters of a [`LogisticPolicy`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticPolicyParams {
    /// Per-component weights of the state.
    pub weights: [f64; 4],
    pub bias: f64,
}

/// Linear-logistic policy over cart-pole states.
///
/// `P(Right | s) = sigmoid(w · s + b)`.
/// Deterministic predictions push right when the logit is positive.
#[derive(Debug, Clone)]
pub struct LogisticPolicy {
    params: LogisticPolicyParams,
    rng: Prng,
}

impl LogisticPolicy {
    pub fn new(params: LogisticPolicyParams, seed: u64) -> Result<Self, ConfigError> {
        let names = [
            "w_cart_position",
            "w_cart_velocity",
            "w_pole_angle",
            "w_pole_angular_velocity",
        ];
        for (name, value) in names.into_iter().zip(params.weights) {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteGain { name, value });
            }
        }
        if !params.bias.is_finite() {
            return Err(ConfigError::NonFiniteGain {
                name: "bias",
                value: params.bias,
            });
        }
        Ok(Self {
            params,
            rng: Prng::seed_from_u64(seed),
        })
    }

    pub const fn params(&self) -> &LogisticPolicyParams {
        &self.params
    }

    /// Log-odds of pushing right.
    pub fn logit(&self, state: &CartPoleState) -> f64 {
        self.params
            .weights
            .iter()
            .zip(state.to_array())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.params.bias
    }

    /// Probability of pushing right.
    pub fn probability_right(&self, state: &CartPoleState) -> f64 {
        (1.0 + (-self.logit(state)).exp()).recip()
    }
}

impl Policy<CartPoleState, Push> for LogisticPolicy {
    fn predict(&mut self, observation: &CartPoleState, deterministic: bool) -> Push {
        if deterministic {
            discretize(self.logit(observation))
        } else {
            // NaN probabilities never pass the comparison and push left
            let p = self.probability_right(observation);
            if self.rng.gen::<f64>() < p {
                Push::Right
            } else {
                Push::Left
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(weights: [f64; 4], bias: f64) -> LogisticPolicy {
        LogisticPolicy::new(LogisticPolicyParams { weights, bias }, 0).unwrap()
    }

    #[test]
    fn deterministic_follows_logit_sign() {
        let mut policy = policy([0.0, 0.0, 10.0, 1.0], 0.0);
        let right = CartPoleState::new(0.0, 0.0, 0.1, 0.0);
        let left = CartPoleState::new(0.0, 0.0, -0.1, 0.0);
        assert_eq!(policy.predict(&right, true), Push::Right);
        assert_eq!(policy.predict(&left, true), Push::Left);
        // Zero logit breaks ties to the left like the controllers
        assert_eq!(policy.predict(&CartPoleState::default(), true), Push::Left);
    }

    #[test]
    fn probability_is_sigmoid() {
        let policy = policy([1.0, 0.0, 0.0, 0.0], 0.5);
        let state = CartPoleState::new(-0.5, 0.0, 0.0, 0.0);
        assert!((policy.probability_right(&state) - 0.5).abs() < 1e-12);
        let state = CartPoleState::new(100.0, 0.0, 0.0, 0.0);
        assert!(policy.probability_right(&state) > 0.999);
    }

    #[test]
    fn sampling_matches_probability() {
        let mut policy = policy([0.0; 4], 1.0);
        let p = policy.probability_right(&CartPoleState::default());
        let n = 10_000;
        let rights = (0..n)
            .filter(|_| policy.predict(&CartPoleState::default(), false) == Push::Right)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let freq = rights as f64 / n as f64;
        assert!((freq - p).abs() < 0.03, "freq {} vs p {}", freq, p);
    }

    #[test]
    fn sampling_is_seeded() {
        let mut a = policy([0.0; 4], 0.0);
        let mut b = policy([0.0; 4], 0.0);
        let state = CartPoleState::default();
        let xs: Vec<_> = (0..50).map(|_| a.predict(&state, false)).collect();
        let ys: Vec<_> = (0..50).map(|_| b.predict(&state, false)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn actor_uses_deterministic_flag() {
        let mut actor = PolicyActor::new(policy([0.0, 0.0, 1.0, 0.0], 0.0), true);
        assert!(actor.deterministic());
        let state = CartPoleState::new(0.0, 0.0, 0.2, 0.0);
        for _ in 0..10 {
            assert_eq!(actor.act(&state), Push::Right);
        }
    }

    #[test]
    fn rejects_non_finite_weights() {
        let params = LogisticPolicyParams {
            weights: [0.0, 0.0, f64::NAN, 0.0],
            bias: 0.0,
        };
        assert!(matches!(
            LogisticPolicy::new(params, 0),
            Err(ConfigError::NonFiniteGain {
                name: "w_pole_angle",
                ..
            })
        ));
    }

    #[test]
    fn params_serde() {
        let params: LogisticPolicyParams =
            serde_json::from_str(r#"{"weights": [0.1, 0.5, 30.0, 2.0], "bias": 0.0}"#).unwrap();
        assert_eq!(params.weights[2], 30.0);
    }
}
