use super::Controller;
use crate::envs::CartPoleState;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

const STATE_NAMES: [&str; 4] = [
    "cart_position",
    "cart_velocity",
    "pole_angle",
    "pole_angular_velocity",
];

/// Fixed state-feedback gains, one per state component.
///
/// Ordered as `[cart_position, cart_velocity, pole_angle, pole_angular_velocity]`.
/// All gains are finite.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct GainVector([f64; 4]);

impl GainVector {
    pub fn new(gains: [f64; 4]) -> Result<Self, ConfigError> {
        for (&name, &value) in STATE_NAMES.iter().zip(&gains) {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteGain { name, value });
            }
        }
        Ok(Self(gains))
    }

    pub const fn as_array(&self) -> &[f64; 4] {
        &self.0
    }

    /// Dot product with a state vector.
    pub fn dot(&self, state: &[f64; 4]) -> f64 {
        self.0.iter().zip(state).map(|(k, x)| k * x).sum()
    }
}

impl Default for GainVector {
    /// Gains approximating an LQR solution for the linearized CartPole-v1 system.
    fn default() -> Self {
        Self([-1.0, -1.5, 35.0, 3.0])
    }
}

impl TryFrom<[f64; 4]> for GainVector {
    type Error = ConfigError;

    fn try_from(gains: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(gains)
    }
}

impl From<GainVector> for [f64; 4] {
    fn from(gains: GainVector) -> Self {
        gains.0
    }
}

/// Linear state-feedback controller: `u = -(K · state)`.
///
/// The gains are computed offline (e.g. by an LQR solve) and never change.
/// The controller is stateless; NaN inputs propagate to the output.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFeedbackController {
    gains: GainVector,
}

impl StateFeedbackController {
    pub const fn new(gains: GainVector) -> Self {
        Self { gains }
    }

    pub const fn gains(&self) -> &GainVector {
        &self.gains
    }

    /// Control signal for a state.
    pub fn compute(&self, state: &CartPoleState) -> f64 {
        -self.gains.dot(&state.to_array())
    }
}

impl Controller for StateFeedbackController {
    fn control_signal(&mut self, state: &CartPoleState) -> f64 {
        self.compute(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::Push;
    use crate::Actor;
    use rstest::{fixture, rstest};

    #[fixture]
    fn controller() -> StateFeedbackController {
        StateFeedbackController::default()
    }

    fn combine(a: f64, s1: &CartPoleState, b: f64, s2: &CartPoleState) -> CartPoleState {
        let x = s1.to_array();
        let y = s2.to_array();
        CartPoleState::from([
            a * x[0] + b * y[0],
            a * x[1] + b * y[1],
            a * x[2] + b * y[2],
            a * x[3] + b * y[3],
        ])
    }

    #[rstest]
    fn default_gains(controller: StateFeedbackController) {
        assert_eq!(controller.gains().as_array(), &[-1.0, -1.5, 35.0, 3.0]);
    }

    #[rstest]
    fn negative_dot_product(controller: StateFeedbackController) {
        let state = CartPoleState::new(1.0, 2.0, 0.1, -0.5);
        let expected = -(-1.0 * 1.0 + -1.5 * 2.0 + 35.0 * 0.1 + 3.0 * -0.5);
        assert!((controller.compute(&state) - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(1.0, 1.0)]
    #[case(2.0, -3.0)]
    #[case(-0.5, 0.25)]
    #[case(0.0, 7.0)]
    fn linear_in_state(controller: StateFeedbackController, #[case] a: f64, #[case] b: f64) {
        let s1 = CartPoleState::new(0.3, -1.2, 0.05, 0.7);
        let s2 = CartPoleState::new(-2.0, 0.4, -0.1, 1.5);
        let lhs = controller.compute(&combine(a, &s1, b, &s2));
        let rhs = a * controller.compute(&s1) + b * controller.compute(&s2);
        assert!((lhs - rhs).abs() < 1e-9, "{} != {}", lhs, rhs);
    }

    #[rstest]
    fn zero_state_zero_signal(controller: StateFeedbackController) {
        assert_eq!(controller.compute(&CartPoleState::default()), 0.0);
    }

    #[rstest]
    fn nan_propagates(controller: StateFeedbackController) {
        let state = CartPoleState::new(0.0, 0.0, f64::NAN, 0.0);
        assert!(controller.compute(&state).is_nan());
        assert_eq!(controller.discretized().act(&state), Push::Left);
    }

    #[rstest]
    fn angle_term_sign(controller: StateFeedbackController) {
        let state = CartPoleState::new(0.0, 0.0, 0.05, 0.0);
        assert!((controller.compute(&state) + 1.75).abs() < 1e-12);
        assert_eq!(controller.discretized().act(&state), Push::Left);
    }

    #[test]
    fn rejects_non_finite_gain() {
        assert_eq!(
            GainVector::new([0.0, f64::INFINITY, 1.0, 1.0]),
            Err(ConfigError::NonFiniteGain {
                name: "cart_velocity",
                value: f64::INFINITY
            })
        );
    }

    #[test]
    fn gains_serde() {
        let gains = GainVector::new([1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(serde_json::to_string(&gains).unwrap(), "[1.0,2.0,3.0,4.0]");
        let parsed: GainVector = serde_json::from_str("[-1.0,-1.5,35.0,3.0]").unwrap();
        assert_eq!(parsed, GainVector::default());
    }
}
