use super::{Environment, Push, StepLimit, Successor};
use crate::error::ConfigError;
use crate::Prng;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Serializable settings for building a [`CartPole`] environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPoleConfig {
    /// Physics configuration
    pub physics_config: PhysicalConstants,
    /// Environment configuration
    pub env_config: EnvironmentParams,
    /// Maximum number of steps per episode before truncation.
    pub max_steps_per_episode: u64,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            physics_config: PhysicalConstants::default(),
            env_config: EnvironmentParams::default(),
            // Matches the CartPole-v1 time limit
            max_steps_per_episode: 500,
        }
    }
}

impl CartPoleConfig {
    /// Build a step-limited cart-pole environment.
    ///
    /// # Args
    /// * `seed` - Seed for sampling initial states.
    pub fn build_env(&self, seed: u64) -> Result<StepLimit<CartPole>, ConfigError> {
        let time_step = self.physics_config.time_step;
        if !(time_step.is_finite() && time_step > 0.0) {
            return Err(ConfigError::InvalidTimeStep(time_step));
        }
        if self.max_steps_per_episode == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        let env = CartPole::new(self.physics_config, self.env_config, seed);
        Ok(StepLimit::new(env, self.max_steps_per_episode))
    }
}

/// Cart-Pole environment
///
/// A cart moves along a straight track with a pole hinged on top of it.
/// Each action pushes the cart left or right with a fixed force; the episode lasts while the
/// pole stays near vertical and the cart stays on the track.
///
/// The dynamics follow [Florian (2005)][florian2005], which reduce to the
/// [OpenAI Gym][cartpole_source] CartPole-v1 equations when both friction coefficients are zero
/// (the default). The state is integrated with explicit Euler steps like CartPole-v1.
///
/// The environment itself never truncates an episode; wrap it in a [`StepLimit`]
/// (see [`CartPoleConfig::build_env`]).
///
/// [florian2005]: https://coneural.org/florian/papers/05_cart_pole.pdf
/// [cartpole_source]: https://github.com/openai/gym/blob/master/gym/envs/classic_control/cartpole.py
#[derive(Debug, Clone)]
pub struct CartPole {
    phys: InternalPhysicalConstants,
    env: EnvironmentParams,
    rng: Prng,
    /// Current state. `None` before the first reset and after a terminal step.
    state: Option<CartPoleInternalState>,
}

impl CartPole {
    pub fn new(phys: PhysicalConstants, env: EnvironmentParams, seed: u64) -> Self {
        Self {
            phys: phys.into(),
            env,
            rng: Prng::seed_from_u64(seed),
            state: None,
        }
    }

    /// Simulation time step (s).
    pub const fn time_step(&self) -> f64 {
        self.phys.c.time_step
    }

    /// The current physical state, if an episode is in progress.
    pub fn state(&self) -> Option<CartPoleState> {
        self.state.map(|s| s.physical)
    }

    /// Set the physical state directly, starting an episode from it.
    pub fn set_state(&mut self, state: CartPoleState) {
        self.state = Some(CartPoleInternalState {
            physical: state,
            cached_normal_velocity_is_positive: true,
        });
    }

    fn is_terminal(&self, state: &CartPoleState) -> bool {
        // Negated comparisons so that NaN states count as terminal
        !(state.cart_position.abs() <= self.env.max_pos
            && state.pole_angle.abs() <= self.env.max_angle)
    }
}

/// Error from stepping a [`CartPole`] environment.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CartPoleError {
    #[error("step called without an episode in progress; call reset first")]
    NotReset,
}

impl Environment for CartPole {
    type Observation = CartPoleState;
    type Action = Push;
    type Error = CartPoleError;

    fn reset(&mut self) -> Result<Self::Observation, Self::Error> {
        // Each state component is drawn independently
        let dist = Uniform::new_inclusive(-0.05, 0.05);
        let physical = CartPoleState {
            cart_position: dist.sample(&mut self.rng),
            cart_velocity: dist.sample(&mut self.rng),
            pole_angle: dist.sample(&mut self.rng),
            pole_angular_velocity: dist.sample(&mut self.rng),
        };
        self.set_state(physical);
        Ok(physical)
    }

    fn step(
        &mut self,
        action: &Self::Action,
    ) -> Result<(Successor<Self::Observation>, f64), Self::Error> {
        let state = self.state.take().ok_or(CartPoleError::NotReset)?;
        let applied_force = match action {
            Push::Left => -self.env.action_force,
            Push::Right => self.env.action_force,
        };
        let next_state = self.phys.next_state(&state, applied_force);
        // CartPole-v1 rewards the step on which the pole falls as well
        let reward = 1.0;
        let successor = if self.is_terminal(&next_state.physical) {
            Successor::Terminate
        } else {
            self.state = Some(next_state);
            Successor::Continue(next_state.physical)
        };
        Ok((successor, reward))
    }
}

/// Physical constants for the [`CartPole`] environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Gravitational acceleration, positive downward (m/s^2)
    pub gravity: f64,
    /// Mass of the cart (kg)
    pub mass_cart: f64,
    /// Mass of the pole (kg)
    pub mass_pole: f64,
    /// Distance from the hinge to the pole centre of mass (m)
    pub length_half_pole: f64,
    /// Cart-track friction coefficient.
    ///
    /// Applies to upward and downward normal forces alike; the track holds the cart vertically.
    pub friction_cart: f64,
    /// Hinge friction coefficient between pole and cart.
    pub friction_pole: f64,
    /// Integration step (s)
    pub time_step: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        // Defaults from the OpenAI CartPole-v1 environment (frictionless)
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length_half_pole: 0.5,
            friction_cart: 0.0,
            friction_pole: 0.0,
            time_step: 0.02,
        }
    }
}

/// Parameters for [`CartPole`] as an episodic environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentParams {
    /// Force applied by each push (N).
    pub action_force: f64,
    /// Track half-width (m); leaving it terminates the episode.
    pub max_pos: f64,
    /// Largest pole tilt (radians) before the episode terminates.
    pub max_angle: f64,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            action_force: 10.0,
            max_pos: 2.4,
            max_angle: 12.0f64.to_radians(),
        }
    }
}

/// Physical constants along with derived quantities used every step.
#[derive(Debug, Copy, Clone, PartialEq)]
struct InternalPhysicalConstants {
    /// Fundamental constants
    c: PhysicalConstants,
    /// `gravity * (mass_cart + mass_pole)` (N)
    total_weight: f64,
    /// Inverse of the total mass
    inv_total_mass: f64,
    /// Pole mass times half length
    mass_length_pole: f64,
}

impl From<PhysicalConstants> for InternalPhysicalConstants {
    fn from(c: PhysicalConstants) -> Self {
        let total_mass = c.mass_cart + c.mass_pole;
        Self {
            c,
            total_weight: c.gravity * total_mass,
            inv_total_mass: total_mass.recip(),
            mass_length_pole: c.mass_pole * c.length_half_pole,
        }
    }
}

/// Cart-pole state vector.
///
/// Converts to and from `[cart_position, cart_velocity, pole_angle, pole_angular_velocity]`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPoleState {
    /// Offset of the cart from the track centre (m).
    pub cart_position: f64,
    /// Cart velocity (m/s).
    pub cart_velocity: f64,
    /// Pole tilt from upright (radians).
    pub pole_angle: f64,
    /// Rate of change of the pole tilt (radians / s).
    pub pole_angular_velocity: f64,
}

impl CartPoleState {
    pub const fn new(
        cart_position: f64,
        cart_velocity: f64,
        pole_angle: f64,
        pole_angular_velocity: f64,
    ) -> Self {
        Self {
            cart_position,
            cart_velocity,
            pole_angle,
            pole_angular_velocity,
        }
    }

    pub const fn to_array(&self) -> [f64; 4] {
        [
            self.cart_position,
            self.cart_velocity,
            self.pole_angle,
            self.pole_angular_velocity,
        ]
    }
}

impl From<[f64; 4]> for CartPoleState {
    fn from([x, x_dot, theta, theta_dot]: [f64; 4]) -> Self {
        Self::new(x, x_dot, theta, theta_dot)
    }
}

impl From<CartPoleState> for [f64; 4] {
    fn from(state: CartPoleState) -> Self {
        state.to_array()
    }
}

/// Episode state of a [`CartPole`]: physical state plus the friction sign cache.
#[derive(Debug, Copy, Clone, PartialEq)]
struct CartPoleInternalState {
    /// Physical state.
    physical: CartPoleState,

    /// Whether `normal_force * cart_velocity` was non-negative on the previous step.
    ///
    /// The friction term depends on this sign and the sign depends on the accelerations.
    /// Each step first assumes the previous sign and flips it if the outcome disagrees.
    cached_normal_velocity_is_positive: bool,
}

impl InternalPhysicalConstants {
    /// Advance one integration step with `applied_force` (N) acting on the cart.
    fn next_state(
        &self,
        state: &CartPoleInternalState,
        applied_force: f64,
    ) -> CartPoleInternalState {
        let phys = &state.physical;

        let mut signed_cart_friction = if state.cached_normal_velocity_is_positive {
            self.c.friction_cart
        } else {
            -self.c.friction_cart
        };
        let (sin_angle, cos_angle) = phys.pole_angle.sin_cos();
        let angular_velocity_squared = phys.pole_angular_velocity * phys.pole_angular_velocity;

        let accel = |signed_cart_friction: f64| {
            let angular_acceleration = self.angular_acceleration(
                phys,
                applied_force,
                signed_cart_friction,
                angular_velocity_squared,
                sin_angle,
                cos_angle,
            );
            let normal_force = self.normal_force(
                angular_acceleration,
                angular_velocity_squared,
                sin_angle,
                cos_angle,
            );
            (angular_acceleration, normal_force)
        };

        let (mut angular_acceleration, mut normal_force) = accel(signed_cart_friction);
        let normal_velocity_is_positive = (normal_force * phys.cart_velocity).is_sign_positive();
        if normal_velocity_is_positive != state.cached_normal_velocity_is_positive {
            signed_cart_friction = -signed_cart_friction;
            (angular_acceleration, normal_force) = accel(signed_cart_friction);
        }

        // Net horizontal force on the cart
        let force_pole = self.mass_length_pole
            * (angular_velocity_squared * sin_angle - angular_acceleration * cos_angle);
        let force_friction = -signed_cart_friction * normal_force;
        let cart_acceleration =
            (applied_force + force_pole + force_friction) * self.inv_total_mass;

        // Explicit Euler integration
        let dt = self.c.time_step;
        CartPoleInternalState {
            physical: CartPoleState {
                cart_position: phys.cart_position + dt * phys.cart_velocity,
                cart_velocity: phys.cart_velocity + dt * cart_acceleration,
                pole_angle: phys.pole_angle + dt * phys.pole_angular_velocity,
                pole_angular_velocity: phys.pole_angular_velocity + dt * angular_acceleration,
            },
            cached_normal_velocity_is_positive: normal_velocity_is_positive,
        }
    }

    /// Angular acceleration of the pole (rad / s^2).
    ///
    /// # Args
    /// * `applied_force`            - Applied horizontal force on the cart (N).
    /// * `signed_cart_friction`     - `friction_cart * sign(normal_force * cart_velocity)`
    /// * `angular_velocity_squared` - `pole_angular_velocity ** 2`
    /// * `sin_angle`                - `sin(pole_angle)`.
    /// * `cos_angle`                - `cos(pole_angle)`.
    fn angular_acceleration(
        &self,
        state: &CartPoleState,
        applied_force: f64,
        signed_cart_friction: f64,
        angular_velocity_squared: f64,
        sin_angle: f64,
        cos_angle: f64,
    ) -> f64 {
        // Florian (2005) equation (21) as numerator / denominator
        let alpha = (-applied_force
            - self.mass_length_pole
                * angular_velocity_squared
                * (sin_angle + signed_cart_friction * cos_angle))
            * self.inv_total_mass;
        let beta = self.c.friction_pole * state.pole_angular_velocity / self.mass_length_pole;
        let numerator = self.c.gravity * sin_angle
            + cos_angle * (alpha + self.c.gravity * signed_cart_friction)
            - beta;

        let denominator = self.c.length_half_pole
            * (4.0 / 3.0
                - self.c.mass_pole
                    * cos_angle
                    * self.inv_total_mass
                    * (cos_angle - signed_cart_friction));
        numerator / denominator
    }

    /// Force of the cart on the track (N); negative when the track holds the cart down.
    fn normal_force(
        &self,
        angular_acceleration: f64,
        angular_velocity_squared: f64,
        sin_angle: f64,
        cos_angle: f64,
    ) -> f64 {
        self.total_weight
            - self.mass_length_pole
                * (angular_acceleration * sin_angle + angular_velocity_squared * cos_angle)
    }
}
