use super::Controller;
use crate::envs::CartPoleState;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 50.0,
            ki: 1.0,
            kd: 5.0,
        }
    }
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Check that all gains are finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("kp", self.kp), ("ki", self.ki), ("kd", self.kd)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteGain { name, value });
            }
        }
        Ok(())
    }
}

/// Configuration for a [`PidController`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub gains: PidGains,
    /// Time step (s) used when driven as a [`Controller`].
    pub time_step: f64,
    /// Symmetric bound on the integral error (anti-windup).
    ///
    /// `None` leaves the integral unbounded.
    pub integral_limit: Option<f64>,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::default(),
            // CartPole-v1 time step
            time_step: 0.02,
            integral_limit: None,
        }
    }
}

impl PidConfig {
    pub fn build_controller(&self) -> Result<PidController, ConfigError> {
        self.gains.validate()?;
        check_time_step(self.time_step)?;
        if let Some(limit) = self.integral_limit {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(ConfigError::InvalidIntegralLimit(limit));
            }
        }
        Ok(PidController {
            config: *self,
            integral_error: 0.0,
        })
    }
}

fn check_time_step(dt: f64) -> Result<(), ConfigError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeStep(dt))
    }
}

/// PID controller holding the pole upright.
///
/// The setpoint is a pole angle of zero. The derivative term uses the measured angular
/// velocity directly instead of differencing the error, since `d(error)/dt = -angular_rate`.
///
/// The integral error persists across calls and must be [reset](PidController::reset)
/// between episodes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PidController {
    config: PidConfig,
    integral_error: f64,
}

impl Default for PidController {
    fn default() -> Self {
        Self {
            config: PidConfig::default(),
            integral_error: 0.0,
        }
    }
}

impl PidController {
    /// Create a controller with the given gains and the default time step.
    pub fn new(gains: PidGains) -> Result<Self, ConfigError> {
        PidConfig {
            gains,
            ..PidConfig::default()
        }
        .build_controller()
    }

    pub const fn gains(&self) -> &PidGains {
        &self.config.gains
    }

    pub const fn time_step(&self) -> f64 {
        self.config.time_step
    }

    /// Accumulated integral of the error.
    pub const fn integral_error(&self) -> f64 {
        self.integral_error
    }

    /// Zero the integral error.
    pub fn reset(&mut self) {
        self.integral_error = 0.0;
    }

    /// Compute the control signal and advance the integral by one step of length `dt`.
    ///
    /// Fails without modifying the integral if `dt` is not finite and positive.
    pub fn compute(
        &mut self,
        angle: f64,
        angular_rate: f64,
        dt: f64,
    ) -> Result<f64, ConfigError> {
        check_time_step(dt)?;
        Ok(self.update(angle, angular_rate, dt))
    }

    fn update(&mut self, angle: f64, angular_rate: f64, dt: f64) -> f64 {
        let PidGains { kp, ki, kd } = self.config.gains;
        let error = 0.0 - angle;

        self.integral_error += error * dt;
        if let Some(limit) = self.config.integral_limit {
            self.integral_error = self.integral_error.clamp(-limit, limit);
        }

        let derivative_error = -angular_rate;
        kp * error + ki * self.integral_error + kd * derivative_error
    }
}

impl Controller for PidController {
    fn control_signal(&mut self, state: &CartPoleState) -> f64 {
        // The time step is validated on construction
        self.update(
            state.pole_angle,
            state.pole_angular_velocity,
            self.config.time_step,
        )
    }

    fn reset(&mut self) {
        self.integral_error = 0.0;
    }
}
