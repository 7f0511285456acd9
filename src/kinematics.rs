#![allow(non_snake_case)]

//! Constant acceleration position model.
//!
//! Tracks position, velocity and acceleration along one or more independent axes. The state of
//! axis `i` occupies elements `3i..3i+3` as `[position, velocity, acceleration]`.
//!
//! Position fixes and accelerometer readings arrive at different rates, so the observation models
//! are built separately and passed to [`KalmanEstimator::step_with`] for each kind of measurement.
//!
//! [`KalmanEstimator::step_with`]: ../estimators/covariance/struct.KalmanEstimator.html#method.step_with

use nalgebra as na;
use na::{DMatrix, DVector, RealField};
#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Shape, ShapeError};
use crate::estimators::covariance::KalmanEstimator;
use crate::models::{KalmanState, LinearObserveModel, LinearPredictModel};
use crate::noise::{CorrelatedNoise, UncorrelatedNoise};

const POSITION: usize = 0;
const VELOCITY: usize = 1;
const ACCELERATION: usize = 2;
const ORDERS: usize = 3;

/// Tuning of a [`KinematicModel`].
///
/// When deserialized, missing fields take their default values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
pub struct KinematicConfig {
    /// Expected rate of steps in Hz, sets the default prediction interval
    pub expected_frequency: f64,
    /// Standard deviation of the unmodelled position change per step
    pub mean_position_error: f64,
    pub mean_velocity_error: f64,
    pub mean_acceleration_error: f64,
}

impl Default for KinematicConfig {
    fn default() -> Self {
        KinematicConfig {
            expected_frequency: 100.0,
            mean_position_error: 0.1,
            mean_velocity_error: 0.1,
            mean_acceleration_error: 0.5,
        }
    }
}

impl KinematicConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.expected_frequency > 0.0 && self.expected_frequency.is_finite()) {
            return Err(Error::InvalidConfig("expected_frequency must be positive and finite"));
        }
        let errors = [
            self.mean_position_error,
            self.mean_velocity_error,
            self.mean_acceleration_error,
        ];
        if errors.iter().any(|e| !(*e >= 0.0 && e.is_finite())) {
            return Err(Error::InvalidConfig("mean errors must be non-negative and finite"));
        }
        Ok(())
    }
}

/// Builds the matrices of a constant acceleration model and estimators using them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicModel {
    axes: usize,
    config: KinematicConfig,
}

impl KinematicModel {
    pub fn new(axes: usize, config: KinematicConfig) -> Result<Self> {
        if axes == 0 {
            return Err(Error::InvalidConfig("at least one axis is required"));
        }
        config.validate()?;
        Ok(KinematicModel { axes, config })
    }

    pub fn axes(&self) -> usize {
        self.axes
    }

    pub fn config(&self) -> &KinematicConfig {
        &self.config
    }

    /// State dimension, three per axis.
    pub fn state_dim(&self) -> usize {
        ORDERS * self.axes
    }

    /// Interval between steps at the expected frequency, in seconds.
    pub fn expected_interval(&self) -> f64 {
        1.0 / self.config.expected_frequency
    }

    /// State transition over an interval `dt`.
    pub fn transition<N: RealField>(&self, dt: N) -> DMatrix<N> {
        let mut Fx = DMatrix::identity(self.state_dim(), self.state_dim());
        self.write_interval(&mut Fx, dt);
        Fx
    }

    /// Sets the `dt` dependent elements of the estimator's transition, leaving the others as they are.
    pub fn set_interval<N: RealField>(&self, estimator: &mut KalmanEstimator<N>, dt: N) -> Result<()> {
        let n = self.state_dim();
        let Fx = estimator.transition_mut();
        if Fx.shape() != (n, n) {
            return Err(ShapeError::new("A", Shape::square(n), Shape::of(&*Fx)).into());
        }
        self.write_interval(Fx, dt);
        Ok(())
    }

    fn write_interval<N: RealField>(&self, Fx: &mut DMatrix<N>, dt: N) {
        let half: N = na::convert(0.5);
        for axis in 0..self.axes {
            let p = ORDERS * axis + POSITION;
            let v = ORDERS * axis + VELOCITY;
            let a = ORDERS * axis + ACCELERATION;
            Fx[(p, v)] = dt;
            Fx[(p, a)] = num_traits::pow(dt, 2) * half;
            Fx[(v, a)] = dt;
        }
    }

    /// Process noise, the squared mean errors of each axis.
    pub fn process_noise<N: RealField>(&self) -> CorrelatedNoise<N> {
        let c = &self.config;
        let variances = [
            c.mean_position_error * c.mean_position_error,
            c.mean_velocity_error * c.mean_velocity_error,
            c.mean_acceleration_error * c.mean_acceleration_error,
        ];
        let q = DVector::from_fn(self.state_dim(), |i, _| na::convert(variances[i % ORDERS]));
        CorrelatedNoise::from_uncorrelated(&UncorrelatedNoise { q })
    }

    /// Observation of the position along every axis, each with noise `variance`.
    pub fn observe_position<N: RealField>(&self, variance: N) -> (LinearObserveModel<N>, CorrelatedNoise<N>) {
        self.observe_orders(&[(POSITION, variance)])
    }

    /// Observation of the acceleration along every axis, each with noise `variance`.
    pub fn observe_acceleration<N: RealField>(&self, variance: N) -> (LinearObserveModel<N>, CorrelatedNoise<N>) {
        self.observe_orders(&[(ACCELERATION, variance)])
    }

    /// Observation of position then acceleration along every axis.
    pub fn observe_position_and_acceleration<N: RealField>(
        &self,
        position_variance: N,
        acceleration_variance: N,
    ) -> (LinearObserveModel<N>, CorrelatedNoise<N>) {
        self.observe_orders(&[(POSITION, position_variance), (ACCELERATION, acceleration_variance)])
    }

    /// Observation selecting each of `orders` along every axis, in order.
    fn observe_orders<N: RealField>(&self, orders: &[(usize, N)]) -> (LinearObserveModel<N>, CorrelatedNoise<N>) {
        let m = orders.len() * self.axes;
        let mut Hx = DMatrix::zeros(m, self.state_dim());
        let mut q = DVector::zeros(m);
        for (block, (order, variance)) in orders.iter().enumerate() {
            for axis in 0..self.axes {
                let row = block * self.axes + axis;
                Hx[(row, ORDERS * axis + order)] = N::one();
                q[row] = *variance;
            }
        }
        (
            LinearObserveModel::new(Hx),
            CorrelatedNoise::from_uncorrelated(&UncorrelatedNoise { q }),
        )
    }

    /// An estimator starting at `initial_position` at rest, with `initial_variance` in every element
    /// of the state.
    ///
    /// Steps are predicted over the expected interval and by default observe position with the
    /// squared mean position error as noise.
    pub fn estimator<N: RealField>(&self, initial_position: &DVector<N>, initial_variance: N) -> Result<KalmanEstimator<N>> {
        let n = self.state_dim();
        if initial_position.nrows() != self.axes {
            return Err(ShapeError::new("position", Shape::column(self.axes), Shape::of(initial_position)).into());
        }
        let mut x = DVector::zeros(n);
        for axis in 0..self.axes {
            x[ORDERS * axis + POSITION] = initial_position[axis];
        }
        let state = KalmanState::new(x, DMatrix::from_diagonal_element(n, n, initial_variance));

        let dt: N = na::convert(self.expected_interval());
        let position_error: N = na::convert(self.config.mean_position_error);
        let (observe, observe_noise) = self.observe_position(position_error * position_error);

        KalmanEstimator::from_models(
            state,
            LinearPredictModel::new(self.transition(dt)),
            self.process_noise(),
            observe,
            observe_noise,
        )
    }
}
