#![allow(non_snake_case)]

//! Linear estimation models.
//!
//! The state representation and the linear prediction and observation models are plain structs.
//! They carry no dimension checks of their own, the estimator validates them against its
//! [`Dimensions`] whenever they are supplied or used.
//!
//! A state representation supports prediction and observation by implementing [`LinearPredictor`]
//! and [`LinearObserver`].

use nalgebra::{DMatrix, DVector, RealField};

use crate::error::Result;
use crate::noise::CorrelatedNoise;

/// A linear predictor.
///
/// Uses a linear prediction model with correlated additive process noise.
pub trait LinearPredictor<N: RealField> {
    /// State prediction with a linear prediction model and additive noise.
    ///
    /// `x_pred` is the predicted state vector, the model is used to predict the uncertainty.
    fn predict(
        &mut self,
        pred: &LinearPredictModel<N>,
        x_pred: DVector<N>,
        noise: &CorrelatedNoise<N>,
    ) -> Result<()>;
}

/// A linear observer with correlated observation noise.
///
/// Uses a linear observation model with correlated additive observation noise.
pub trait LinearObserver<N: RealField> {
    /// Observation with innovation `s`, the observation minus its prediction.
    ///
    /// Returns the reciprocal condition number of the innovation covariance. The state is not
    /// changed on failure.
    fn observe_innovation(
        &mut self,
        obs: &LinearObserveModel<N>,
        noise: &CorrelatedNoise<N>,
        s: &DVector<N>,
    ) -> Result<N>;
}

/// Kalman State.
///
/// Linear representation as a state vector and the state covariance (symmetric positive semi-definite) matrix.
#[derive(PartialEq, Clone, Debug)]
pub struct KalmanState<N: RealField> {
    /// State vector
    pub x: DVector<N>,
    /// State covariance matrix (symmetric positive semi-definite)
    pub X: DMatrix<N>,
}

impl<N: RealField> KalmanState<N> {
    pub fn new(x: DVector<N>, X: DMatrix<N>) -> Self {
        KalmanState { x, X }
    }

    /// A state of dimension `n` at the origin with no uncertainty.
    pub fn new_zero(n: usize) -> Self {
        KalmanState {
            x: DVector::zeros(n),
            X: DMatrix::zeros(n, n),
        }
    }

    /// State dimension.
    pub fn dim(&self) -> usize {
        self.x.nrows()
    }
}

/// Linear prediction model.
///
/// Prediction is represented by a state transition matrix and an optional control matrix.
/// x' = Fx.x + Gu.u
#[derive(PartialEq, Clone, Debug)]
pub struct LinearPredictModel<N: RealField> {
    /// State transition matrix
    pub Fx: DMatrix<N>,
    /// Control matrix, absent when the system has no control input
    pub Gu: Option<DMatrix<N>>,
}

impl<N: RealField> LinearPredictModel<N> {
    pub fn new(Fx: DMatrix<N>) -> Self {
        LinearPredictModel { Fx, Gu: None }
    }

    pub fn with_control(Fx: DMatrix<N>, Gu: DMatrix<N>) -> Self {
        LinearPredictModel { Fx, Gu: Some(Gu) }
    }
}

/// Linear observation model.
///
/// Observation is represented by an observation matrix.
/// z = Hx.x
#[derive(PartialEq, Clone, Debug)]
pub struct LinearObserveModel<N: RealField> {
    /// Observation matrix
    pub Hx: DMatrix<N>,
}

impl<N: RealField> LinearObserveModel<N> {
    pub fn new(Hx: DMatrix<N>) -> Self {
        LinearObserveModel { Hx }
    }

    /// Observation dimension.
    pub fn dim(&self) -> usize {
        self.Hx.nrows()
    }
}

/// Dimensions of an estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// State dimension
    pub n: usize,
    /// Observation dimension of the default observation model
    pub m: usize,
    /// Control dimension, `None` without a control input
    pub l: Option<usize>,
}
