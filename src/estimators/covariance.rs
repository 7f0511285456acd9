#![allow(non_snake_case)]

//! Covariance state estimation.
//!
//! A discrete linear Kalman filter using the Kalman state representation [`KalmanState`] of the
//! system. The Kalman state is simply the x,X pair, the dimensions of both are the dimensions of
//! the system.
//!
//! Each [`KalmanEstimator::step`] is a predict followed by an observe:
//!
//! ```text
//! x = Fx.x + Gu.u              X = Fx.X.Fx' + Q
//! S = Hx.X.Hx' + R             W = X.Hx'.S^-1
//! x = x + W.(z - Hx.x)         X = X - W.S.W'
//! ```
//!
//! The new estimate is built from the old one and only replaces it when the whole step succeeds,
//! so a failed step leaves the estimator exactly as it was.
//!
//! [`KalmanState`]: ../../models/struct.KalmanState.html

use log::{debug, trace};
use nalgebra as na;
use na::{DMatrix, DVector, RealField};

use crate::error::{Error, Result, Shape, ShapeError};
use crate::linalg::rcond;
use crate::linalg::shape::{self, ensure_shape, ensure_square};
use crate::models::{
    Dimensions, KalmanState, LinearObserveModel, LinearObserver, LinearPredictModel, LinearPredictor,
};
use crate::noise::CorrelatedNoise;

impl<N: RealField> LinearPredictor<N> for KalmanState<N> {
    fn predict(
        &mut self,
        pred: &LinearPredictModel<N>,
        x_pred: DVector<N>,
        noise: &CorrelatedNoise<N>,
    ) -> Result<()> {
        let n = self.dim();
        ensure_shape("x", &x_pred, Shape::column(n))?;

        // X = Fx.X.Fx' + Q
        let FX = shape::mul("A*P", &pred.Fx, &self.X, Shape::square(n))?;
        let FXFt = shape::mul("A*P*A'", &FX, &pred.Fx.transpose(), Shape::square(n))?;
        let mut X = shape::add("A*P*A'+Q", FXFt, &noise.Q, Shape::square(n))?;
        X.fill_lower_triangle_with_upper_triangle();

        self.x = x_pred;
        self.X = X;
        Ok(())
    }
}

impl<N: RealField> LinearObserver<N> for KalmanState<N> {
    fn observe_innovation(
        &mut self,
        obs: &LinearObserveModel<N>,
        noise: &CorrelatedNoise<N>,
        s: &DVector<N>,
    ) -> Result<N> {
        let n = self.dim();
        let m = obs.dim();

        // S = Hx.X.Hx' + Q
        let XHt = shape::mul("P*H'", &self.X, &obs.Hx.transpose(), Shape::new(n, m))?;
        let mut HXHt = shape::mul("H*P*H'", &obs.Hx, &XHt, Shape::square(m))?;
        HXHt.fill_lower_triangle_with_upper_triangle();
        let S = shape::add("S", HXHt, &noise.Q, Shape::square(m))?;

        // Kalman gain, X*Hx'*SI
        let (SI, rcond) = innovation_inverse(&S)?;
        let W = shape::mul("K", &XHt, &SI, Shape::new(n, m))?;

        // State update
        let Ws = shape::mul_vec("K*v", &W, s, n)?;
        let x = shape::add_vec("x+K*v", self.x.clone(), &Ws, n)?;

        // X -= W.S.W'
        let WS = shape::mul("K*S", &W, &S, Shape::new(n, m))?;
        let WSWt = shape::mul("K*S*K'", &WS, &W.transpose(), Shape::square(n))?;
        let mut X = shape::sub("P-K*S*K'", self.X.clone(), &WSWt, Shape::square(n))?;
        X.fill_lower_triangle_with_upper_triangle();

        self.x = x;
        self.X = X;
        Ok(rcond)
    }
}

/// A linear Kalman filter (estimator).
///
/// Owns the state estimate and the default prediction and observation models. The models may be
/// replaced between steps, every step re-validates them against the state dimension.
#[derive(Clone, Debug)]
pub struct KalmanEstimator<N: RealField> {
    state: KalmanState<N>,
    predict: LinearPredictModel<N>,
    process_noise: CorrelatedNoise<N>,
    observe: LinearObserveModel<N>,
    observe_noise: CorrelatedNoise<N>,
    dims: Dimensions,
    min_rcond: N,
}

impl<N: RealField> KalmanEstimator<N> {
    /// Creates an estimator from the initial state `x0`, `P0` and the system matrices.
    ///
    /// `n` is taken from `x0`, `m` from `R` and `l` from `B`. Every other matrix must conform.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        x0: DVector<N>,
        P0: DMatrix<N>,
        A: DMatrix<N>,
        B: Option<DMatrix<N>>,
        H: DMatrix<N>,
        R: DMatrix<N>,
        Q: DMatrix<N>,
    ) -> Result<Self> {
        Self::from_models(
            KalmanState::new(x0, P0),
            LinearPredictModel { Fx: A, Gu: B },
            CorrelatedNoise::new(Q),
            LinearObserveModel::new(H),
            CorrelatedNoise::new(R),
        )
    }

    /// Creates an estimator from an initial state and the prediction and observation models.
    pub fn from_models(
        state: KalmanState<N>,
        predict: LinearPredictModel<N>,
        process_noise: CorrelatedNoise<N>,
        observe: LinearObserveModel<N>,
        observe_noise: CorrelatedNoise<N>,
    ) -> Result<Self> {
        let n = state.x.nrows();
        let m = observe_noise.Q.nrows();
        let l = predict.Gu.as_ref().map(|Gu| Gu.ncols());
        let dims = Dimensions { n, m, l };

        ensure_shape("x0", &state.x, Shape::column(n))?;
        ensure_square("P0", &state.X, n)?;
        check_predict(&predict, &process_noise, &dims)?;
        check_observe(&observe, &observe_noise, n, m)?;

        debug!("kalman estimator n={} m={} l={:?}", n, m, l);
        Ok(KalmanEstimator {
            state,
            predict,
            process_noise,
            observe,
            observe_noise,
            dims,
            min_rcond: N::zero(),
        })
    }

    /// Rejects steps whose innovation covariance has a reciprocal condition number at or below
    /// `limit`. Without a limit only innovation covariances that are singular to working precision
    /// are rejected.
    pub fn with_min_rcond(mut self, limit: N) -> Self {
        self.min_rcond = limit;
        self
    }

    /// Reinitialise the estimate from a KalmanState.
    ///
    /// Returns the reciprocal condition number of the new covariance. The state is not changed if
    /// the covariance has the wrong dimension or is not PSD.
    pub fn init(&mut self, state: KalmanState<N>) -> Result<N> {
        ensure_shape("x", &state.x, Shape::column(self.dims.n))?;
        ensure_square("X", &state.X, self.dims.n)?;
        let rcond = rcond::rcond_symmetric(&state.X);
        if !rcond::is_non_negative(rcond) {
            return Err(Error::NotPositiveSemiDefinite { operand: "X" });
        }

        self.state = state;
        Ok(rcond)
    }

    /// Advances the estimate by one measurement cycle using the default observation model.
    ///
    /// `u` must be present exactly when the estimator has a control matrix. Returns the updated
    /// state vector.
    pub fn step(&mut self, z: &DVector<N>, u: Option<&DVector<N>>) -> Result<DVector<N>> {
        let next = self.advance(z, u, &self.observe, &self.observe_noise);
        self.commit(next)
    }

    /// Advances the estimate by one measurement cycle using the observation model `observe` with
    /// noise `observe_noise` for this step only.
    ///
    /// The observation dimension is taken from `observe`, so a step may observe a different number
    /// or kind of measurements than the default model.
    pub fn step_with(
        &mut self,
        z: &DVector<N>,
        u: Option<&DVector<N>>,
        observe: &LinearObserveModel<N>,
        observe_noise: &CorrelatedNoise<N>,
    ) -> Result<DVector<N>> {
        let next = self.advance(z, u, observe, observe_noise);
        self.commit(next)
    }

    /// Advances the estimate by one cycle without a measurement.
    ///
    /// Returns the predicted state vector.
    pub fn predict(&mut self, u: Option<&DVector<N>>) -> Result<DVector<N>> {
        let next = check_predict(&self.predict, &self.process_noise, &self.dims)
            .map_err(Error::from)
            .and_then(|_| self.predicted(u));
        self.commit(next)
    }

    /// The current estimate and its covariance.
    pub fn state(&self) -> (&DVector<N>, &DMatrix<N>) {
        (&self.state.x, &self.state.X)
    }

    pub fn kalman_state(&self) -> &KalmanState<N> {
        &self.state
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// State transition matrix `A`.
    pub fn transition(&self) -> &DMatrix<N> {
        &self.predict.Fx
    }

    /// Mutable access to the state transition matrix, typically to set time dependent elements.
    ///
    /// The matrix is checked against the state dimension at the next step.
    pub fn transition_mut(&mut self) -> &mut DMatrix<N> {
        &mut self.predict.Fx
    }

    /// Control matrix `B`.
    pub fn control(&self) -> Option<&DMatrix<N>> {
        self.predict.Gu.as_ref()
    }

    /// Default observation matrix `H`.
    pub fn observation(&self) -> &DMatrix<N> {
        &self.observe.Hx
    }

    /// Default observation noise covariance `R`.
    pub fn observation_noise(&self) -> &DMatrix<N> {
        &self.observe_noise.Q
    }

    /// Process noise covariance `Q`.
    pub fn process_noise(&self) -> &DMatrix<N> {
        &self.process_noise.Q
    }

    pub fn set_transition(&mut self, A: DMatrix<N>) -> Result<()> {
        ensure_square("A", &A, self.dims.n)?;
        self.predict.Fx = A;
        Ok(())
    }

    /// Replaces the control matrix. Whether there is a control input, and its dimension, are fixed
    /// at construction.
    pub fn set_control(&mut self, B: Option<DMatrix<N>>) -> Result<()> {
        let expected = Shape::new(self.dims.n, self.dims.l.unwrap_or(0));
        match (&B, self.dims.l) {
            (Some(Gu), Some(_)) => ensure_shape("B", Gu, expected)?,
            (None, None) => {}
            (Some(Gu), None) => return Err(ShapeError::new("B", expected, Shape::of(Gu)).into()),
            (None, Some(_)) => {
                return Err(ShapeError::new("B", expected, Shape::new(self.dims.n, 0)).into())
            }
        }
        self.predict.Gu = B;
        Ok(())
    }

    pub fn set_process_noise(&mut self, Q: DMatrix<N>) -> Result<()> {
        ensure_square("Q", &Q, self.dims.n)?;
        self.process_noise.Q = Q;
        Ok(())
    }

    /// Replaces the default observation model. The observation dimension `m` becomes the row count of `H`.
    pub fn set_observation(&mut self, H: DMatrix<N>, R: DMatrix<N>) -> Result<()> {
        let m = R.nrows();
        let observe = LinearObserveModel::new(H);
        let observe_noise = CorrelatedNoise::new(R);
        check_observe(&observe, &observe_noise, self.dims.n, m)?;

        if m != self.dims.m {
            debug!("kalman observation dimension {} -> {}", self.dims.m, m);
        }
        self.observe = observe;
        self.observe_noise = observe_noise;
        self.dims.m = m;
        Ok(())
    }

    fn commit(&mut self, next: Result<KalmanState<N>>) -> Result<DVector<N>> {
        match next {
            Ok(state) => {
                self.state = state;
                Ok(self.state.x.clone())
            }
            Err(err) => {
                debug!("kalman step failed, estimate unchanged: {}", err);
                Err(err)
            }
        }
    }

    /// The estimate after predicting and observing `z`, without modifying the estimator.
    fn advance(
        &self,
        z: &DVector<N>,
        u: Option<&DVector<N>>,
        observe: &LinearObserveModel<N>,
        observe_noise: &CorrelatedNoise<N>,
    ) -> Result<KalmanState<N>> {
        let n = self.dims.n;
        let m = observe.Hx.nrows();
        check_predict(&self.predict, &self.process_noise, &self.dims)?;
        check_observe(observe, observe_noise, n, m)?;
        ensure_shape("z", z, Shape::column(m))?;

        let predicted = self.predicted(u)?;
        if m == 0 {
            trace!("kalman step n={} nothing observed", n);
            return Ok(predicted);
        }
        trace!("kalman step n={} m={} control={}", n, m, u.is_some());
        self.observed(predicted, z, observe, observe_noise)
    }

    /// Predict: x = Fx.x + Gu.u, X = Fx.X.Fx' + Q
    fn predicted(&self, u: Option<&DVector<N>>) -> Result<KalmanState<N>> {
        let n = self.dims.n;

        let mut x = shape::mul_vec("A*x", &self.predict.Fx, &self.state.x, n)?;
        match (&self.predict.Gu, u, self.dims.l) {
            (Some(Gu), Some(u), Some(l)) => {
                ensure_shape("u", u, Shape::column(l))?;
                let Bu = shape::mul_vec("B*u", Gu, u, n)?;
                x = shape::add_vec("A*x+B*u", x, &Bu, n)?;
            }
            (None, None, _) => {}
            (_, Some(u), _) => {
                return Err(ShapeError::new("u", Shape::column(0), Shape::of(u)).into());
            }
            (_, None, l) => {
                return Err(ShapeError::new("u", Shape::column(l.unwrap_or(0)), Shape::column(0)).into());
            }
        }

        let mut predicted = self.state.clone();
        predicted.predict(&self.predict, x, &self.process_noise)?;
        Ok(predicted)
    }

    /// Observe: the innovation z - Hx.x is observed by the predicted state.
    fn observed(
        &self,
        mut predicted: KalmanState<N>,
        z: &DVector<N>,
        observe: &LinearObserveModel<N>,
        observe_noise: &CorrelatedNoise<N>,
    ) -> Result<KalmanState<N>> {
        let m = observe.dim();
        let Hxx = shape::mul_vec("H*x", &observe.Hx, &predicted.x, m)?;
        let s = shape::sub_vec("v", z, Hxx, m)?;

        let rcond = predicted.observe_innovation(observe, observe_noise, &s)?;
        if rcond <= self.min_rcond {
            debug!("kalman innovation rcond {:?} at or below limit {:?}", rcond, self.min_rcond);
            return Err(Error::SingularMatrix { operand: "S" });
        }
        Ok(predicted)
    }
}

/// Inverse innovation covariance and its reciprocal condition number.
///
/// S is symmetric positive definite for a well posed observation, so a Cholesky factorisation
/// is used. A general inverse is the fallback for an indefinite or asymmetric S. S is singular
/// when its rcond is within rounding error of zero.
fn innovation_inverse<N: RealField>(S: &DMatrix<N>) -> Result<(DMatrix<N>, N)> {
    let singular = Error::SingularMatrix { operand: "S" };

    // The factorisation reads only the lower triangle
    let cholesky = if *S == S.transpose() { S.clone().cholesky() } else { None };
    let (SI, rcond) = match cholesky {
        Some(cholesky) => {
            let d = cholesky.l_dirty().diagonal().map(|l| l * l);
            let rcond = rcond::rcond_vec(&d);
            (cholesky.inverse(), rcond)
        }
        None => {
            let SI = S.clone().try_inverse().ok_or_else(|| singular.clone())?;
            let rcond = rcond::rcond_inverse(S, &SI);
            (SI, rcond)
        }
    };

    let tolerance = N::default_epsilon() * na::convert::<f64, N>(S.nrows() as f64);
    if !rcond::is_non_negative(rcond) || rcond <= tolerance {
        return Err(singular);
    }
    Ok((SI, rcond))
}

/// Checks the prediction model and its noise conform to the dimensions.
fn check_predict<N: RealField>(
    predict: &LinearPredictModel<N>,
    noise: &CorrelatedNoise<N>,
    dims: &Dimensions,
) -> std::result::Result<(), ShapeError> {
    ensure_square("A", &predict.Fx, dims.n)?;
    ensure_square("Q", &noise.Q, dims.n)?;
    match (&predict.Gu, dims.l) {
        (Some(Gu), Some(l)) => ensure_shape("B", Gu, Shape::new(dims.n, l)),
        (None, None) => Ok(()),
        (Some(Gu), None) => Err(ShapeError::new("B", Shape::new(dims.n, 0), Shape::of(Gu))),
        (None, Some(l)) => Err(ShapeError::new("B", Shape::new(dims.n, l), Shape::new(dims.n, 0))),
    }
}

/// Checks an observation model of dimension `m` and its noise conform to the state dimension `n`.
fn check_observe<N: RealField>(
    observe: &LinearObserveModel<N>,
    noise: &CorrelatedNoise<N>,
    n: usize,
    m: usize,
) -> std::result::Result<(), ShapeError> {
    ensure_square("R", &noise.Q, m)?;
    ensure_shape("H", &observe.Hx, Shape::new(m, n))
}
