//! Kalman Estimate, a discrete-time linear Kalman filter.
//!
//! A Kalman filter fuses a linear model of a dynamic system with noisy, linear, partial observations
//! of that system. The estimate is a state vector x and its covariance X. Each step predicts the state
//! forward with the system model and then corrects the prediction with a new observation.
//!
//! Matrices are nalgebra dynamic matrices. The state, control and observation dimensions are fixed
//! from the matrices supplied at construction and every matrix supplied afterwards is checked
//! against them. Observation models may also be supplied per step, allowing a variable number and
//! kind of observations at each step, as when sensors report at different rates.
//!
//! Errors are reported as [`error::Error`] values: a [`error::ShapeError`] for inconsistent matrices
//! and `SingularMatrix` when the innovation covariance cannot be inverted. A step that fails leaves
//! the estimate unchanged.
//!
//! # Licensing
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction,
//! including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software,
//! and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NON INFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY,
//! WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub mod error;
pub mod models;
pub mod noise;
pub mod linalg;
pub mod estimators;
pub mod kinematics;

pub use error::{Error, Result, Shape, ShapeError};
pub use estimators::covariance::KalmanEstimator;
pub use models::{Dimensions, KalmanState, LinearObserveModel, LinearObserver, LinearPredictModel, LinearPredictor};
pub use noise::{CorrelatedNoise, UncorrelatedNoise};
