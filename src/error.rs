//! Estimation errors.
//!
//! Shape mismatches and numerical failures are reported as values, the estimator never panics on
//! inconsistent input.

use std::fmt;

use nalgebra::{Dim, Matrix, Scalar};
use nalgebra::storage::Storage;
use thiserror::Error;

/// Row and column count of a matrix or vector operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }

    /// Shape of a column vector with `rows` elements.
    pub const fn column(rows: usize) -> Self {
        Shape { rows, cols: 1 }
    }

    pub const fn square(d: usize) -> Self {
        Shape { rows: d, cols: d }
    }

    /// The shape of any nalgebra matrix or vector.
    pub fn of<N: Scalar, R: Dim, C: Dim, S: Storage<N, R, C>>(m: &Matrix<N, R, C, S>) -> Self {
        let (rows, cols) = m.shape();
        Shape { rows, cols }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// An operand whose shape is inconsistent with the estimator's dimensions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{operand} has shape {actual}, expected {expected}")]
pub struct ShapeError {
    /// Name of the offending matrix, vector or intermediate product
    pub operand: &'static str,
    pub expected: Shape,
    pub actual: Shape,
}

impl ShapeError {
    pub fn new(operand: &'static str, expected: Shape, actual: Shape) -> Self {
        ShapeError {
            operand,
            expected,
            actual,
        }
    }
}

/// Estimation error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// The matrix could not be inverted, or was too ill-conditioned to invert reliably.
    #[error("{operand} is singular and cannot be inverted")]
    SingularMatrix { operand: &'static str },

    /// A covariance with a negative or NaN diagonal element.
    #[error("{operand} is not positive semi-definite")]
    NotPositiveSemiDefinite { operand: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

impl Error {
    pub fn is_shape(&self) -> bool {
        matches!(self, Error::Shape(_))
    }

    pub fn is_singular(&self) -> bool {
        matches!(self, Error::SingularMatrix { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
