//! Shape checked linear algebra.
//!
//! nalgebra panics when the operands of a dynamic product do not conform. Every product the
//! estimator forms goes through these functions instead, so a mismatch is reported as a
//! [`ShapeError`] naming the operand.

use nalgebra::{DMatrix, DVector, Dim, Matrix, RealField, Scalar};
use nalgebra::storage::Storage;

use crate::error::{Shape, ShapeError};

/// Checks `m` has exactly the `expected` shape.
pub fn ensure_shape<N: Scalar, R: Dim, C: Dim, S: Storage<N, R, C>>(
    operand: &'static str,
    m: &Matrix<N, R, C, S>,
    expected: Shape,
) -> Result<(), ShapeError> {
    let actual = Shape::of(m);
    if actual == expected {
        Ok(())
    } else {
        Err(ShapeError::new(operand, expected, actual))
    }
}

/// Checks `m` is square with dimension `d`.
pub fn ensure_square<N: Scalar, R: Dim, C: Dim, S: Storage<N, R, C>>(
    operand: &'static str,
    m: &Matrix<N, R, C, S>,
    d: usize,
) -> Result<(), ShapeError> {
    ensure_shape(operand, m, Shape::square(d))
}

/// Matrix product `lhs * rhs`, checked to conform and to produce the `expected` shape.
///
/// A non-conforming `rhs` is reported against the shape `lhs` requires of it.
pub fn mul<N: RealField>(
    operand: &'static str,
    lhs: &DMatrix<N>,
    rhs: &DMatrix<N>,
    expected: Shape,
) -> Result<DMatrix<N>, ShapeError> {
    if lhs.ncols() != rhs.nrows() {
        return Err(ShapeError::new(
            operand,
            Shape::new(lhs.ncols(), rhs.ncols()),
            Shape::of(rhs),
        ));
    }
    let product = lhs * rhs;
    ensure_shape(operand, &product, expected)?;
    Ok(product)
}

/// Matrix vector product `lhs * v`, checked to conform and to produce a vector of `expected_rows`.
pub fn mul_vec<N: RealField>(
    operand: &'static str,
    lhs: &DMatrix<N>,
    v: &DVector<N>,
    expected_rows: usize,
) -> Result<DVector<N>, ShapeError> {
    if lhs.ncols() != v.nrows() {
        return Err(ShapeError::new(operand, Shape::column(lhs.ncols()), Shape::of(v)));
    }
    let product = lhs * v;
    ensure_shape(operand, &product, Shape::column(expected_rows))?;
    Ok(product)
}

/// Matrix sum `lhs + rhs` of two operands of the same `expected` shape.
pub fn add<N: RealField>(
    operand: &'static str,
    lhs: DMatrix<N>,
    rhs: &DMatrix<N>,
    expected: Shape,
) -> Result<DMatrix<N>, ShapeError> {
    ensure_shape(operand, &lhs, expected)?;
    ensure_shape(operand, rhs, expected)?;
    Ok(lhs + rhs)
}

/// Matrix difference `lhs - rhs` of two operands of the same `expected` shape.
pub fn sub<N: RealField>(
    operand: &'static str,
    lhs: DMatrix<N>,
    rhs: &DMatrix<N>,
    expected: Shape,
) -> Result<DMatrix<N>, ShapeError> {
    ensure_shape(operand, &lhs, expected)?;
    ensure_shape(operand, rhs, expected)?;
    Ok(lhs - rhs)
}

/// Vector sum or difference of two vectors with `rows` elements.
pub fn add_vec<N: RealField>(
    operand: &'static str,
    lhs: DVector<N>,
    rhs: &DVector<N>,
    rows: usize,
) -> Result<DVector<N>, ShapeError> {
    ensure_shape(operand, &lhs, Shape::column(rows))?;
    ensure_shape(operand, rhs, Shape::column(rows))?;
    Ok(lhs + rhs)
}

pub fn sub_vec<N: RealField>(
    operand: &'static str,
    lhs: &DVector<N>,
    rhs: DVector<N>,
    rows: usize,
) -> Result<DVector<N>, ShapeError> {
    ensure_shape(operand, lhs, Shape::column(rows))?;
    ensure_shape(operand, &rhs, Shape::column(rows))?;
    Ok(lhs - rhs)
}
