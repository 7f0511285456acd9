//! Reciprocal condition numbers.
//!
//! Cheap estimates used to detect degenerate covariances and innovation covariances before they
//! are inverted.

use nalgebra::{DMatrix, Dim, Matrix, RealField, U1};
use nalgebra::storage::Storage;

/// Estimate the reciprocal condition number of a diagonal matrix for inversion.
/// The diagonal is passed as a vector.
///
/// The condition number is defined from a matrix norm: the max element of `d` is taken as the norm of
/// the matrix and the min element as the norm of its inverse, so rcond = min/max.
///
/// Special values:
///  - 0 for a semi-definite or empty matrix, and when max and min are both infinite
///  - < 0 for a negative matrix (some element < 0) or when any element is NaN
///
/// By definition rcond <= 1.
pub fn rcond_vec<N: RealField, R: Dim, S: Storage<N, R, U1>>(d: &Matrix<N, R, U1, S>) -> N {
    if d.nrows() == 0 {
        return N::zero();
    }
    let mut mind = d[0];
    let mut maxd = mind;
    for i in 0..d.nrows() {
        let di = d[i];
        if di != di {
            // NaN
            return -N::one();
        }
        if di < mind {
            mind = di;
        }
        if di > maxd {
            maxd = di;
        }
    }
    rcond_min_max(mind, maxd)
}

/// Estimate the reciprocal condition number of a symmetric matrix from its diagonal.
///
/// The same special values as [`rcond_vec`] apply. This is only an upper bound on the true
/// reciprocal condition of a non-diagonal matrix, but negative and NaN results reliably identify a
/// matrix that cannot be a covariance.
pub fn rcond_symmetric<N: RealField>(sm: &DMatrix<N>) -> N {
    rcond_vec(&sm.diagonal())
}

/// Estimate the reciprocal condition number of a general matrix `M` from `M` and its inverse `MI`.
///
/// rcond = 1 / (norm1(M) * norm1(MI)), where norm1 is the maximum absolute column sum. This is the
/// exact 1-norm reciprocal condition number.
///
/// Special values:
///  - 0 for an empty matrix, and when either norm is infinite
///  - < 0 when any element is NaN
pub fn rcond_inverse<N: RealField>(M: &DMatrix<N>, MI: &DMatrix<N>) -> N {
    if M.nrows() == 0 {
        return N::zero();
    }
    let rcond = N::one() / (norm1(M) * norm1(MI));
    if rcond != rcond {
        -N::one()
    } else {
        rcond
    }
}

/// Maximum absolute column sum, NaN if any column sum is NaN.
fn norm1<N: RealField>(M: &DMatrix<N>) -> N {
    M.column_iter()
        .map(|c| c.lp_norm(1))
        .fold(N::zero(), |max, s| if s > max || s != s { s } else { max })
}

fn rcond_min_max<N: RealField>(mind: N, maxd: N) -> N {
    if mind < N::zero() {
        // matrix is negative, mind does not represent a rcond
        return mind;
    }
    let rcond = mind / maxd;
    if rcond != rcond {
        // NaN, singular due to (mind == maxd) == (zero or infinity)
        N::zero()
    } else {
        rcond
    }
}

/// Checks the reciprocal condition number is >= 0.
///
/// IEC 559 NaN values are never true.
pub fn is_non_negative<N: RealField>(rcond: N) -> bool {
    rcond >= N::zero()
}
