#![allow(non_snake_case)]

//! Linear additive noise models.

use nalgebra::{DMatrix, DVector, RealField};

/// Additive noise.
///
/// Noise represented as a the noise variance vector.
#[derive(PartialEq, Clone, Debug)]
pub struct UncorrelatedNoise<N: RealField> {
    /// Noise variance
    pub q: DVector<N>,
}

/// Additive noise.
///
/// Noise represented as a the noise covariance matrix.
#[derive(PartialEq, Clone, Debug)]
pub struct CorrelatedNoise<N: RealField> {
    /// Noise covariance
    pub Q: DMatrix<N>,
}

impl<N: RealField> CorrelatedNoise<N> {
    pub fn new(Q: DMatrix<N>) -> Self {
        CorrelatedNoise { Q }
    }

    /// Noise of dimension `d` with no variance.
    pub fn zero(d: usize) -> Self {
        CorrelatedNoise {
            Q: DMatrix::zeros(d, d),
        }
    }

    /// Independent noise with the same `variance` in each of `d` dimensions.
    pub fn isotropic(d: usize, variance: N) -> Self {
        CorrelatedNoise {
            Q: DMatrix::from_diagonal_element(d, d, variance),
        }
    }

    /// Creates a CorrelatedNoise from an UncorrelatedNoise.
    pub fn from_uncorrelated(uncorrelated: &UncorrelatedNoise<N>) -> Self {
        CorrelatedNoise {
            Q: DMatrix::from_diagonal(&uncorrelated.q),
        }
    }

    /// Noise dimension.
    pub fn dim(&self) -> usize {
        self.Q.nrows()
    }
}

impl<N: RealField> From<UncorrelatedNoise<N>> for CorrelatedNoise<N> {
    fn from(uncorrelated: UncorrelatedNoise<N>) -> Self {
        CorrelatedNoise::from_uncorrelated(&uncorrelated)
    }
}
