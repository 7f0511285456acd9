#![allow(non_snake_case)]

//! Track a simulated noisy system.
//!
//! A constant velocity system is driven by process noise and observed with measurement noise, both
//! drawn from a seeded generator. The filter's estimate must stay consistent with its own covariance.

use nalgebra as na;
use na::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use kalman_estimate::KalmanEstimator;

const DT: f64 = 0.1;
const V_NOISE: f64 = 0.05; // Velocity noise per step, standard deviation
const OBS_NOISE: f64 = 0.5; // Position observation noise, standard deviation
const STEPS: usize = 1000;

fn sqr(x: f64) -> f64 {
    x * x
}

#[test]
fn test_tracks_noisy_system() {
    let mut rng = StdRng::seed_from_u64(1u64);
    let v_noise = Normal::new(0., V_NOISE).unwrap();
    let obs_noise = Normal::new(0., OBS_NOISE).unwrap();

    let A = DMatrix::from_row_slice(2, 2, &[1., DT, 0., 1.]);
    let mut estimator = KalmanEstimator::new(
        DVector::from_vec(vec![0., 0.]),
        DMatrix::from_diagonal_element(2, 2, 100.),
        A.clone(),
        None,
        DMatrix::from_row_slice(1, 2, &[1., 0.]),
        DMatrix::from_element(1, 1, sqr(OBS_NOISE)),
        DMatrix::from_row_slice(2, 2, &[0., 0., 0., sqr(V_NOISE)]),
    )
    .unwrap();

    let mut truth = DVector::from_vec(vec![5., 2.]);
    let mut sum_sq_error = 0.;
    let mut sum_variance = 0.;
    for k in 0..STEPS {
        truth = &A * truth;
        truth[1] += v_noise.sample(&mut rng);
        let z = DVector::from_vec(vec![truth[0] + obs_noise.sample(&mut rng)]);

        let x = estimator.step(&z, None).unwrap();
        if k >= STEPS / 2 {
            sum_sq_error += sqr(x[0] - truth[0]);
            sum_variance += estimator.state().1[(0, 0)];
        }
    }

    // The filter must do better than the raw observations
    let samples = (STEPS - STEPS / 2) as f64;
    let rms_error = (sum_sq_error / samples).sqrt();
    assert!(rms_error < OBS_NOISE, "rms error {}", rms_error);

    // and its error should match the variance it reports
    let ratio = sum_sq_error / sum_variance;
    assert!(ratio > 0.3 && ratio < 3., "error/variance ratio {}", ratio);

    // The covariance stays symmetric
    let X = estimator.state().1;
    assert_eq!(X[(0, 1)], X[(1, 0)]);
}
