#![allow(non_snake_case)]

//! Test the constant acceleration position model.

use nalgebra as na;
use na::{DMatrix, DVector};

use kalman_estimate::kinematics::{KinematicConfig, KinematicModel};
use kalman_estimate::Error;

fn config(expected_frequency: f64) -> KinematicConfig {
    KinematicConfig {
        expected_frequency,
        mean_position_error: 0.2,
        mean_velocity_error: 0.1,
        mean_acceleration_error: 0.05,
    }
}

#[test]
fn test_config_validation() {
    assert!(KinematicConfig::default().validate().is_ok());
    assert!(matches!(config(0.).validate(), Err(Error::InvalidConfig(_))));
    assert!(matches!(config(f64::INFINITY).validate(), Err(Error::InvalidConfig(_))));

    let negative = KinematicConfig {
        mean_velocity_error: -1.,
        ..config(10.)
    };
    assert!(matches!(negative.validate(), Err(Error::InvalidConfig(_))));
    let nan = KinematicConfig {
        mean_acceleration_error: f64::NAN,
        ..config(10.)
    };
    assert!(nan.validate().is_err());

    assert!(matches!(KinematicModel::new(0, config(10.)), Err(Error::InvalidConfig(_))));
    assert!(KinematicModel::new(2, config(0.)).is_err());
}

#[test]
fn test_transition() {
    let model = KinematicModel::new(2, config(4.)).unwrap();
    assert_eq!(model.state_dim(), 6);
    approx::assert_relative_eq!(model.expected_interval(), 0.25);

    let Fx = model.transition(0.5);
    let block = DMatrix::from_row_slice(3, 3, &[1., 0.5, 0.125, 0., 1., 0.5, 0., 0., 1.]);
    assert_eq!(Fx.slice((0, 0), (3, 3)).into_owned(), block);
    assert_eq!(Fx.slice((3, 3), (3, 3)).into_owned(), block);
    assert_eq!(Fx.slice((0, 3), (3, 3)).into_owned(), DMatrix::<f64>::zeros(3, 3));
    assert_eq!(Fx.slice((3, 0), (3, 3)).into_owned(), DMatrix::<f64>::zeros(3, 3));
}

#[test]
fn test_process_noise() {
    let model = KinematicModel::new(2, config(10.)).unwrap();
    let Q = model.process_noise::<f64>().Q;
    let expect = DVector::from_vec(vec![0.04, 0.01, 0.0025, 0.04, 0.01, 0.0025]);
    approx::assert_relative_eq!(Q.diagonal(), expect, epsilon = 1e-15);
    assert_eq!(Q.nrows(), 6);
    assert_eq!(Q[(0, 1)], 0.);
}

#[test]
fn test_observation_models() {
    let model = KinematicModel::new(2, config(10.)).unwrap();

    let (position, noise) = model.observe_position(0.5);
    let expect = DMatrix::from_row_slice(2, 6, &[
        1., 0., 0., 0., 0., 0.,
        0., 0., 0., 1., 0., 0.,
    ]);
    assert_eq!(position.Hx, expect);
    assert_eq!(noise.Q, DMatrix::from_diagonal_element(2, 2, 0.5));

    let (acceleration, _) = model.observe_acceleration(0.5);
    assert_eq!(acceleration.Hx[(0, 2)], 1.);
    assert_eq!(acceleration.Hx[(1, 5)], 1.);
    assert_eq!(acceleration.Hx.sum(), 2.);

    let (both, noise) = model.observe_position_and_acceleration(0.5, 2.);
    assert_eq!(both.dim(), 4);
    assert_eq!(both.Hx[(1, 3)], 1.);
    assert_eq!(both.Hx[(2, 2)], 1.);
    assert_eq!(noise.Q.diagonal(), DVector::from_vec(vec![0.5, 0.5, 2., 2.]));
}

#[test]
fn test_estimator() {
    let model = KinematicModel::new(2, config(10.)).unwrap();
    let estimator = model.estimator(&DVector::from_vec(vec![1., -1.]), 9.).unwrap();

    let dims = estimator.dimensions();
    assert_eq!((dims.n, dims.m, dims.l), (6, 2, None));
    assert_eq!(estimator.state().0, &DVector::from_vec(vec![1., 0., 0., -1., 0., 0.]));
    assert_eq!(estimator.state().1, &DMatrix::from_diagonal_element(6, 6, 9.));
    approx::assert_relative_eq!(estimator.transition()[(0, 1)], 0.1);
    approx::assert_relative_eq!(estimator.observation_noise()[(0, 0)], 0.04, epsilon = 1e-15);

    assert!(model.estimator(&DVector::from_vec(vec![1.]), 9.).unwrap_err().is_shape());
}

#[test]
fn test_set_interval() {
    let model = KinematicModel::new(1, config(10.)).unwrap();
    let mut estimator = model.estimator(&DVector::from_vec(vec![0.]), 1.).unwrap();

    model.set_interval(&mut estimator, 0.2).unwrap();
    approx::assert_relative_eq!(estimator.transition()[(0, 1)], 0.2);
    approx::assert_relative_eq!(estimator.transition()[(0, 2)], 0.02, epsilon = 1e-12);
    approx::assert_relative_eq!(estimator.transition()[(1, 2)], 0.2);
    assert_eq!(estimator.transition()[(0, 0)], 1.);

    let other = KinematicModel::new(2, config(10.)).unwrap();
    assert!(other.set_interval(&mut estimator, 0.2).unwrap_err().is_shape());
}

#[test]
fn test_fuse_position_and_acceleration() {
    // Constant acceleration of 1 along one axis, sampled at 10Hz. Position fixes arrive every
    // fifth step, accelerations every step.
    let model = KinematicModel::new(1, config(10.)).unwrap();
    let mut estimator = model.estimator(&DVector::from_vec(vec![0.]), 1.).unwrap();
    let (position, position_noise) = model.observe_position_and_acceleration(1e-4, 1e-4);
    let (acceleration, acceleration_noise) = model.observe_acceleration(1e-4);

    let dt = model.expected_interval();
    for k in 1..=50 {
        let t = k as f64 * dt;
        let p = 0.5 * t * t;
        if k % 5 == 0 {
            estimator
                .step_with(&DVector::from_vec(vec![p, 1.]), None, &position, &position_noise)
                .unwrap();
        } else {
            estimator
                .step_with(&DVector::from_vec(vec![1.]), None, &acceleration, &acceleration_noise)
                .unwrap();
        }
    }

    let x = estimator.state().0;
    let t = 50. * dt;
    approx::assert_abs_diff_eq!(x[0], 0.5 * t * t, epsilon = 0.05);
    approx::assert_abs_diff_eq!(x[1], t, epsilon = 0.1);
    approx::assert_abs_diff_eq!(x[2], 1., epsilon = 0.01);
}

#[cfg(feature = "serde-serialize")]
#[test]
fn test_config_from_json() {
    let config: KinematicConfig =
        serde_json::from_str(r#"{"expected_frequency": 20.0, "mean_acceleration_error": 0.25}"#).unwrap();
    assert_eq!(config.expected_frequency, 20.);
    assert_eq!(config.mean_acceleration_error, 0.25);
    assert_eq!(config.mean_position_error, KinematicConfig::default().mean_position_error);
    approx::assert_relative_eq!(KinematicModel::new(1, config).unwrap().expected_interval(), 0.05);

    let saved = serde_json::to_value(&config).unwrap();
    assert_eq!(saved["mean_velocity_error"], 0.1);

    // Parsed configs are validated when used
    let invalid: KinematicConfig = serde_json::from_str(r#"{"expected_frequency": -1.0}"#).unwrap();
    assert!(matches!(KinematicModel::new(1, invalid), Err(Error::InvalidConfig(_))));
    assert!(serde_json::from_str::<KinematicConfig>(r#"{"expected_frequency": "fast"}"#).is_err());
}
