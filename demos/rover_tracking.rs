//! Tracking a rover along two axes.
//!
//! Accelerometer readings arrive every step, position fixes every tenth step. Between fixes the
//! estimate is carried by the accelerations alone.

use nalgebra::DVector;

use kalman_estimate::kinematics::{KinematicConfig, KinematicModel};

fn main() -> Result<(), kalman_estimate::Error> {
    let config = KinematicConfig {
        expected_frequency: 20.,
        ..KinematicConfig::default()
    };
    let model = KinematicModel::new(2, config)?;

    // Start at the origin, position known to about a metre
    let mut estimate = model.estimator(&DVector::from_vec(vec![0., 0.]), 1.)?;
    let (fix, fix_noise) = model.observe_position_and_acceleration(0.01, 0.04);
    let (imu, imu_noise) = model.observe_acceleration(0.04);

    // The rover accelerates at 0.2 m/s² along x and drives at constant speed along y
    let dt = model.expected_interval();
    for k in 1..=100 {
        let t = k as f64 * dt;
        let x = if k % 10 == 0 {
            let z = DVector::from_vec(vec![0.1 * t * t, 0.5 * t, 0.2, 0.]);
            estimate.step_with(&z, None, &fix, &fix_noise)?
        } else {
            estimate.step_with(&DVector::from_vec(vec![0.2, 0.]), None, &imu, &imu_noise)?
        };
        if k % 10 == 0 {
            let (_, X) = estimate.state();
            println!(
                "t {:.2} position ({:.3}, {:.3}) velocity ({:.3}, {:.3}) position variance {:.4}",
                t, x[0], x[3], x[1], x[4], X[(0, 0)]
            );
        }
    }
    Ok(())
}
