//! Joint-to-motor transforms of the supported board mechanics.
//!
//! ```text
//! Independent        m_i = j_i
//! WaistDifferential  m0 = (j0 − j1)/2   m1 = (j0 + j1)/2   m2 = j2
//! ShoulderTendon     m0 = j0 (+ j1 if j1 compliant)
//!                    m1, m2 from J⁻¹ (stiff) or Jᵀ (compliant), R = 65/40
//! Matrix             m_i = Σ_j rows[i][j]·j_j
//! ```
//!
//! Motors not written by a transform follow their joint one to one.

use jmc_common::consts::{MAX_JOINTS, MAX_MOTORS, SHOULDER_RATIO_DEN, SHOULDER_RATIO_NUM};
use jmc_common::control_unit::config::Topology;
use jmc_common::control_unit::error::MotorMask;

/// Joint commands to unclamped motor commands.
pub trait JointToMotor {
    /// Motors that are mechanically coupled and must be stopped together.
    fn coupled_group(&self, motor_count: usize) -> MotorMask;

    /// Fill `motors[..motor_count]` from the joint commands.
    fn transform(
        &self,
        joints: &[i32; MAX_JOINTS],
        stiff: &[bool; MAX_JOINTS],
        motor_count: usize,
        motors: &mut [i64; MAX_MOTORS],
    );
}

impl JointToMotor for Topology {
    fn coupled_group(&self, motor_count: usize) -> MotorMask {
        let group = match self {
            Self::Independent => MotorMask::empty(),
            Self::WaistDifferential | Self::ShoulderTendon => MotorMask::first(3),
            Self::Matrix { rows } => {
                let mut group = MotorMask::empty();
                for joint in 0..MAX_JOINTS {
                    let mut users = MotorMask::empty();
                    for (motor, row) in rows.iter().enumerate() {
                        if row[joint] != 0.0 {
                            users |= MotorMask::motor(motor);
                        }
                    }
                    if users.bits().count_ones() > 1 {
                        group |= users;
                    }
                }
                group
            }
        };
        group & MotorMask::first(motor_count)
    }

    fn transform(
        &self,
        joints: &[i32; MAX_JOINTS],
        stiff: &[bool; MAX_JOINTS],
        motor_count: usize,
        motors: &mut [i64; MAX_MOTORS],
    ) {
        let count = motor_count.min(MAX_MOTORS);
        for (motor, joint) in motors.iter_mut().zip(joints.iter()).take(count) {
            *motor = i64::from(*joint);
        }

        let j = joints.map(i64::from);
        match self {
            Self::Independent => {}
            Self::WaistDifferential => {
                motors[0] = (j[0] - j[1]) / 2;
                motors[1] = (j[0] + j[1]) / 2;
                motors[2] = j[2];
            }
            Self::ShoulderTendon => shoulder(&j, stiff, motors),
            Self::Matrix { rows } => {
                for (motor, row) in motors.iter_mut().zip(rows.iter()).take(count) {
                    let sum: f64 = row
                        .iter()
                        .zip(j.iter())
                        .map(|(&c, &q)| f64::from(c) * q as f64)
                        .sum();
                    *motor = sum as i64;
                }
            }
        }
    }
}

/// Tendon shoulder with pulley ratio R = 65/40.
///
/// A stiff joint is driven through J⁻¹, a compliant one through Jᵀ.
fn shoulder(j: &[i64; MAX_JOINTS], stiff: &[bool; MAX_JOINTS], m: &mut [i64; MAX_MOTORS]) {
    let num = i64::from(SHOULDER_RATIO_NUM);
    let den = i64::from(SHOULDER_RATIO_DEN);

    m[0] = j[0];
    if stiff[0] {
        m[1] = (-num * j[0]) / den;
        m[2] = m[1];
    } else {
        m[1] = 0;
        m[2] = 0;
    }

    if stiff[1] {
        let r = (num * j[1]) / den;
        m[1] += r;
        m[2] += r;
    } else {
        m[0] += j[1];
        m[1] += (den * j[1]) / num;
    }

    if stiff[2] {
        m[2] += (num * j[2]) / den;
    } else {
        let r = (den * j[2]) / num;
        m[1] -= r;
        m[2] += r;
    }
}
