//! Joint-to-motor command stage with per-motor fault masking.

use jmc_common::consts::{MAX_JOINTS, MAX_MOTORS};
use jmc_common::control_unit::config::{CouplingConfig, Topology};
use jmc_common::control_unit::error::MotorMask;
use jmc_common::control_unit::state::ControlMode;
use tracing::{debug, info};

use super::topology::JointToMotor;

/// Motor commands of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PwmOutput {
    /// Clamped motor commands; motors beyond the board's count stay 0.
    pub motors: [i16; MAX_MOTORS],
    /// Motors forced to zero this cycle.
    pub stop_mask: MotorMask,
}

/// Aggregates joint commands into motor commands for one board.
#[derive(Debug, Clone)]
pub struct MotorCoupling {
    motor_count: usize,
    topology: Topology,
    group: MotorMask,
    idle_mask: MotorMask,
    zero_rotation_torque: [i32; MAX_MOTORS],
    nominal_current: i16,
}

impl MotorCoupling {
    /// Create a coupling stage for `motor_count` motors.
    ///
    /// Counts above `MAX_MOTORS` are truncated. Returns `None` for zero motors.
    pub fn new(motor_count: usize, topology: Topology, nominal_current: i16) -> Option<Self> {
        if motor_count == 0 {
            return None;
        }
        let motor_count = motor_count.min(MAX_MOTORS);
        let group = topology.coupled_group(motor_count);
        info!(
            motors = motor_count,
            topology = topology.kind_name(),
            group = group.bits(),
            "Motor coupling created"
        );
        Some(Self {
            motor_count,
            topology,
            group,
            idle_mask: MotorMask::empty(),
            zero_rotation_torque: [0; MAX_MOTORS],
            nominal_current: nominal_current.saturating_abs(),
        })
    }

    pub fn from_config(config: &CouplingConfig) -> Option<Self> {
        Self::new(
            config.motors,
            config.topology.clone(),
            config.nominal_current,
        )
    }

    /// Record the health of `motor`.
    ///
    /// A faulted motor, or one whose joint reports `HwFault`, is idled.
    pub fn set_motor_status(&mut self, motor: usize, has_fault: bool, mode: ControlMode) {
        let bit = MotorMask::motor(motor);
        let idle = has_fault || mode == ControlMode::HwFault;
        if idle != self.idle_mask.intersects(bit) {
            debug!(motor, idle, "Motor status changed");
        }
        self.idle_mask.set(bit, idle);
    }

    /// Constant command added to `motor` whenever it is not idle.
    pub fn set_zero_rotation_torque(&mut self, motor: usize, value: i32) {
        if motor < MAX_MOTORS {
            self.zero_rotation_torque[motor] = value;
        }
    }

    /// Transform joint commands into clamped motor commands.
    ///
    /// Missing joints read as 0 and stiff.
    pub fn compute_pwm(&self, joints: &[i32], stiff: &[bool]) -> PwmOutput {
        self.compute_pwm_with_stop(joints, stiff, MotorMask::empty())
    }

    /// As [`MotorCoupling::compute_pwm`], with `forced` motors treated as idle
    /// for this cycle only.
    pub fn compute_pwm_with_stop(
        &self,
        joints: &[i32],
        stiff: &[bool],
        forced: MotorMask,
    ) -> PwmOutput {
        let mut j = [0i32; MAX_JOINTS];
        let mut s = [true; MAX_JOINTS];
        for (dst, src) in j.iter_mut().zip(joints) {
            *dst = *src;
        }
        for (dst, src) in s.iter_mut().zip(stiff) {
            *dst = *src;
        }

        let mut raw = [0i64; MAX_MOTORS];
        self.topology
            .transform(&j, &s, self.motor_count, &mut raw);

        let active = MotorMask::first(self.motor_count);
        let idle = (self.idle_mask | forced) & active;
        let mut stop_mask = idle;
        if idle.intersects(self.group) {
            stop_mask |= self.group;
        }

        let limit = i64::from(self.nominal_current);
        let mut out = PwmOutput {
            motors: [0; MAX_MOTORS],
            stop_mask,
        };
        for motor in 0..self.motor_count {
            if stop_mask.has_motor(motor) {
                continue;
            }
            let value = raw[motor] + i64::from(self.zero_rotation_torque[motor]);
            out.motors[motor] = value.clamp(-limit, limit) as i16;
        }
        out
    }

    #[inline]
    pub const fn motor_count(&self) -> usize {
        self.motor_count
    }

    #[inline]
    pub const fn idle_mask(&self) -> MotorMask {
        self.idle_mask
    }

    /// Motors stopped together when any of them is idle.
    #[inline]
    pub const fn coupled_group(&self) -> MotorMask {
        self.group
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub const fn nominal_current(&self) -> i16 {
        self.nominal_current
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
