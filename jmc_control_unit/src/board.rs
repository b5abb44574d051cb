//! Board controller: one cycle across every joint and motor of a board.
//!
//! ## Cycle Order
//!
//! 1. Step every [`AxisController`] (joint commands + stiff flags).
//! 2. Forward motor fault status and joint modes to the coupling stage.
//! 3. Evaluate the cable envelope (tendon shoulder only).
//! 4. Transform, mask and clamp into motor commands.
//!
//! Sensor samples and host commands are applied to the axes before
//! [`BoardController::cycle`].

use heapless::Vec as HVec;
use jmc_common::config::ConfigError;
use jmc_common::consts::{MAX_JOINTS, MAX_MOTORS};
use jmc_common::control_unit::config::{BoardConfig, CableLimits, Topology};
use jmc_common::control_unit::error::MotorMask;
use jmc_common::control_unit::state::ControlMode;
use static_assertions::const_assert;
use tracing::{info, warn};

use crate::config::validate_board_config;
use crate::coupling::cable::{cable_limit_alarm, ticks_to_degrees};
use crate::coupling::{MotorCoupling, PwmOutput};
use crate::state::{AxisController, AxisSettings};
use crate::trajectory::TrajectoryGenerator;

// Joints 0..2 feed the cable envelope.
const_assert!(MAX_JOINTS >= 3);

/// Result of one board cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutput {
    /// Joint commands before coupling.
    pub joints: [i32; MAX_JOINTS],
    pub stiff: [bool; MAX_JOINTS],
    pub pwm: PwmOutput,
    /// Cable envelope violated this cycle.
    pub cable_alarm: bool,
}

/// All axes of a board plus their coupling stage.
#[derive(Debug, Clone)]
pub struct BoardController<T> {
    axes: HVec<AxisController<T>, MAX_JOINTS>,
    coupling: MotorCoupling,
    cable_limits: Option<CableLimits>,
    motor_faults: MotorMask,
    cable_alarm: bool,
    cycles: u64,
}

impl<T: TrajectoryGenerator> BoardController<T> {
    /// Build a board from a validated configuration.
    ///
    /// `trajectory` is called once per joint with the joint index.
    pub fn from_config<F>(config: &BoardConfig, mut trajectory: F) -> Result<Self, ConfigError>
    where
        F: FnMut(usize) -> T,
    {
        validate_board_config(config)?;
        let coupling = MotorCoupling::from_config(&config.coupling).ok_or_else(|| {
            ConfigError::ValidationError("coupling needs at least one motor".to_string())
        })?;

        let settings = AxisSettings::from_board(config);
        let mut axes = HVec::new();
        for (index, joint) in config.joints.iter().enumerate() {
            let mut axis = AxisController::new(index as u8, trajectory(index), settings);
            axis.configure(joint);
            axes.push(axis).map_err(|_| {
                ConfigError::ValidationError(format!("more than {MAX_JOINTS} joints"))
            })?;
        }

        let cable_limits = match config.coupling.topology {
            Topology::ShoulderTendon => Some(config.coupling.cable_limits.unwrap_or_default()),
            _ => None,
        };

        info!(
            service = %config.shared.service_name,
            joints = axes.len(),
            motors = coupling.motor_count(),
            frequency_hz = settings.frequency_hz,
            cable_check = cable_limits.is_some(),
            "Board controller ready"
        );

        Ok(Self {
            axes,
            coupling,
            cable_limits,
            motor_faults: MotorMask::empty(),
            cable_alarm: false,
            cycles: 0,
        })
    }

    /// Report the driver fault state of `motor`.
    pub fn set_motor_fault(&mut self, motor: usize, has_fault: bool) {
        if motor >= MAX_MOTORS {
            return;
        }
        let bit = MotorMask::motor(motor);
        if has_fault && !self.motor_faults.intersects(bit) {
            warn!(motor, "Motor fault reported");
        }
        self.motor_faults.set(bit, has_fault);
    }

    /// Run one complete control cycle.
    pub fn cycle(&mut self) -> CycleOutput {
        let mut out = CycleOutput {
            stiff: [true; MAX_JOINTS],
            ..CycleOutput::default()
        };

        for (index, axis) in self.axes.iter_mut().enumerate() {
            let (command, stiff) = axis.step();
            out.joints[index] = command;
            out.stiff[index] = stiff;
        }

        for motor in 0..self.coupling.motor_count() {
            let mode = self
                .axes
                .get(motor)
                .map_or(ControlMode::Idle, AxisController::control_mode);
            self.coupling
                .set_motor_status(motor, self.motor_faults.has_motor(motor), mode);
        }

        let alarm = self.check_cable_envelope();
        if alarm != self.cable_alarm {
            if alarm {
                warn!(cycle = self.cycles, "Cable envelope violated, stopping coupled motors");
            } else {
                info!(cycle = self.cycles, "Cable envelope restored");
            }
            self.cable_alarm = alarm;
        }
        let forced = if alarm {
            self.coupling.coupled_group()
        } else {
            MotorMask::empty()
        };

        let count = self.axes.len();
        out.pwm =
            self.coupling
                .compute_pwm_with_stop(&out.joints[..count], &out.stiff[..count], forced);
        out.cable_alarm = alarm;
        self.cycles = self.cycles.wrapping_add(1);
        out
    }

    fn check_cable_envelope(&self) -> bool {
        let Some(limits) = &self.cable_limits else {
            return false;
        };
        let [j0, j1, j2] = [0, 1, 2].map(|i| {
            self.axes
                .get(i)
                .map_or(0, |axis| ticks_to_degrees(axis.position()))
        });
        cable_limit_alarm(j0, j1, j2, limits)
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn axis(&self, index: usize) -> Option<&AxisController<T>> {
        self.axes.get(index)
    }

    #[inline]
    pub fn axis_mut(&mut self, index: usize) -> Option<&mut AxisController<T>> {
        self.axes.get_mut(index)
    }

    #[inline]
    pub fn axes(&self) -> &[AxisController<T>] {
        &self.axes
    }

    #[inline]
    pub fn axes_mut(&mut self) -> &mut [AxisController<T>] {
        &mut self.axes
    }

    #[inline]
    pub fn coupling(&self) -> &MotorCoupling {
        &self.coupling
    }

    #[inline]
    pub fn coupling_mut(&mut self) -> &mut MotorCoupling {
        &mut self.coupling
    }

    #[inline]
    pub const fn cable_alarm(&self) -> bool {
        self.cable_alarm
    }

    #[inline]
    pub const fn motor_faults(&self) -> MotorMask {
        self.motor_faults
    }

    /// Cycles run since construction.
    #[inline]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
