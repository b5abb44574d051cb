//! Per-axis controller: mode state machine, watchdogs and control laws.
//!
//! ## Control Laws
//!
//! ```text
//! stiff position   u = PID_pos(pos_ref − pos)
//! compliant        τref = off + K·err/1000 + D·(err − err_prev)
//!                  u = LPF(PI_trq(τref − τmeas))
//! torque           u = LPF(PI_trq(τref − τmeas))
//! ```
//!
//! ## Timers
//!
//! Each timer is armed with a cycle count and decremented once per step
//! while its mode is active. A step that finds it already at zero takes the
//! fallback: velocity stop for the velocity timer, zero torque output for
//! the torque command timer and the torque sensor watchdog.

use jmc_common::consts::{
    CHANGE_MODE_STOP_ACC, CONTROL_FREQUENCY_HZ, TICKS_PER_HALF_REVOLUTION, VELOCITY_CMD_TIMEOUT,
};
use jmc_common::control_unit::config::{BoardConfig, EncoderAliasConfig, JointConfig, WatchdogConfig};
use jmc_common::control_unit::control::{ImpedanceParams, PidGains, TorqueCutoff};
use jmc_common::control_unit::error::Readiness;
use jmc_common::control_unit::state::{ControlCommand, ControlMode, ControlProfile};
use jmc_common::control_unit::status::{JointStatus, PidStatus};
use tracing::{debug, info, warn};

use super::encoder::encoder_range_adjust;
use super::mode::{ModeDecision, ModeTransition, decide};
use crate::control::pid::PidFilter;
use crate::trajectory::{TrajectoryGenerator, TrajectoryRef};

// ─── Settings ───────────────────────────────────────────────────────

/// Board-wide parameters every axis of a board shares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSettings {
    /// Control loop frequency [Hz].
    pub frequency_hz: u32,
    pub profile: ControlProfile,
    /// Low pass applied by the torque law.
    pub torque_cutoff: TorqueCutoff,
    pub watchdogs: WatchdogConfig,
    pub encoder: EncoderAliasConfig,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            frequency_hz: CONTROL_FREQUENCY_HZ,
            profile: ControlProfile::default(),
            torque_cutoff: TorqueCutoff::default(),
            watchdogs: WatchdogConfig::default(),
            encoder: EncoderAliasConfig::default(),
        }
    }
}

impl AxisSettings {
    pub fn from_board(config: &BoardConfig) -> Self {
        Self {
            frequency_hz: config.control.frequency_hz,
            profile: config.control.profile,
            torque_cutoff: config.control.torque_cutoff,
            watchdogs: config.watchdogs,
            encoder: config.encoder,
        }
    }
}

// ─── Axis Controller ────────────────────────────────────────────────

/// Controller of one joint.
///
/// Owns a position PID, a torque PID and the trajectory generator `T`.
/// Call the sensor setters, then [`AxisController::step`] exactly once per
/// cycle.
#[derive(Debug, Clone)]
pub struct AxisController<T> {
    index: u8,
    settings: AxisSettings,
    readiness: Readiness,
    mode: ControlMode,

    pos_min: i32,
    pos_max: i32,
    vel_max: i32,
    velocity_timeout: u32,

    // Sensors.
    position: i32,
    velocity: i32,
    torque_meas: i32,

    // Torque loop.
    torque_ref: i32,
    torque_off: i32,
    stiffness: i32,
    /// Damping pre-scaled by frequency / 1000.
    damping: i32,
    /// Previous tracking error.
    err: i32,

    stiff: bool,
    openloop_out: i32,

    velocity_timer: u32,
    torque_cmd_timer: u32,
    torque_sensor_wdog: u32,

    pid_pos: PidFilter,
    pid_trq: PidFilter,
    trajectory: T,
    last_ref: TrajectoryRef,
}

impl<T: TrajectoryGenerator> AxisController<T> {
    /// Create an unconfigured axis in `Idle`.
    pub fn new(index: u8, trajectory: T, settings: AxisSettings) -> Self {
        Self {
            index,
            settings,
            readiness: Readiness::NOT_READY,
            mode: ControlMode::default(),
            pos_min: TICKS_PER_HALF_REVOLUTION,
            pos_max: TICKS_PER_HALF_REVOLUTION,
            vel_max: 0,
            velocity_timeout: VELOCITY_CMD_TIMEOUT,
            position: 0,
            velocity: 0,
            torque_meas: 0,
            torque_ref: 0,
            torque_off: 0,
            stiffness: 0,
            damping: 0,
            err: 0,
            stiff: true,
            openloop_out: 0,
            velocity_timer: 0,
            torque_cmd_timer: 0,
            torque_sensor_wdog: 0,
            pid_pos: PidFilter::new(settings.frequency_hz),
            pid_trq: PidFilter::new(settings.frequency_hz),
            trajectory,
            last_ref: TrajectoryRef::default(),
        }
    }

    /// Apply a complete joint configuration.
    pub fn configure(&mut self, joint: &JointConfig) {
        self.set_limits(joint.pos_min, joint.pos_max, joint.vel_max);
        self.set_vel_timeout(joint.velocity_timeout);
        self.set_position_pid(&joint.position_pid);
        self.set_torque_pid(&joint.torque_pid);
        let ImpedanceParams {
            stiffness,
            damping,
            offset,
        } = joint.impedance;
        self.set_impedance(stiffness, damping, offset);
        if joint.calibrated {
            self.set_calibrated();
        }
        info!(
            axis = self.index,
            name = %joint.name,
            pos_min = joint.pos_min,
            pos_max = joint.pos_max,
            ready = self.readiness.is_ready(),
            "Axis configured"
        );
    }

    // ─── Mode State Machine ─────────────────────────────────────────

    /// Request a control mode change.
    pub fn set_control_mode(&mut self, command: ControlCommand) -> ModeTransition {
        let previous = self.mode;
        match decide(self.mode, command, self.readiness, self.settings.profile) {
            ModeDecision::Enter(target) => {
                self.enter_mode(target);
                debug!(
                    axis = self.index,
                    from = ?previous,
                    to = ?target,
                    ?command,
                    "Control mode changed"
                );
                ModeTransition::Ok(target)
            }
            ModeDecision::Unconfigured => {
                self.mode = ControlMode::NotConfigured;
                warn!(
                    axis = self.index,
                    ?command,
                    readiness = self.readiness.bits(),
                    "Control mode rejected: axis not ready"
                );
                ModeTransition::Rejected("axis not ready")
            }
            ModeDecision::Reject(reason) => {
                warn!(axis = self.index, mode = ?previous, ?command, reason, "Control mode rejected");
                ModeTransition::Rejected(reason)
            }
        }
    }

    fn enter_mode(&mut self, target: ControlMode) {
        match target {
            ControlMode::Idle => self.motion_reset(),
            ControlMode::Position
            | ControlMode::Direct
            | ControlMode::Velocity
            | ControlMode::Mixed => {
                self.pid_pos.reset();
                self.stop();
                self.err = 0;
            }
            ControlMode::Torque | ControlMode::ImpedancePos | ControlMode::ImpedanceVel => {
                self.pid_trq.reset();
                self.stop();
                self.torque_ref = 0;
                self.err = 0;
                self.torque_cmd_timer = self.settings.watchdogs.torque_command_timeout;
                // Samples taken before entry count as stale.
                self.torque_meas = 0;
                self.torque_sensor_wdog = 0;
            }
            ControlMode::OpenLoop => {
                self.openloop_out = 0;
                self.err = 0;
            }
            ControlMode::NotConfigured | ControlMode::Calib | ControlMode::HwFault => {}
        }
        if target.is_velocity_like() {
            self.velocity_timer = self.velocity_timeout;
        }
        self.mode = target;
    }

    /// Reset both loops and park the trajectory at the measured position.
    fn motion_reset(&mut self) {
        self.pid_pos.reset();
        self.pid_trq.reset();
        self.stop();
        self.torque_cmd_timer = 0;
        self.torque_ref = 0;
        self.err = 0;
    }

    /// Latch a hardware fault. Only `ForceIdle` leaves it.
    pub fn enter_hw_fault(&mut self) {
        if self.mode != ControlMode::HwFault {
            warn!(axis = self.index, mode = ?self.mode, "Hardware fault latched");
        }
        self.mode = ControlMode::HwFault;
        self.torque_ref = 0;
    }

    /// Enter calibration regardless of readiness.
    pub fn start_calibration(&mut self) {
        self.readiness.insert(Readiness::NOT_CALIBRATED);
        self.mode = ControlMode::Calib;
        info!(axis = self.index, "Calibration started");
    }

    pub fn set_calibrated(&mut self) {
        self.readiness.remove(Readiness::NOT_CALIBRATED);
    }

    // ─── Cycle ──────────────────────────────────────────────────────

    /// Evaluate the active law. Returns `(command, stiff)`.
    pub fn step(&mut self) -> (i32, bool) {
        match self.mode {
            ControlMode::Calib => {
                if self.readiness.is_calibrated() {
                    self.pid_pos.reset();
                    self.park_trajectory();
                    self.stop();
                    self.mode = ControlMode::Position;
                }
                self.stiff = true;
                self.err = 0;
                (0, true)
            }
            ControlMode::Idle | ControlMode::NotConfigured | ControlMode::HwFault => {
                self.park_trajectory();
                self.err = 0;
                (0, true)
            }
            ControlMode::OpenLoop => {
                self.park_trajectory();
                self.err = 0;
                (self.openloop_out, true)
            }
            ControlMode::Velocity
            | ControlMode::Mixed
            | ControlMode::Position
            | ControlMode::Direct => {
                if matches!(self.mode, ControlMode::Velocity | ControlMode::Mixed)
                    && !tick(&mut self.velocity_timer)
                {
                    self.trajectory.velocity_stop();
                    if self.mode == ControlMode::Velocity {
                        self.mode = ControlMode::Position;
                    }
                }
                let err = self.tracking_error();
                if self.stiff {
                    self.err = err;
                    (self.pid_pos.step(f64::from(err)), true)
                } else {
                    self.update_impedance_torque(err);
                    (self.torque_law(), false)
                }
            }
            ControlMode::ImpedanceVel | ControlMode::ImpedancePos | ControlMode::Torque => {
                if self.mode == ControlMode::ImpedanceVel && !tick(&mut self.velocity_timer) {
                    self.trajectory.velocity_stop();
                    self.mode = ControlMode::ImpedancePos;
                    self.err = 0;
                }
                if self.mode == ControlMode::Torque {
                    self.err = 0;
                } else {
                    let err = self.tracking_error();
                    self.update_impedance_torque(err);
                }

                if !tick(&mut self.torque_sensor_wdog) || !tick(&mut self.torque_cmd_timer) {
                    self.torque_ref = 0;
                    self.torque_meas = 0;
                    return (0, false);
                }
                (self.torque_law(), false)
            }
        }
    }

    #[inline]
    fn park_trajectory(&mut self) {
        self.trajectory.init(self.position, self.velocity, 0);
        self.last_ref = TrajectoryRef {
            pos: f64::from(self.position),
            vel: f64::from(self.velocity),
            acc: 0.0,
        };
    }

    #[inline]
    fn tracking_error(&mut self) -> i32 {
        self.last_ref = self.trajectory.step();
        saturate(self.last_ref.pos as i64 - i64::from(self.position))
    }

    #[inline]
    fn update_impedance_torque(&mut self, err: i32) {
        let err64 = i64::from(err);
        let tau = i64::from(self.torque_off)
            + i64::from(self.stiffness) * err64 / 1000
            + i64::from(self.damping) * (err64 - i64::from(self.err));
        self.torque_ref = saturate(tau);
        self.err = err;
    }

    #[inline]
    fn torque_law(&mut self) -> i32 {
        self.pid_trq.step_filtered_torque_pi(
            f64::from(self.torque_ref),
            f64::from(self.torque_meas),
            self.settings.torque_cutoff,
        )
    }

    // ─── Reference Commands ─────────────────────────────────────────

    /// Move to `target` at `avg_vel`.
    ///
    /// Velocity hands over to Position; Torque and ImpedanceVel hand over to
    /// ImpedancePos.
    pub fn set_position_reference(&mut self, target: i32, avg_vel: i32) -> bool {
        if !self.readiness.is_ready() {
            return false;
        }
        match self.position_handover(false) {
            Some(_) => {
                self.trajectory
                    .set_position_reference(self.position, target, avg_vel);
                true
            }
            None => false,
        }
    }

    /// Jump the trajectory to `pos`. Also accepted in Direct.
    pub fn set_raw_position(&mut self, pos: i32) -> bool {
        if !self.readiness.is_ready() {
            return false;
        }
        match self.position_handover(true) {
            Some(_) => {
                self.trajectory.set_raw_position(pos);
                true
            }
            None => false,
        }
    }

    fn position_handover(&mut self, raw: bool) -> Option<ControlMode> {
        let target = match self.mode {
            ControlMode::Direct if raw => ControlMode::Direct,
            ControlMode::Velocity | ControlMode::Position => ControlMode::Position,
            ControlMode::Mixed => ControlMode::Mixed,
            ControlMode::Torque | ControlMode::ImpedanceVel | ControlMode::ImpedancePos => {
                self.torque_cmd_timer = self.settings.watchdogs.torque_command_timeout;
                ControlMode::ImpedancePos
            }
            _ => return None,
        };
        self.mode = target;
        Some(target)
    }

    /// Track velocity `vel` reached with `avg_acc`; re-arms the velocity timeout.
    ///
    /// Position hands over to Velocity; Torque and ImpedancePos hand over to
    /// ImpedanceVel.
    pub fn set_velocity_reference(&mut self, vel: i32, avg_acc: i32) -> bool {
        if !self.readiness.is_ready() {
            return false;
        }
        let target = match self.mode {
            ControlMode::Position | ControlMode::Velocity => ControlMode::Velocity,
            ControlMode::Mixed => ControlMode::Mixed,
            ControlMode::Torque | ControlMode::ImpedancePos | ControlMode::ImpedanceVel => {
                self.torque_cmd_timer = self.settings.watchdogs.torque_command_timeout;
                ControlMode::ImpedanceVel
            }
            _ => return false,
        };
        self.mode = target;
        self.velocity_timer = self.velocity_timeout;
        self.trajectory.set_velocity_reference(vel, avg_acc);
        true
    }

    /// Set the torque reference; re-arms the torque command timeout.
    ///
    /// Outside `Torque` the reference is zeroed and the request rejected.
    pub fn set_torque_reference(&mut self, torque: i32) -> bool {
        if !self.readiness.is_ready() || self.mode != ControlMode::Torque {
            self.torque_ref = 0;
            return false;
        }
        self.torque_ref = torque;
        self.torque_cmd_timer = self.settings.watchdogs.torque_command_timeout;
        true
    }

    /// Set the open-loop output. Accepted only in `OpenLoop`.
    pub fn set_open_loop_output(&mut self, output: i32) -> bool {
        if self.mode != ControlMode::OpenLoop {
            return false;
        }
        self.openloop_out = output;
        true
    }

    /// Decelerate the trajectory to rest from the measured position.
    pub fn stop(&mut self) {
        self.trajectory
            .stop(self.position, CHANGE_MODE_STOP_ACC);
    }

    // ─── Configuration ──────────────────────────────────────────────

    pub fn set_limits(&mut self, pos_min: i32, pos_max: i32, vel_max: i32) {
        self.set_pos_min(pos_min);
        self.set_pos_max(pos_max);
        self.set_vel_max(vel_max);
    }

    pub fn set_pos_min(&mut self, pos_min: i32) {
        self.readiness.remove(Readiness::NO_MIN_LIMIT);
        self.pos_min = pos_min;
        self.trajectory.set_pos_min(pos_min);
    }

    pub fn set_pos_max(&mut self, pos_max: i32) {
        self.readiness.remove(Readiness::NO_MAX_LIMIT);
        self.pos_max = pos_max;
        self.trajectory.set_pos_max(pos_max);
    }

    pub fn set_vel_max(&mut self, vel_max: i32) {
        self.readiness.remove(Readiness::NO_VEL_LIMIT);
        self.vel_max = vel_max;
        self.trajectory.set_vel_max(vel_max);
    }

    /// Velocity command timeout [cycles].
    pub fn set_vel_timeout(&mut self, cycles: u32) {
        self.readiness.remove(Readiness::NO_VEL_TIMEOUT);
        self.velocity_timeout = cycles;
    }

    pub fn set_position_pid(&mut self, gains: &PidGains) {
        self.readiness.remove(Readiness::NO_POS_PID);
        self.pid_pos.configure(gains);
    }

    pub fn set_torque_pid(&mut self, gains: &PidGains) {
        self.readiness.remove(Readiness::NO_TRQ_PID);
        self.pid_trq.configure(gains);
    }

    /// Virtual stiffness, damping and torque offset of the compliant laws.
    ///
    /// Damping is stored scaled by `frequency / 1000`.
    pub fn set_impedance(&mut self, stiffness: i32, damping: i32, offset: i32) {
        self.stiffness = stiffness;
        self.damping =
            saturate(i64::from(damping) * i64::from(self.settings.frequency_hz) / 1000);
        self.torque_off = offset;
    }

    pub fn get_impedance(&self) -> ImpedanceParams {
        let damping = if self.settings.frequency_hz == 0 {
            0
        } else {
            saturate(i64::from(self.damping) * 1000 / i64::from(self.settings.frequency_hz))
        };
        ImpedanceParams {
            stiffness: self.stiffness,
            damping,
            offset: self.torque_off,
        }
    }

    /// Switching to stiff resets motion state.
    pub fn set_stiff(&mut self, stiff: bool) -> bool {
        self.stiff = stiff;
        if stiff {
            self.motion_reset();
        }
        true
    }

    // ─── Sensors ────────────────────────────────────────────────────

    #[inline]
    pub fn set_encoder_position(&mut self, position: i32) {
        self.position = position;
    }

    #[inline]
    pub fn set_encoder_velocity(&mut self, velocity: i32) {
        self.velocity = velocity;
    }

    /// Measured torque; a changed sample re-arms the sensor watchdog.
    #[inline]
    pub fn set_torque(&mut self, torque: i32) {
        if self.torque_meas != torque {
            self.torque_meas = torque;
            self.torque_sensor_wdog = self.settings.watchdogs.torque_sensor_timeout;
        }
    }

    /// Reconstruct the joint position from the three shoulder encoders
    /// using this axis' limits.
    pub fn encoder_range_adjust(&self, encoders: [i32; 3]) -> i32 {
        encoder_range_adjust(encoders, self.pos_min, self.pos_max, &self.settings.encoder)
    }

    // ─── Status ─────────────────────────────────────────────────────

    /// Trajectory finished, in modes that follow a trajectory.
    pub fn get_motion_done(&self) -> bool {
        self.mode.follows_trajectory() && self.trajectory.is_done()
    }

    pub fn get_joint_status(&self) -> JointStatus {
        JointStatus {
            position: self.position,
            velocity: self.velocity,
            acceleration: self.last_ref.acc as i32,
            torque: self.torque_meas,
            mode: self.mode,
        }
    }

    /// Reference, error and output of the loop currently in charge.
    pub fn get_active_pid_status(&self) -> PidStatus {
        let reference = match self.mode {
            ControlMode::Velocity | ControlMode::ImpedanceVel => self.trajectory.velocity() as i32,
            ControlMode::Position
            | ControlMode::Direct
            | ControlMode::Mixed
            | ControlMode::ImpedancePos => self.trajectory.position() as i32,
            ControlMode::Torque => self.torque_ref,
            ControlMode::OpenLoop => self.openloop_out,
            _ => 0,
        };
        let (output, error) = match self.mode {
            m if m.is_position_like() && self.stiff => self.pid_pos.status(),
            m if m.is_position_like() || m.is_torque_like() => self.pid_trq.status(),
            ControlMode::OpenLoop => (self.openloop_out, 0),
            _ => (0, 0),
        };
        PidStatus {
            reference,
            error,
            output,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub const fn index(&self) -> u8 {
        self.index
    }

    #[inline]
    pub const fn control_mode(&self) -> ControlMode {
        self.mode
    }

    #[inline]
    pub const fn readiness(&self) -> Readiness {
        self.readiness
    }

    #[inline]
    pub const fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    #[inline]
    pub const fn is_calibrated(&self) -> bool {
        self.readiness.is_calibrated()
    }

    #[inline]
    pub const fn is_stiff(&self) -> bool {
        self.stiff
    }

    #[inline]
    pub const fn position(&self) -> i32 {
        self.position
    }

    #[inline]
    pub const fn torque_reference(&self) -> i32 {
        self.torque_ref
    }

    #[inline]
    pub const fn torque_measured(&self) -> i32 {
        self.torque_meas
    }

    #[inline]
    pub const fn limits(&self) -> (i32, i32) {
        (self.pos_min, self.pos_max)
    }

    #[inline]
    pub const fn position_pid(&self) -> &PidFilter {
        &self.pid_pos
    }

    #[inline]
    pub const fn torque_pid(&self) -> &PidFilter {
        &self.pid_trq
    }

    #[inline]
    pub fn trajectory(&self) -> &T {
        &self.trajectory
    }

    #[inline]
    pub fn trajectory_mut(&mut self) -> &mut T {
        &mut self.trajectory
    }
}

/// Count a timer down. Returns false if it had already expired.
#[inline]
fn tick(timer: &mut u32) -> bool {
    if *timer > 0 {
        *timer -= 1;
        true
    } else {
        false
    }
}

#[inline]
fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

// ─── Tests ──────────────────────────────────────────────────────────
