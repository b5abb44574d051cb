//! Board configuration structures.
//!
//! All config types use `serde::Deserialize` for TOML loading. Optional
//! fields use `#[serde(default)]` so older board files keep loading.
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! service_name = "waist-board"
//!
//! [control]
//! frequency_hz = 1000
//! profile = "default"
//! torque_cutoff = "slow"
//!
//! [coupling]
//! motors = 3
//! nominal_current = 10000
//! topology = { kind = "waist_differential" }
//!
//! [[joints]]
//! name = "waist-pitch"
//! pos_min = -20000
//! pos_max = 20000
//! vel_max = 30000
//! velocity_timeout = 100
//! position_pid = { kp = 2.0, kd = 0.1, ki = 0.01, integral_limit = 3000.0, output_limit = 8000 }
//! torque_pid = { kp = 1.0, ki = 0.2, integral_limit = 5000.0, output_limit = 8000 }
//! ```

use heapless::Vec as HVec;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    CABLE_WARNING_MARGIN, CONTROL_FREQUENCY_HZ, CONTROL_FREQUENCY_HZ_MAX, CONTROL_FREQUENCY_HZ_MIN,
    ENCODER_ALIAS_PERIOD, MAX_JOINTS, MAX_MOTORS, NOMINAL_CURRENT, SHOULDER_RATIO_DEN,
    SHOULDER_RATIO_NUM, TORQUE_CMD_TIMEOUT, TORQUE_SENSOR_TIMEOUT, VELOCITY_CMD_TIMEOUT,
};

use super::control::{ImpedanceParams, PidGains, TorqueCutoff};
use super::state::ControlProfile;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete description of one motor control board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub watchdogs: WatchdogConfig,
    #[serde(default)]
    pub encoder: EncoderAliasConfig,
    #[serde(default)]
    pub coupling: CouplingConfig,
    /// Per-joint configuration, index = joint number.
    #[serde(default)]
    pub joints: Vec<JointConfig>,
}

impl BoardConfig {
    /// Validate parameter bounds and cross-section consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.control.validate().map_err(ConfigError::ValidationError)?;
        self.encoder.validate().map_err(ConfigError::ValidationError)?;
        self.coupling.validate().map_err(ConfigError::ValidationError)?;

        if self.joints.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one joint is required".to_string(),
            ));
        }
        if self.joints.len() > MAX_JOINTS {
            return Err(ConfigError::ValidationError(format!(
                "{} joints configured, maximum is {}",
                self.joints.len(),
                MAX_JOINTS
            )));
        }
        let needed = self.coupling.topology.min_joints();
        if self.joints.len() < needed {
            return Err(ConfigError::ValidationError(format!(
                "topology {} needs {} joints, {} configured",
                self.coupling.topology.kind_name(),
                needed,
                self.joints.len()
            )));
        }
        for (index, joint) in self.joints.iter().enumerate() {
            joint
                .validate()
                .map_err(|e| ConfigError::ValidationError(format!("joints[{index}]: {e}")))?;
        }
        Ok(())
    }
}

// ─── Control ────────────────────────────────────────────────────────

/// Loop timing and behaviour shared by all joints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Control loop frequency [Hz] (default: 1000).
    #[serde(default = "default_frequency")]
    pub frequency_hz: u32,
    #[serde(default)]
    pub profile: ControlProfile,
    #[serde(default)]
    pub torque_cutoff: TorqueCutoff,
}

fn default_frequency() -> u32 {
    CONTROL_FREQUENCY_HZ
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            frequency_hz: CONTROL_FREQUENCY_HZ,
            profile: ControlProfile::default(),
            torque_cutoff: TorqueCutoff::default(),
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(CONTROL_FREQUENCY_HZ_MIN..=CONTROL_FREQUENCY_HZ_MAX).contains(&self.frequency_hz) {
            return Err(format!(
                "frequency_hz {} out of range [{}, {}]",
                self.frequency_hz, CONTROL_FREQUENCY_HZ_MIN, CONTROL_FREQUENCY_HZ_MAX
            ));
        }
        Ok(())
    }
}

// ─── Watchdogs ──────────────────────────────────────────────────────

/// Torque-path timeouts [cycles].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Cycles a torque reference stays valid without refresh.
    #[serde(default = "default_torque_cmd")]
    pub torque_command_timeout: u32,
    /// Cycles a torque sensor sample stays valid without change.
    #[serde(default = "default_torque_sensor")]
    pub torque_sensor_timeout: u32,
}

fn default_torque_cmd() -> u32 {
    TORQUE_CMD_TIMEOUT
}
fn default_torque_sensor() -> u32 {
    TORQUE_SENSOR_TIMEOUT
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            torque_command_timeout: TORQUE_CMD_TIMEOUT,
            torque_sensor_timeout: TORQUE_SENSOR_TIMEOUT,
        }
    }
}

// ─── Encoder Alias ──────────────────────────────────────────────────

/// Multi-encoder reconstruction of the tendon shoulder joint.
///
/// `jp = e0 - e1 + (ratio_num * e2) / ratio_den`, aliased every `period` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderAliasConfig {
    #[serde(default = "default_ratio_num")]
    pub ratio_num: i32,
    #[serde(default = "default_ratio_den")]
    pub ratio_den: i32,
    #[serde(default = "default_period")]
    pub period: i32,
}

fn default_ratio_num() -> i32 {
    SHOULDER_RATIO_DEN
}
fn default_ratio_den() -> i32 {
    SHOULDER_RATIO_NUM
}
fn default_period() -> i32 {
    ENCODER_ALIAS_PERIOD
}

impl Default for EncoderAliasConfig {
    fn default() -> Self {
        Self {
            ratio_num: SHOULDER_RATIO_DEN,
            ratio_den: SHOULDER_RATIO_NUM,
            period: ENCODER_ALIAS_PERIOD,
        }
    }
}

impl EncoderAliasConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.ratio_den == 0 {
            return Err("encoder.ratio_den must be non-zero".to_string());
        }
        if self.period <= 0 {
            return Err(format!("encoder.period {} must be > 0", self.period));
        }
        Ok(())
    }
}

// ─── Coupling ───────────────────────────────────────────────────────

/// Joint-to-motor mapping of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// `m_i = j_i`.
    #[default]
    Independent,
    /// Two-joint differential waist on motors 0 and 1, motor 2 follows joint 2.
    WaistDifferential,
    /// Three-joint tendon shoulder (65/40 pulleys), motor 3 independent.
    ShoulderTendon,
    /// Arbitrary joint-to-motor matrix, one row per motor.
    Matrix { rows: HVec<[f32; MAX_JOINTS], MAX_MOTORS> },
}

impl Topology {
    /// Joints the transform reads.
    pub fn min_joints(&self) -> usize {
        match self {
            Self::Independent => 1,
            Self::WaistDifferential | Self::ShoulderTendon => 3,
            Self::Matrix { .. } => 1,
        }
    }

    /// Motors the transform writes.
    pub fn min_motors(&self) -> usize {
        match self {
            Self::Independent => 1,
            Self::WaistDifferential | Self::ShoulderTendon => 3,
            Self::Matrix { rows } => rows.len(),
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::WaistDifferential => "waist_differential",
            Self::ShoulderTendon => "shoulder_tendon",
            Self::Matrix { .. } => "matrix",
        }
    }
}

/// Cable tension envelope of the tendon shoulder (values ×100 joint units).
///
/// Every bound is shrunk by `margin` before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CableLimits {
    /// Lower bound of `171·(j0 − j1)`.
    pub j0_minus_j1_min: i32,
    /// Bounds of `171·(j0 − j1 − j2)`.
    pub j0_minus_j1_j2_min: i32,
    pub j0_minus_j1_j2_max: i32,
    /// Bounds of `100·j1 + j2`.
    pub j1_plus_j2_min: i32,
    pub j1_plus_j2_max: i32,
    /// Bounds of `100·j0`.
    pub j0_min: i32,
    pub j0_max: i32,
    /// Bounds of `100·j1`.
    pub j1_min: i32,
    pub j1_max: i32,
    /// Bounds of `100·j2`.
    pub j2_min: i32,
    pub j2_max: i32,
    /// Safety margin subtracted from every range.
    pub margin: i32,
}

impl Default for CableLimits {
    fn default() -> Self {
        Self {
            j0_minus_j1_min: -34_700,
            j0_minus_j1_j2_min: -36_657,
            j0_minus_j1_j2_max: 11_242,
            j1_plus_j2_min: -6_660,
            j1_plus_j2_max: 21_330,
            j0_min: -9_600,
            j0_max: 500,
            j1_min: 0,
            j1_max: 19_500,
            j2_min: -9_000,
            j2_max: 9_000,
            margin: 0,
        }
    }
}

impl CableLimits {
    /// Default envelope shrunk by the cable warning margin.
    pub fn with_warning() -> Self {
        Self {
            margin: CABLE_WARNING_MARGIN,
            ..Self::default()
        }
    }
}

/// `[coupling]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingConfig {
    /// Motors driven by the board.
    #[serde(default = "default_motors")]
    pub motors: usize,
    /// Symmetric clamp of every motor command [PWM counts].
    #[serde(default = "default_nominal_current")]
    pub nominal_current: i16,
    #[serde(default)]
    pub topology: Topology,
    /// Cable envelope; only evaluated for the tendon topology.
    #[serde(default)]
    pub cable_limits: Option<CableLimits>,
}

fn default_motors() -> usize {
    MAX_MOTORS
}
fn default_nominal_current() -> i16 {
    NOMINAL_CURRENT
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            motors: MAX_MOTORS,
            nominal_current: NOMINAL_CURRENT,
            topology: Topology::default(),
            cable_limits: None,
        }
    }
}

impl CouplingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.motors == 0 || self.motors > MAX_MOTORS {
            return Err(format!(
                "coupling.motors {} out of range [1, {}]",
                self.motors, MAX_MOTORS
            ));
        }
        if self.nominal_current <= 0 {
            return Err(format!(
                "coupling.nominal_current {} must be > 0",
                self.nominal_current
            ));
        }
        if self.motors < self.topology.min_motors() {
            return Err(format!(
                "topology {} drives {} motors, only {} configured",
                self.topology.kind_name(),
                self.topology.min_motors(),
                self.motors
            ));
        }
        if let Topology::Matrix { rows } = &self.topology {
            if rows.is_empty() {
                return Err("matrix topology needs at least one row".to_string());
            }
            if rows.iter().flatten().any(|c| !c.is_finite()) {
                return Err("matrix coefficients must be finite".to_string());
            }
        }
        if let Some(limits) = &self.cable_limits {
            if limits.margin < 0 {
                return Err(format!("cable_limits.margin {} must be >= 0", limits.margin));
            }
        }
        Ok(())
    }
}

// ─── Joint ──────────────────────────────────────────────────────────

/// Per-joint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    /// Human-readable name (e.g., "shoulder-pitch").
    pub name: String,
    /// Lower position limit [ticks].
    pub pos_min: i32,
    /// Upper position limit [ticks].
    pub pos_max: i32,
    /// Velocity limit [ticks/s].
    pub vel_max: i32,
    /// Velocity command timeout [cycles].
    #[serde(default = "default_velocity_timeout")]
    pub velocity_timeout: u32,
    pub position_pid: PidGains,
    pub torque_pid: PidGains,
    #[serde(default)]
    pub impedance: ImpedanceParams,
    /// Joint is calibrated at startup (absolute encoder).
    #[serde(default)]
    pub calibrated: bool,
}

fn default_velocity_timeout() -> u32 {
    VELOCITY_CMD_TIMEOUT
}

impl JointConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name cannot be empty".to_string());
        }
        if self.pos_min >= self.pos_max {
            return Err(format!(
                "pos_min {} must be < pos_max {}",
                self.pos_min, self.pos_max
            ));
        }
        if self.vel_max <= 0 {
            return Err(format!("vel_max {} must be > 0", self.vel_max));
        }
        if self.velocity_timeout == 0 {
            return Err("velocity_timeout must be > 0".to_string());
        }
        self.position_pid
            .validate()
            .map_err(|e| format!("position_pid: {e}"))?;
        self.torque_pid
            .validate()
            .map_err(|e| format!("torque_pid: {e}"))?;
        if self.impedance.stiffness < 0 || self.impedance.damping < 0 {
            return Err("impedance stiffness and damping must be >= 0".to_string());
        }
        Ok(())
    }
}
