//! Control mode enums for the joint controller.
//!
//! All enums use `#[repr(u8)]` so they can travel in compact telemetry
//! frames. `ControlMode` is the mode an axis is in, `ControlCommand` is
//! what the host asks for, and `ControlProfile` selects which command set
//! a board accepts.

use serde::{Deserialize, Serialize};

// ─── Control Mode ───────────────────────────────────────────────────

/// Active control mode of one axis.
///
/// `HwFault` is left only through `ControlCommand::ForceIdle`.
/// `NotConfigured` is entered whenever a command arrives before the axis
/// is fully configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ControlMode {
    /// Configuration incomplete, output forced to zero.
    NotConfigured = 0,
    /// Configured but not driving, output zero.
    Idle = 1,
    /// Calibration in progress, output zero until calibrated.
    Calib = 2,
    /// Trajectory tracking with the position law.
    Position = 3,
    /// Velocity reference integrated by the trajectory generator.
    Velocity = 4,
    /// Raw position setpoints, no trajectory shaping.
    Direct = 5,
    /// Position and velocity references both accepted.
    Mixed = 6,
    /// Closed-loop torque tracking.
    Torque = 7,
    /// Virtual spring-damper around a position trajectory.
    ImpedancePos = 8,
    /// Virtual spring-damper around a velocity trajectory.
    ImpedanceVel = 9,
    /// Externally supplied output, no feedback.
    OpenLoop = 10,
    /// Hardware fault latched.
    HwFault = 11,
}

impl ControlMode {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NotConfigured),
            1 => Some(Self::Idle),
            2 => Some(Self::Calib),
            3 => Some(Self::Position),
            4 => Some(Self::Velocity),
            5 => Some(Self::Direct),
            6 => Some(Self::Mixed),
            7 => Some(Self::Torque),
            8 => Some(Self::ImpedancePos),
            9 => Some(Self::ImpedanceVel),
            10 => Some(Self::OpenLoop),
            11 => Some(Self::HwFault),
            _ => None,
        }
    }

    /// Modes whose output is forced to zero.
    #[inline]
    pub const fn is_idle_like(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured | Self::Idle | Self::Calib | Self::HwFault
        )
    }

    /// Modes driven by the position law (stiff or compliant).
    #[inline]
    pub const fn is_position_like(&self) -> bool {
        matches!(
            self,
            Self::Position | Self::Velocity | Self::Direct | Self::Mixed
        )
    }

    /// Modes that close the loop on measured torque.
    #[inline]
    pub const fn is_torque_like(&self) -> bool {
        matches!(self, Self::Torque | Self::ImpedancePos | Self::ImpedanceVel)
    }

    /// Modes guarded by the velocity command timeout.
    #[inline]
    pub const fn is_velocity_like(&self) -> bool {
        matches!(self, Self::Velocity | Self::Mixed | Self::ImpedanceVel)
    }

    /// Modes in which the trajectory generator produces the reference.
    #[inline]
    pub const fn follows_trajectory(&self) -> bool {
        self.is_position_like() || matches!(self, Self::ImpedancePos | Self::ImpedanceVel)
    }
}

/// A new axis starts idle; its first mode request checks readiness.
impl Default for ControlMode {
    fn default() -> Self {
        Self::Idle
    }
}

// ─── Control Command ────────────────────────────────────────────────

/// Mode change requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ControlCommand {
    /// Leave any mode, including `HwFault`, and go idle.
    ForceIdle = 0,
    Idle = 1,
    /// Treated as `Idle` by the axis; the board also cuts motor power.
    SwitchEverythingOff = 2,
    Position = 3,
    Velocity = 4,
    Direct = 5,
    Mixed = 6,
    Torque = 7,
    ImpedancePos = 8,
    ImpedanceVel = 9,
    /// Accepted only by boards running `ControlProfile::Legacy`.
    OpenLoop = 10,
    /// Current control, not supported by this controller.
    Current = 11,
}

impl ControlCommand {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::ForceIdle),
            1 => Some(Self::Idle),
            2 => Some(Self::SwitchEverythingOff),
            3 => Some(Self::Position),
            4 => Some(Self::Velocity),
            5 => Some(Self::Direct),
            6 => Some(Self::Mixed),
            7 => Some(Self::Torque),
            8 => Some(Self::ImpedancePos),
            9 => Some(Self::ImpedanceVel),
            10 => Some(Self::OpenLoop),
            11 => Some(Self::Current),
            _ => None,
        }
    }
}

// ─── Control Profile ────────────────────────────────────────────────

/// Command set accepted by a board.
///
/// `Default` is the current command set. `Legacy` additionally
/// accepts `ControlCommand::OpenLoop` like older boards did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlProfile {
    #[default]
    Default,
    Legacy,
}

// ─── Tests ──────────────────────────────────────────────────────────
