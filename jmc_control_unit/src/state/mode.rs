//! Control mode transition table.
//!
//! ```text
//! HwFault      ── ForceIdle ──────────────────────────▶ Idle
//! Calib        ── Idle | SwitchEverythingOff ─────────▶ Idle
//! (not ready)  ── any ────────────────────────────────▶ NotConfigured (rejected)
//! any          ── Idle | SwitchEverythingOff | ForceIdle ▶ Idle
//! any          ── Position | Velocity | Direct | Mixed ──▶ same
//! any          ── Torque | ImpedancePos | ImpedanceVel ──▶ same
//! any          ── OpenLoop (Legacy profile only) ──────▶ OpenLoop
//! any          ── Current ─────────────────────────────▶ rejected
//! ```
//!
//! The table is pure; the side effects of entering a mode (PID resets,
//! trajectory stop, timer arming) live in the axis controller.

use jmc_common::control_unit::error::Readiness;
use jmc_common::control_unit::state::{ControlCommand, ControlMode, ControlProfile};

/// Result of a control mode change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeTransition {
    /// Request accepted, axis now in this mode.
    Ok(ControlMode),
    /// Request rejected, reason.
    Rejected(&'static str),
}

impl ModeTransition {
    #[inline]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Outcome of looking a request up in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeDecision {
    /// Enter `mode`.
    Enter(ControlMode),
    /// Configuration incomplete: drop to `NotConfigured` and reject.
    Unconfigured,
    /// Keep the current mode and reject.
    Reject(&'static str),
}

/// Look up `command` issued in mode `current`.
pub fn decide(
    current: ControlMode,
    command: ControlCommand,
    readiness: Readiness,
    profile: ControlProfile,
) -> ModeDecision {
    use ControlCommand as C;
    use ModeDecision::*;

    match current {
        ControlMode::HwFault => {
            return match command {
                C::ForceIdle => Enter(ControlMode::Idle),
                _ => Reject("hardware fault: only force-idle accepted"),
            };
        }
        ControlMode::Calib => {
            return match command {
                C::Idle | C::SwitchEverythingOff => Enter(ControlMode::Idle),
                _ => Reject("calibrating: only idle accepted"),
            };
        }
        _ => {}
    }

    if !readiness.is_ready() {
        return Unconfigured;
    }

    match (command, profile) {
        (C::ForceIdle | C::Idle | C::SwitchEverythingOff, _) => Enter(ControlMode::Idle),
        (C::Position, _) => Enter(ControlMode::Position),
        (C::Velocity, _) => Enter(ControlMode::Velocity),
        (C::Direct, _) => Enter(ControlMode::Direct),
        (C::Mixed, _) => Enter(ControlMode::Mixed),
        (C::Torque, _) => Enter(ControlMode::Torque),
        (C::ImpedancePos, _) => Enter(ControlMode::ImpedancePos),
        (C::ImpedanceVel, _) => Enter(ControlMode::ImpedanceVel),
        (C::OpenLoop, ControlProfile::Legacy) => Enter(ControlMode::OpenLoop),
        (C::OpenLoop, ControlProfile::Default) => Reject("open loop not available in this profile"),
        (C::Current, _) => Reject("current control not supported"),
    }
}
