//! Telemetry snapshots reported by the joint controller.

use serde::{Deserialize, Serialize};

use super::state::ControlMode;

/// Per-joint status reported to the host every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointStatus {
    /// Measured position [ticks].
    pub position: i32,
    /// Measured velocity [ticks/s].
    pub velocity: i32,
    /// Trajectory acceleration [ticks/s²].
    pub acceleration: i32,
    /// Measured torque [sensor counts].
    pub torque: i32,
    pub mode: ControlMode,
}

/// Snapshot of the PID loop currently driving the joint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidStatus {
    /// Reference of the active loop (position or torque).
    pub reference: i32,
    /// Last error seen by the active loop.
    pub error: i32,
    /// Last output of the active loop.
    pub output: i32,
}
