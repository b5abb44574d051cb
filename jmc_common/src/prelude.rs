//! Prelude module for common re-exports.
//!
//! `use jmc_common::prelude::*;` brings in the types almost every consumer
//! of the workspace needs.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::control_unit::config::{BoardConfig, Topology};

// ─── Control ────────────────────────────────────────────────────────
pub use crate::control_unit::error::{MotorMask, Readiness};
pub use crate::control_unit::state::{ControlCommand, ControlMode, ControlProfile};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CONTROL_FREQUENCY_HZ, MAX_JOINTS, MAX_MOTORS};
