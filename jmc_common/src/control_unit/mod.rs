//! Control unit shared types.
//!
//! Everything the joint controller, the coupling stage and the board
//! harness exchange lives here, organized by domain: control mode and
//! command enums, readiness and motor bitflags, gain/filter parameters,
//! board configuration structures and telemetry snapshots.

pub mod config;
pub mod control;
pub mod error;
pub mod state;
pub mod status;
