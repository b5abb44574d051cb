//! JMC Common Library
//!
//! Shared constants, configuration loading and state types for the joint
//! motor control workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Hardware and control-loop limits
//! - [`config`] - Configuration loading traits and types
//! - [`control_unit`] - Control modes, readiness flags, board configuration, status snapshots
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use jmc_common::prelude::*;
//! use jmc_common::control_unit::state::ControlMode;
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod prelude;
