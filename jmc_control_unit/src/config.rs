//! Board configuration loader with validation.
//!
//! Parses a board TOML into [`BoardConfig`] and runs the checks that span
//! several sections: field bounds (via `BoardConfig::validate`), joint name
//! uniqueness, and cable limits only on boards that have a tendon shoulder.

use std::collections::HashSet;
use std::path::Path;

use jmc_common::config::{ConfigError, ConfigLoader};
use jmc_common::control_unit::config::{BoardConfig, JointConfig, Topology};
use tracing::info;

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate a board configuration file.
pub fn load_config(path: &Path) -> Result<BoardConfig, ConfigError> {
    let config = BoardConfig::load(path)?;
    validate_board_config(&config)?;
    info!(
        path = %path.display(),
        service = %config.shared.service_name,
        joints = config.joints.len(),
        topology = config.coupling.topology.kind_name(),
        "Board config loaded"
    );
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<BoardConfig, ConfigError> {
    let config = BoardConfig::from_toml(content)?;
    validate_board_config(&config)?;
    Ok(config)
}

// ─── Validation ─────────────────────────────────────────────────────

/// Run every board-level rule.
pub fn validate_board_config(config: &BoardConfig) -> Result<(), ConfigError> {
    config.validate()?;
    validate_joint_names(&config.joints)?;
    validate_cable_limits(config)?;
    Ok(())
}

fn validate_joint_names(joints: &[JointConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::with_capacity(joints.len());
    for joint in joints {
        if !seen.insert(joint.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate joint name '{}'",
                joint.name
            )));
        }
    }
    Ok(())
}

fn validate_cable_limits(config: &BoardConfig) -> Result<(), ConfigError> {
    let coupling = &config.coupling;
    if coupling.cable_limits.is_some() && coupling.topology != Topology::ShoulderTendon {
        return Err(ConfigError::ValidationError(format!(
            "cable_limits require the shoulder_tendon topology, found {}",
            coupling.topology.kind_name()
        )));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────
