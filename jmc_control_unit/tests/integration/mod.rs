//! Shared fixtures for the integration tests.

pub mod board;
pub mod config;
pub mod coupling;
pub mod encoder;
pub mod modes;
pub mod watchdogs;

use jmc_common::control_unit::config::WatchdogConfig;
use jmc_common::control_unit::control::PidGains;
use jmc_control_unit::state::{AxisController, AxisSettings};
use jmc_control_unit::trajectory::RampTrajectory;

pub const FREQ: u32 = 1000;

pub fn p_gains(kp: f64) -> PidGains {
    PidGains {
        kp,
        ..PidGains::default()
    }
}

/// Axis with limits, timeouts and both PIDs set, but not calibrated.
pub fn configured_axis(settings: AxisSettings) -> AxisController<RampTrajectory> {
    let mut axis = AxisController::new(0, RampTrajectory::new(settings.frequency_hz), settings);
    axis.set_limits(-20_000, 20_000, 40_000);
    axis.set_vel_timeout(5);
    axis.set_position_pid(&p_gains(1.0));
    axis.set_torque_pid(&p_gains(1.0));
    axis
}

/// Fully ready axis with default settings.
pub fn ready_axis() -> AxisController<RampTrajectory> {
    let mut axis = configured_axis(AxisSettings::default());
    axis.set_calibrated();
    axis
}

/// Ready axis with custom torque watchdogs.
pub fn ready_axis_with_watchdogs(command: u32, sensor: u32) -> AxisController<RampTrajectory> {
    let settings = AxisSettings {
        watchdogs: WatchdogConfig {
            torque_command_timeout: command,
            torque_sensor_timeout: sensor,
        },
        ..AxisSettings::default()
    };
    let mut axis = configured_axis(settings);
    axis.set_calibrated();
    axis
}

/// Minimal board TOML with `joints` identical joints.
pub fn board_toml(topology: &str, joints: usize) -> String {
    let mut toml = format!(
        r#"
[shared]
service_name = "integration"

[coupling]
motors = 4
nominal_current = 5000
topology = {{ kind = "{topology}" }}
"#
    );
    for i in 0..joints {
        toml.push_str(&format!(
            r#"
[[joints]]
name = "j{i}"
pos_min = -30000
pos_max = 30000
vel_max = 40000
velocity_timeout = 50
calibrated = true
position_pid = {{ kp = 1.0 }}
torque_pid = {{ kp = 1.0 }}
"#
        ));
    }
    toml
}
