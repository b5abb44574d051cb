//! Integration test: the shipped board configuration.

use std::path::PathBuf;

use jmc_common::control_unit::config::Topology;
use jmc_common::control_unit::control::TorqueCutoff;
use jmc_common::control_unit::state::ControlProfile;
use jmc_control_unit::board::BoardController;
use jmc_control_unit::config::load_config;
use jmc_control_unit::trajectory::RampTrajectory;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/board.toml")
}

#[test]
fn sample_config_loads() {
    let config = load_config(&sample_path()).unwrap();
    assert_eq!(config.shared.service_name, "shoulder-board-left");
    assert_eq!(config.control.frequency_hz, 1000);
    assert_eq!(config.control.profile, ControlProfile::Default);
    assert_eq!(config.control.torque_cutoff, TorqueCutoff::Slow);
    assert_eq!(config.coupling.topology, Topology::ShoulderTendon);
    assert_eq!(config.joints.len(), 4);
    assert_eq!(config.joints[3].name, "elbow");
}

#[test]
fn sample_board_starts_ready_and_quiet() {
    let config = load_config(&sample_path()).unwrap();
    let mut board = BoardController::from_config(&config, |_| RampTrajectory::new(1000)).unwrap();
    assert!(board.axes().iter().all(|axis| axis.is_ready()));

    let out = board.cycle();
    assert!(!out.cable_alarm);
    assert_eq!(out.pwm.motors, [0; 4]);
}

#[test]
fn sample_impedance_round_trips() {
    let config = load_config(&sample_path()).unwrap();
    let board = BoardController::from_config(&config, |_| RampTrajectory::new(1000)).unwrap();
    let impedance = board.axis(0).unwrap().get_impedance();
    assert_eq!(impedance.stiffness, 2000);
    assert_eq!(impedance.damping, 5);
}
