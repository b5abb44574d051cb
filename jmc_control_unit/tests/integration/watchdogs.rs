//! Integration test: velocity timeout, torque command timeout and torque
//! sensor watchdog.

use jmc_common::control_unit::state::{ControlCommand, ControlMode};
use jmc_control_unit::trajectory::TrajectoryGenerator;

use super::{ready_axis, ready_axis_with_watchdogs};

// ── Velocity Command Timeout ────────────────────────────────────────

#[test]
fn velocity_timeout_falls_back_to_position() {
    let mut axis = ready_axis();
    axis.set_control_mode(ControlCommand::Velocity);
    assert!(axis.set_velocity_reference(1000, 100_000));

    // Timeout is 5 cycles.
    for _ in 0..5 {
        axis.step();
        assert_eq!(axis.control_mode(), ControlMode::Velocity);
    }
    axis.step();
    assert_eq!(axis.control_mode(), ControlMode::Position);
}

#[test]
fn velocity_reference_rearms_timeout() {
    let mut axis = ready_axis();
    axis.set_control_mode(ControlCommand::Velocity);
    for _ in 0..20 {
        assert!(axis.set_velocity_reference(1000, 100_000));
        axis.step();
        axis.step();
    }
    assert_eq!(axis.control_mode(), ControlMode::Velocity);
}

#[test]
fn mixed_mode_keeps_mode_on_timeout() {
    let mut axis = ready_axis();
    axis.set_control_mode(ControlCommand::Mixed);
    axis.set_velocity_reference(1000, 100_000);
    for _ in 0..10 {
        axis.step();
    }
    assert_eq!(axis.control_mode(), ControlMode::Mixed);
}

#[test]
fn velocity_timeout_decelerates_to_rest() {
    let mut axis = ready_axis();
    axis.set_control_mode(ControlCommand::Velocity);
    axis.set_velocity_reference(2000, 1_000_000);
    for _ in 0..2000 {
        axis.step();
    }
    assert_eq!(axis.control_mode(), ControlMode::Position);
    assert!(axis.get_motion_done());
    assert_eq!(axis.trajectory_mut().step().vel, 0.0);
}

#[test]
fn impedance_velocity_timeout_falls_back_to_impedance_position() {
    let mut axis = ready_axis();
    axis.set_control_mode(ControlCommand::ImpedanceVel);
    for _ in 0..6 {
        axis.step();
    }
    assert_eq!(axis.control_mode(), ControlMode::ImpedancePos);
}

// ── Torque Command Timeout ──────────────────────────────────────────

#[test]
fn torque_command_timeout_zeroes_output() {
    let mut axis = ready_axis_with_watchdogs(3, 100);
    axis.set_control_mode(ControlCommand::Torque);
    assert!(axis.set_torque_reference(500));
    axis.set_torque(100);

    for _ in 0..3 {
        let (out, stiff) = axis.step();
        assert!(out > 0);
        assert!(!stiff);
    }
    assert_eq!(axis.step(), (0, false));
    assert_eq!(axis.torque_reference(), 0);
    assert_eq!(axis.torque_measured(), 0);

    // A fresh command restarts the loop.
    assert!(axis.set_torque_reference(500));
    axis.set_torque(100);
    assert_ne!(axis.step().0, 0);
}

#[test]
fn streamed_torque_references_keep_loop_alive() {
    let mut axis = ready_axis_with_watchdogs(3, 100);
    axis.set_control_mode(ControlCommand::Torque);
    for cycle in 0..50 {
        axis.set_torque_reference(500);
        // Alternate samples so the sensor watchdog is re-armed too.
        axis.set_torque(100 + cycle % 2);
        assert!(axis.step().0 > 0);
    }
}

#[test]
fn impedance_position_refreshed_by_position_reference() {
    let mut axis = ready_axis_with_watchdogs(3, 1000);
    axis.set_control_mode(ControlCommand::ImpedancePos);
    axis.set_impedance(1000, 0, 0);
    for cycle in 0..20 {
        assert!(axis.set_position_reference(0, 1000));
        axis.set_torque(cycle);
        axis.step();
    }
    assert_eq!(axis.control_mode(), ControlMode::ImpedancePos);

    // No more references: the command timer runs out.
    for _ in 0..3 {
        axis.set_torque(7);
        axis.step();
    }
    assert_eq!(axis.step(), (0, false));
}

// ── Torque Sensor Watchdog ──────────────────────────────────────────

#[test]
fn stale_torque_sensor_zeroes_output() {
    let mut axis = ready_axis_with_watchdogs(1000, 10);
    axis.set_control_mode(ControlCommand::Torque);
    axis.set_torque_reference(500);

    // Same sample every cycle: only the first one arms the watchdog.
    for _ in 0..10 {
        axis.set_torque(100);
        assert!(axis.step().0 > 0);
    }
    axis.set_torque(100);
    assert_eq!(axis.step(), (0, false));
}

#[test]
fn sample_from_before_torque_entry_is_stale() {
    let mut axis = ready_axis_with_watchdogs(1000, 10);
    axis.set_torque(100);
    for _ in 0..100_000 {
        axis.step();
    }

    axis.set_control_mode(ControlCommand::Torque);
    for _ in 0..10 {
        axis.set_torque_reference(500);
        assert_eq!(axis.step(), (0, false));
    }
}

#[test]
fn missing_torque_sensor_fails_immediately() {
    let mut axis = ready_axis_with_watchdogs(1000, 10);
    axis.set_control_mode(ControlCommand::Torque);
    axis.set_torque_reference(500);
    assert_eq!(axis.step(), (0, false));
}

#[test]
fn compliant_position_mode_skips_torque_watchdogs() {
    let mut axis = ready_axis_with_watchdogs(1, 1);
    axis.set_control_mode(ControlCommand::Position);
    axis.set_stiff(false);
    axis.set_impedance(1000, 0, 0);
    axis.set_encoder_position(-1000);
    for _ in 0..10 {
        let (out, stiff) = axis.step();
        assert!(!stiff);
        assert!(out > 0);
    }
}
