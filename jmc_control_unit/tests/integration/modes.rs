//! Integration test: control mode lifecycle of a single axis.

use jmc_common::control_unit::control::PidGains;
use jmc_common::control_unit::error::Readiness;
use jmc_common::control_unit::state::{ControlCommand, ControlMode, ControlProfile};
use jmc_control_unit::state::{AxisController, AxisSettings, ModeTransition};
use jmc_control_unit::trajectory::RampTrajectory;

use super::{configured_axis, ready_axis};

#[test]
fn unconfigured_axis_rejects_then_accepts_after_setup() {
    let mut axis = AxisController::new(2, RampTrajectory::new(1000), AxisSettings::default());
    assert!(!axis.set_control_mode(ControlCommand::Torque).is_ok());
    assert_eq!(axis.control_mode(), ControlMode::NotConfigured);
    assert_eq!(axis.step(), (0, true));

    axis.set_limits(-100, 100, 1000);
    axis.set_vel_timeout(10);
    axis.set_position_pid(&super::p_gains(1.0));
    assert_eq!(axis.readiness(), Readiness::NO_TRQ_PID | Readiness::NOT_CALIBRATED);
    axis.set_torque_pid(&super::p_gains(1.0));
    axis.set_calibrated();
    assert!(axis.is_ready());
    assert_eq!(
        axis.set_control_mode(ControlCommand::Torque),
        ModeTransition::Ok(ControlMode::Torque)
    );
}

#[test]
fn every_servo_mode_reachable_from_idle() {
    let targets = [
        (ControlCommand::Position, ControlMode::Position),
        (ControlCommand::Velocity, ControlMode::Velocity),
        (ControlCommand::Direct, ControlMode::Direct),
        (ControlCommand::Mixed, ControlMode::Mixed),
        (ControlCommand::Torque, ControlMode::Torque),
        (ControlCommand::ImpedancePos, ControlMode::ImpedancePos),
        (ControlCommand::ImpedanceVel, ControlMode::ImpedanceVel),
    ];
    for (command, mode) in targets {
        let mut axis = ready_axis();
        assert_eq!(axis.set_control_mode(command), ModeTransition::Ok(mode));
        assert_eq!(axis.control_mode(), mode);
        assert_eq!(
            axis.set_control_mode(ControlCommand::SwitchEverythingOff),
            ModeTransition::Ok(ControlMode::Idle)
        );
    }
}

/// Ready axis whose loops both carry an integral term.
fn integrating_axis() -> AxisController<RampTrajectory> {
    let gains = PidGains {
        ki: 1000.0,
        integral_limit: 1.0e6,
        ..super::p_gains(1.0)
    };
    let mut axis = ready_axis();
    axis.set_position_pid(&gains);
    axis.set_torque_pid(&gains);
    axis
}

fn first_position_step(axis: &mut AxisController<RampTrajectory>) -> (i32, bool) {
    axis.set_encoder_position(0);
    assert!(axis.set_control_mode(ControlCommand::Position).is_ok());
    axis.set_encoder_position(-300);
    axis.step()
}

fn first_torque_step(axis: &mut AxisController<RampTrajectory>) -> (i32, bool) {
    assert!(axis.set_control_mode(ControlCommand::Torque).is_ok());
    assert!(axis.set_torque_reference(500));
    axis.set_torque(100);
    axis.step()
}

#[test]
fn hw_fault_escapable_only_by_force_idle() {
    let mut axis = integrating_axis();
    axis.set_control_mode(ControlCommand::Position);
    axis.set_encoder_position(-300);
    for _ in 0..5 {
        axis.step();
    }
    axis.set_control_mode(ControlCommand::Torque);
    for cycle in 0..5 {
        axis.set_torque_reference(500);
        axis.set_torque(100 + cycle % 2);
        axis.step();
    }
    assert_ne!(axis.position_pid().integral(), 0.0);
    assert_ne!(axis.torque_pid().integral(), 0.0);

    axis.enter_hw_fault();
    for command in [
        ControlCommand::Idle,
        ControlCommand::SwitchEverythingOff,
        ControlCommand::Position,
        ControlCommand::Torque,
    ] {
        assert!(!axis.set_control_mode(command).is_ok());
        assert_eq!(axis.control_mode(), ControlMode::HwFault);
    }
    assert_eq!(axis.step(), (0, true));
    assert_ne!(axis.position_pid().integral(), 0.0);
    assert_ne!(axis.torque_pid().integral(), 0.0);

    assert_eq!(
        axis.set_control_mode(ControlCommand::ForceIdle),
        ModeTransition::Ok(ControlMode::Idle)
    );
    for pid in [axis.position_pid(), axis.torque_pid()] {
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.status(), (0, 0));
    }

    // Both loops restart exactly like a fresh axis.
    let mut fresh = integrating_axis();
    assert_eq!(first_position_step(&mut axis), first_position_step(&mut fresh));
    let mut fresh = integrating_axis();
    assert_eq!(first_torque_step(&mut axis), first_torque_step(&mut fresh));
}

#[test]
fn force_idle_parks_trajectory_at_measured_position() {
    let mut axis = ready_axis();
    axis.set_control_mode(ControlCommand::Position);
    axis.set_position_reference(5000, 10_000);
    for _ in 0..20 {
        axis.step();
    }
    axis.set_encoder_position(1234);
    axis.set_control_mode(ControlCommand::ForceIdle);
    axis.step();
    assert_eq!(axis.get_joint_status().position, 1234);

    // Re-entering Position holds where the joint is: no jump.
    axis.set_control_mode(ControlCommand::Position);
    assert_eq!(axis.step(), (0, true));
}

#[test]
fn calibration_bypasses_readiness() {
    let mut axis = configured_axis(AxisSettings::default());
    assert!(!axis.is_calibrated());
    axis.start_calibration();
    assert_eq!(axis.control_mode(), ControlMode::Calib);

    assert!(!axis.set_control_mode(ControlCommand::Position).is_ok());
    assert_eq!(axis.control_mode(), ControlMode::Calib);
    assert_eq!(axis.step(), (0, true));

    axis.set_calibrated();
    axis.step();
    assert_eq!(axis.control_mode(), ControlMode::Position);
    assert!(axis.get_motion_done());
}

#[test]
fn calibration_abort_to_idle() {
    let mut axis = configured_axis(AxisSettings::default());
    axis.start_calibration();
    assert_eq!(
        axis.set_control_mode(ControlCommand::Idle),
        ModeTransition::Ok(ControlMode::Idle)
    );
}

#[test]
fn current_mode_never_accepted() {
    let settings = AxisSettings {
        profile: ControlProfile::Legacy,
        ..AxisSettings::default()
    };
    let mut axis = configured_axis(settings);
    axis.set_calibrated();
    axis.set_control_mode(ControlCommand::Position);
    assert!(!axis.set_control_mode(ControlCommand::Current).is_ok());
    assert_eq!(axis.control_mode(), ControlMode::Position);
}

#[test]
fn position_move_tracks_trajectory() {
    let mut axis = ready_axis();
    axis.set_control_mode(ControlCommand::Position);
    assert!(axis.set_position_reference(2000, 20_000));
    assert!(!axis.get_motion_done());

    // Perfect plant: the joint follows the previous reference.
    let mut reference = 0;
    for _ in 0..2000 {
        axis.set_encoder_position(reference);
        axis.step();
        reference = axis.get_active_pid_status().reference;
        if axis.get_motion_done() {
            break;
        }
    }
    assert!(axis.get_motion_done());
    assert_eq!(reference, 2000);
}

#[test]
fn switching_to_compliant_and_back() {
    let mut axis = ready_axis();
    axis.set_control_mode(ControlCommand::Position);
    axis.set_impedance(1000, 0, 0);
    axis.set_stiff(false);
    axis.set_encoder_position(-500);
    let (_, stiff) = axis.step();
    assert!(!stiff);
    assert_eq!(axis.torque_reference(), 500);

    axis.set_stiff(true);
    assert!(axis.is_stiff());
    assert_eq!(axis.torque_reference(), 0);
    assert!(axis.step().1);
}
