//! Integration test: closed-loop board cycles against a simulated plant.

use jmc_common::prelude::*;
use jmc_control_unit::board::BoardController;
use jmc_control_unit::config::load_config_from_str;
use jmc_control_unit::trajectory::RampTrajectory;

use super::{FREQ, board_toml};

fn build(topology: &str, joints: usize) -> BoardController<RampTrajectory> {
    let config = load_config_from_str(&board_toml(topology, joints)).unwrap();
    BoardController::from_config(&config, |_| RampTrajectory::new(FREQ)).unwrap()
}

/// Integrating plant: each cycle the joint moves by a tenth of its motor
/// command.
fn plant_step(position: i32, command: i16) -> i32 {
    position + i32::from(command) / 10
}

#[test]
fn position_move_converges() {
    let mut board = build("independent", 2);
    let axis = board.axis_mut(0).unwrap();
    assert!(axis.set_control_mode(ControlCommand::Position).is_ok());
    assert!(axis.set_position_reference(3000, 20_000));

    let mut position = 0;
    for _ in 0..3000 {
        board.axis_mut(0).unwrap().set_encoder_position(position);
        let out = board.cycle();
        position = plant_step(position, out.pwm.motors[0]);
    }
    assert!(board.axis(0).unwrap().get_motion_done());
    assert!((position - 3000).abs() < 10, "position = {position}");
    assert_eq!(board.cycles(), 3000);
}

#[test]
fn joints_are_independent() {
    let mut board = build("independent", 2);
    for (index, target) in [(0, 1500), (1, -2500)] {
        let axis = board.axis_mut(index).unwrap();
        axis.set_control_mode(ControlCommand::Position);
        axis.set_position_reference(target, 20_000);
    }

    let mut positions = [0i32; 2];
    for _ in 0..3000 {
        for (index, &pos) in positions.iter().enumerate() {
            board.axis_mut(index).unwrap().set_encoder_position(pos);
        }
        let out = board.cycle();
        for (pos, &cmd) in positions.iter_mut().zip(out.pwm.motors.iter()) {
            *pos = plant_step(*pos, cmd);
        }
    }
    assert!((positions[0] - 1500).abs() < 10);
    assert!((positions[1] + 2500).abs() < 10);
}

#[test]
fn hw_fault_takes_effect_in_same_cycle() {
    let mut board = build("waist_differential", 3);
    for axis in board.axes_mut() {
        axis.set_control_mode(ControlCommand::Position);
        axis.set_encoder_position(-100);
    }
    assert_ne!(board.cycle().pwm.motors[1], 0);

    board.axis_mut(2).unwrap().enter_hw_fault();
    let out = board.cycle();
    assert_eq!(out.pwm.stop_mask, MotorMask::first(3));
    assert_eq!(out.pwm.motors, [0; 4]);

    // Force-idle clears the fault on the next cycle.
    let axis = board.axis_mut(2).unwrap();
    assert!(axis.set_control_mode(ControlCommand::ForceIdle).is_ok());
    assert_eq!(axis.control_mode(), ControlMode::Idle);
    assert!(board.cycle().pwm.stop_mask.is_empty());
}

#[test]
fn torque_joint_reports_compliant() {
    let mut board = build("independent", 2);
    let axis = board.axis_mut(1).unwrap();
    axis.set_control_mode(ControlCommand::Torque);
    axis.set_torque_reference(1000);
    axis.set_torque(10);
    let out = board.cycle();
    assert_eq!(out.stiff[..2], [true, false]);
    assert!(out.pwm.motors[1] > 0);
}
