//! Integration test: joint commands through the coupling stage of a board.

use jmc_common::control_unit::error::MotorMask;
use jmc_common::control_unit::state::ControlCommand;
use jmc_control_unit::board::BoardController;
use jmc_control_unit::config::load_config_from_str;
use jmc_control_unit::trajectory::RampTrajectory;

use super::board_toml;

fn build(toml: &str) -> BoardController<RampTrajectory> {
    let config = load_config_from_str(toml).unwrap();
    BoardController::from_config(&config, |_| RampTrajectory::new(1000)).unwrap()
}

/// Put every joint in Position mode holding 0 while measuring `positions`,
/// so each joint command equals `-position`.
fn hold_at_zero(board: &mut BoardController<RampTrajectory>, positions: &[i32]) {
    for (axis, &pos) in board.axes_mut().iter_mut().zip(positions) {
        assert!(axis.set_control_mode(ControlCommand::Position).is_ok());
        axis.set_encoder_position(pos);
    }
}

#[test]
fn shoulder_stiff_joints_use_inverse_jacobian() {
    let mut board = build(&board_toml("shoulder_tendon", 4));
    hold_at_zero(&mut board, &[-400, -80, -40, -77]);
    let out = board.cycle();
    assert_eq!(out.joints[..4], [400, 80, 40, 77]);
    assert_eq!(out.pwm.motors, [400, -520, -455, 77]);
    assert!(out.pwm.stop_mask.is_empty());
}

#[test]
fn shoulder_fault_stops_whole_group_but_not_elbow() {
    let mut board = build(&board_toml("shoulder_tendon", 4));
    hold_at_zero(&mut board, &[-400, -80, -40, -77]);
    board.set_motor_fault(1, true);
    let out = board.cycle();
    assert_eq!(out.pwm.motors, [0, 0, 0, 77]);
    assert_eq!(out.pwm.stop_mask, MotorMask::first(3));
}

#[test]
fn waist_differential_through_board() {
    let mut board = build(&board_toml("waist_differential", 3));
    hold_at_zero(&mut board, &[-300, -100, -50]);
    let out = board.cycle();
    assert_eq!(out.pwm.motors[..3], [100, 200, 50]);
}

#[test]
fn outputs_clamped_to_nominal_current() {
    let mut board = build(&board_toml("independent", 2));
    hold_at_zero(&mut board, &[-9000, 9000]);
    let out = board.cycle();
    assert_eq!(out.joints[..2], [9000, -9000]);
    assert_eq!(out.pwm.motors[..2], [5000, -5000]);
}

#[test]
fn matrix_topology_from_config() {
    let toml = board_toml("independent", 2).replace(
        "topology = { kind = \"independent\" }",
        "topology = { kind = \"matrix\", rows = [[1.0, 1.0, 0.0, 0.0], [0.0, -1.0, 0.0, 0.0]] }",
    );
    let mut board = build(&toml);
    assert_eq!(
        board.coupling().coupled_group(),
        MotorMask::MOTOR_0 | MotorMask::MOTOR_1
    );
    hold_at_zero(&mut board, &[-100, -30]);
    let out = board.cycle();
    assert_eq!(out.pwm.motors[..2], [130, -30]);

    board.set_motor_fault(0, true);
    let out = board.cycle();
    assert_eq!(out.pwm.motors[..2], [0, 0]);
}

#[test]
fn zero_rotation_torque_added_per_motor() {
    let mut board = build(&board_toml("independent", 2));
    board.coupling_mut().set_zero_rotation_torque(1, 25);
    let out = board.cycle();
    assert_eq!(out.pwm.motors[..2], [0, 25]);
}
