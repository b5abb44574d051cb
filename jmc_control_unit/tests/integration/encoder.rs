//! Integration test: shoulder encoder reconstruction with board settings.

use jmc_control_unit::board::BoardController;
use jmc_control_unit::config::load_config_from_str;
use jmc_control_unit::trajectory::RampTrajectory;

use super::board_toml;

fn board_with_limits(pos_min: i32, pos_max: i32, encoder: &str) -> BoardController<RampTrajectory> {
    let toml = board_toml("independent", 1)
        .replace("pos_min = -30000", &format!("pos_min = {pos_min}"))
        .replace("pos_max = 30000", &format!("pos_max = {pos_max}"))
        + encoder;
    let config = load_config_from_str(&toml).unwrap();
    BoardController::from_config(&config, |_| RampTrajectory::new(1000)).unwrap()
}

#[test]
fn in_range_reading_passes_through() {
    let board = board_with_limits(0, 4000, "");
    let axis = board.axis(0).unwrap();
    // 3000 − 1000 + 40·(−650)/65 = 1600
    assert_eq!(axis.encoder_range_adjust([3000, 1000, -650]), 1600);
}

#[test]
fn aliased_reading_is_unwrapped() {
    let board = board_with_limits(0, 4000, "");
    let axis = board.axis(0).unwrap();
    assert_eq!(axis.encoder_range_adjust([-39_000, 0, 0]), 1330);
    assert_eq!(axis.encoder_range_adjust([42_000, 0, 0]), 1670);
}

#[test]
fn negative_limits_pick_closest_alias() {
    let board = board_with_limits(-4000, -1000, "");
    let axis = board.axis(0).unwrap();
    // −500 misses by 500; −40830 and 39830 miss by far more.
    assert_eq!(axis.encoder_range_adjust([-500, 0, 0]), -500);
    assert_eq!(axis.encoder_range_adjust([38_000, 0, 0]), -2330);
}

#[test]
fn alias_settings_come_from_config() {
    let encoder = "\n[encoder]\nratio_num = 1\nratio_den = 2\nperiod = 1000\n";
    let board = board_with_limits(0, 400, encoder);
    let axis = board.axis(0).unwrap();
    // 1200 − 0 + 1·200/2 = 1300, minus one period = 300
    assert_eq!(axis.encoder_range_adjust([1200, 0, 200]), 300);
}
