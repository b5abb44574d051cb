//! Cable tension envelope of the tendon-driven shoulder.
//!
//! Joint positions are in degrees. Each constraint is a linear expression
//! scaled ×100 (×171 for the combined pulley terms) and compared against
//! [`CableLimits`] shrunk by the configured margin.

use jmc_common::consts::TICKS_PER_REVOLUTION;
use jmc_common::control_unit::config::CableLimits;

/// Returns true if any cable constraint is violated.
pub fn cable_limit_alarm(j0: i32, j1: i32, j2: i32, limits: &CableLimits) -> bool {
    let (j0, j1, j2) = (i64::from(j0), i64::from(j1), i64::from(j2));
    let margin = i64::from(limits.margin);
    let below = |value: i64, min: i32| value < i64::from(min) + margin;
    let above = |value: i64, max: i32| value > i64::from(max) - margin;

    let pulley = 171 * (j0 - j1);
    if below(pulley, limits.j0_minus_j1_min) {
        return true;
    }

    let pulley = pulley - 171 * j2;
    if below(pulley, limits.j0_minus_j1_j2_min) || above(pulley, limits.j0_minus_j1_j2_max) {
        return true;
    }

    let tendon = 100 * j1 + j2;
    if below(tendon, limits.j1_plus_j2_min) || above(tendon, limits.j1_plus_j2_max) {
        return true;
    }

    let ranges = [
        (100 * j0, limits.j0_min, limits.j0_max),
        (100 * j1, limits.j1_min, limits.j1_max),
        (100 * j2, limits.j2_min, limits.j2_max),
    ];
    ranges
        .iter()
        .any(|&(value, min, max)| below(value, min) || above(value, max))
}

/// Encoder ticks to whole degrees, truncated toward zero.
#[inline]
pub fn ticks_to_degrees(ticks: i32) -> i32 {
    (i64::from(ticks) * 360 / i64::from(TICKS_PER_REVOLUTION)) as i32
}
