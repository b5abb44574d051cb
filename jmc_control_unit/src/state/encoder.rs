//! Joint position reconstruction from the three tendon-shoulder encoders.
//!
//! The reconstructed value is ambiguous by one alias period. Among the
//! reading and its two neighbours, the one inside the joint limits wins; if
//! none is inside, the one closest to the limits wins.

use jmc_common::control_unit::config::EncoderAliasConfig;

/// Reconstruct the joint position from encoders `[e0, e1, e2]`.
pub fn encoder_range_adjust(
    encoders: [i32; 3],
    pos_min: i32,
    pos_max: i32,
    alias: &EncoderAliasConfig,
) -> i32 {
    let [e0, e1, e2] = encoders.map(i64::from);
    let den = i64::from(alias.ratio_den);
    let coupled = if den == 0 {
        0
    } else {
        i64::from(alias.ratio_num) * e2 / den
    };
    let jp = e0 - e1 + coupled;
    let period = i64::from(alias.period);
    let (min, max) = (i64::from(pos_min), i64::from(pos_max));

    let violation = |p: i64| (min - p).max(p - max).max(0);

    let mut best = jp;
    let mut best_violation = i64::MAX;
    for candidate in [jp, jp + period, jp - period] {
        let v = violation(candidate);
        if v == 0 {
            return saturate(candidate);
        }
        if v < best_violation {
            best_violation = v;
            best = candidate;
        }
    }
    saturate(best)
}

#[inline]
fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
