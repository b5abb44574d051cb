//! System-wide constants for the JMC workspace.
//!
//! Single source of truth for hardware limits and control-loop defaults.
//! Board-specific mechanism numbers (gear ratios, encoder periods, filter
//! cutoffs) have defaults here and are overridable through `BoardConfig`.

use static_assertions::const_assert;

/// Maximum number of motors a single board can drive.
pub const MAX_MOTORS: usize = 4;

/// Maximum number of joints a single board can control.
pub const MAX_JOINTS: usize = 4;

/// Default control loop frequency [Hz].
pub const CONTROL_FREQUENCY_HZ: u32 = 1000;

/// Lowest accepted control loop frequency [Hz].
pub const CONTROL_FREQUENCY_HZ_MIN: u32 = 100;

/// Highest accepted control loop frequency [Hz].
pub const CONTROL_FREQUENCY_HZ_MAX: u32 = 10_000;

/// Encoder ticks per joint revolution.
pub const TICKS_PER_REVOLUTION: i32 = 65_536;

/// Encoder ticks per half joint revolution.
pub const TICKS_PER_HALF_REVOLUTION: i32 = TICKS_PER_REVOLUTION / 2;

/// Deceleration used whenever a mode change parks the trajectory [ticks/s²].
pub const CHANGE_MODE_STOP_ACC: i32 = TICKS_PER_REVOLUTION;

/// Bandwidth constant N of the filtered derivative pole.
pub const DERIVATIVE_FILTER_N: f64 = 10.0;

/// Default nominal motor current clamp [PWM counts].
pub const NOMINAL_CURRENT: i16 = 10_000;

/// Default velocity command timeout [cycles].
pub const VELOCITY_CMD_TIMEOUT: u32 = 100;

/// Default torque command timeout [cycles].
pub const TORQUE_CMD_TIMEOUT: u32 = 100;

/// Default torque sensor staleness timeout [cycles].
pub const TORQUE_SENSOR_TIMEOUT: u32 = 100;

/// Pulley ratio numerator of the tendon-driven shoulder (65/40).
pub const SHOULDER_RATIO_NUM: i32 = 65;

/// Pulley ratio denominator of the tendon-driven shoulder (65/40).
pub const SHOULDER_RATIO_DEN: i32 = 40;

/// Encoder alias period of the shoulder joint: 40·65536/65, rounded [ticks].
pub const ENCODER_ALIAS_PERIOD: i32 = 40_330;

/// Cable tension warning margin (×100 joint units) for the tendon envelope.
pub const CABLE_WARNING_MARGIN: i32 = 2000;

// Stop mask is a u8.
const_assert!(MAX_MOTORS <= 8);
const_assert!(MAX_JOINTS <= MAX_MOTORS);
