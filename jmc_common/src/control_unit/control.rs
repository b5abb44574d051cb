//! Control parameter types.
//!
//! Defines `PidGains`, `TorqueCutoff` and `ImpedanceParams`, the values a
//! host or a board TOML hands to the joint controller.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

/// PID gains and limits of one loop.
///
/// Integer units: errors in encoder ticks
/// (or torque sensor counts), outputs in PWM counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    #[serde(default)]
    pub kp: f64,
    /// Derivative gain (0 = disabled).
    #[serde(default)]
    pub kd: f64,
    /// Integral gain (0 = disabled).
    #[serde(default)]
    pub ki: f64,
    /// Integral accumulator clamp, symmetric.
    #[serde(default)]
    pub integral_limit: f64,
    /// Output clamp, symmetric.
    #[serde(default = "default_output_limit")]
    pub output_limit: i32,
    /// Constant added to the output before clamping.
    #[serde(default)]
    pub offset: i32,
}

fn default_output_limit() -> i32 {
    i16::MAX as i32
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.0,
            kd: 0.0,
            ki: 0.0,
            integral_limit: 0.0,
            output_limit: default_output_limit(),
            offset: 0,
        }
    }
}

impl PidGains {
    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("kp", self.kp), ("kd", self.kd), ("ki", self.ki)] {
            if !value.is_finite() {
                return Err(format!("{name} must be finite"));
            }
        }
        if !self.integral_limit.is_finite() || self.integral_limit < 0.0 {
            return Err(format!(
                "integral_limit {} must be finite and >= 0",
                self.integral_limit
            ));
        }
        if self.output_limit < 0 {
            return Err(format!("output_limit {} must be >= 0", self.output_limit));
        }
        Ok(())
    }
}

// ─── Torque Low-Pass ────────────────────────────────────────────────

/// Cutoff of the low pass applied after the torque PI law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TorqueCutoff {
    /// 1.1 Hz.
    #[default]
    Slow,
    /// 3.0 Hz.
    Fast,
}

impl TorqueCutoff {
    /// Cutoff frequency [Hz].
    #[inline]
    pub const fn hz(&self) -> f64 {
        match self {
            Self::Slow => 1.1,
            Self::Fast => 3.0,
        }
    }
}

// ─── Impedance ──────────────────────────────────────────────────────

/// Virtual spring-damper used by the compliant laws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpedanceParams {
    /// Stiffness [torque counts per 1000 ticks].
    #[serde(default)]
    pub stiffness: i32,
    /// Damping [torque counts per tick/ms].
    #[serde(default)]
    pub damping: i32,
    /// Constant torque bias.
    #[serde(default)]
    pub offset: i32,
}

const_assert!(core::mem::size_of::<ImpedanceParams>() == 12);
