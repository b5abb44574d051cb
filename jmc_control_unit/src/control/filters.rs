//! First-order low-pass filter used after the torque PI law.
//!
//! Bilinear (Tustin) discretization with frequency prewarping, so the
//! cutoff of the discrete filter matches the analog one exactly:
//!
//! ```text
//! k = tan(π·fc·T)
//! b = k / (1 + k)
//! a = (1 − k) / (1 + k)
//! y[n] = b·(x[n-1] + x[n]) + a·y[n-1]
//! ```

use core::f64::consts::PI;

/// Coefficients of the first-order low pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassCoeffs {
    b: f64,
    a: f64,
}

impl LowPassCoeffs {
    /// Neutral coefficients; the filter output stays at zero.
    pub const ZERO: Self = Self { b: 0.0, a: 0.0 };

    /// Coefficients for cutoff `fc` [Hz] at sample period `dt` [s].
    ///
    /// Returns [`LowPassCoeffs::ZERO`] when either value is not positive
    /// or the cutoff is at or above Nyquist.
    pub fn tustin(fc: f64, dt: f64) -> Self {
        if fc <= 0.0 || dt <= 0.0 || fc * dt >= 0.5 {
            return Self::ZERO;
        }
        let k = (PI * fc * dt).tan();
        Self {
            b: k / (1.0 + k),
            a: (1.0 - k) / (1.0 + k),
        }
    }

    #[inline]
    pub const fn b(&self) -> f64 {
        self.b
    }

    #[inline]
    pub const fn a(&self) -> f64 {
        self.a
    }
}

/// Filter history: previous input and previous output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowPassState {
    x: f64,
    y: f64,
}

impl LowPassState {
    /// Reset filter state to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Previous output.
    #[inline]
    pub const fn output(&self) -> f64 {
        self.y
    }

    /// Apply one sample.
    #[inline]
    pub fn apply(&mut self, coeffs: &LowPassCoeffs, input: f64) -> f64 {
        self.y = coeffs.b * (self.x + input) + coeffs.a * self.y;
        self.x = input;
        self.y
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
