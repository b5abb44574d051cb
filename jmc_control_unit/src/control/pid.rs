//! Discrete PID filter with trapezoidal integration and a filtered
//! derivative, plus the low-passed PI law used to close torque loops.
//!
//! ```text
//! A = Kd / (Kd + Kp·N·T)          B = (1 − A)·Kd / T
//! D[n] = A·D[n-1] + B·(e[n] − e[n-1])
//! I[n] = clamp(I[n-1] + Ki·T/2·(e[n] + e[n-1]), ±Imax)
//! u[n] = clamp(offset + trunc(Kp·e[n] + I[n] + D[n]), ±OutMax)
//! ```
//!
//! Zero Ki disables integral; zero Kd disables derivative. Gains and clamps
//! survive [`PidFilter::reset`], running state does not.

use jmc_common::consts::DERIVATIVE_FILTER_N;
use jmc_common::control_unit::control::{PidGains, TorqueCutoff};

use super::filters::{LowPassCoeffs, LowPassState};

/// One PID loop.
#[derive(Debug, Clone)]
pub struct PidFilter {
    /// Sample period [s].
    dt: f64,
    kp: f64,
    /// Integral gain pre-scaled by T/2.
    ki: f64,
    /// Derivative pole.
    a: f64,
    /// Derivative gain after filtering.
    b: f64,
    integral_limit: f64,
    output_limit: i32,
    offset: i32,

    derivative: f64,
    integral: f64,
    prev_error: f64,
    lowpass: LowPassState,
    /// Coefficients indexed by `TorqueCutoff`.
    lowpass_coeffs: [LowPassCoeffs; 2],

    last_output: i32,
    last_error: i32,
}

impl PidFilter {
    /// Create an unconfigured filter running at `frequency_hz`.
    ///
    /// All gains are zero, so `step` returns zero until [`PidFilter::configure`].
    pub fn new(frequency_hz: u32) -> Self {
        let dt = if frequency_hz == 0 {
            0.0
        } else {
            1.0 / f64::from(frequency_hz)
        };
        Self {
            dt,
            kp: 0.0,
            ki: 0.0,
            a: 0.0,
            b: 0.0,
            integral_limit: 0.0,
            output_limit: 0,
            offset: 0,
            derivative: 0.0,
            integral: 0.0,
            prev_error: 0.0,
            lowpass: LowPassState::default(),
            lowpass_coeffs: [
                LowPassCoeffs::tustin(TorqueCutoff::Slow.hz(), dt),
                LowPassCoeffs::tustin(TorqueCutoff::Fast.hz(), dt),
            ],
            last_output: 0,
            last_error: 0,
        }
    }

    /// Load gains and clamps, then reset running state.
    ///
    /// Non-finite gains load as zero. A NaN integral limit loads as zero and
    /// an infinite one as unbounded.
    pub fn configure(&mut self, gains: &PidGains) {
        let PidGains {
            kp,
            kd,
            ki,
            integral_limit,
            output_limit,
            offset,
        } = *gains;
        let [kp, kd, ki] = [kp, kd, ki].map(|g| if g.is_finite() { g } else { 0.0 });

        let denominator = kd + kp * DERIVATIVE_FILTER_N * self.dt;
        if denominator != 0.0 && self.dt > 0.0 {
            self.a = kd / denominator;
            self.b = (1.0 - self.a) * kd / self.dt;
        } else {
            self.a = 0.0;
            self.b = 0.0;
        }

        self.kp = kp;
        self.ki = 0.5 * ki * self.dt;
        self.integral_limit = if integral_limit.is_nan() {
            0.0
        } else {
            integral_limit.abs().min(f64::MAX)
        };
        self.output_limit = output_limit.saturating_abs();
        self.offset = offset;

        self.reset();
    }

    /// Standard PID step on `error`.
    pub fn step(&mut self, error: f64) -> i32 {
        self.derivative = self.a * self.derivative + self.b * (error - self.prev_error);
        self.integrate(error);

        let raw = self.kp * error + self.integral + self.derivative;
        self.finish(raw)
    }

    /// Low-passed PI law for torque tracking.
    ///
    /// `e = reference − measured`; the PI output `Kp·e + I` is smoothed by a
    /// first-order low pass at the selected cutoff before clamping.
    pub fn step_filtered_torque_pi(
        &mut self,
        reference: f64,
        measured: f64,
        cutoff: TorqueCutoff,
    ) -> i32 {
        let error = reference - measured;
        self.integrate(error);

        let pi = self.kp * error + self.integral;
        let coeffs = self.lowpass_coeffs[cutoff as usize];
        let filtered = self.lowpass.apply(&coeffs, pi);
        self.finish(filtered)
    }

    /// Zero integral, derivative, error history, filter history and last output.
    pub fn reset(&mut self) {
        self.derivative = 0.0;
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.lowpass.reset();
        self.last_output = 0;
        self.last_error = 0;
    }

    /// `(last_output, last_error)` for telemetry.
    #[inline]
    pub const fn status(&self) -> (i32, i32) {
        (self.last_output, self.last_error)
    }

    #[inline]
    pub const fn integral(&self) -> f64 {
        self.integral
    }

    #[inline]
    pub const fn output_limit(&self) -> i32 {
        self.output_limit
    }

    #[inline]
    fn integrate(&mut self, error: f64) {
        self.integral += self.ki * (error + self.prev_error);
        self.integral = self
            .integral
            .clamp(-self.integral_limit, self.integral_limit);
        self.prev_error = error;
        self.last_error = error as i32;
    }

    #[inline]
    fn finish(&mut self, raw: f64) -> i32 {
        // `as` saturates on overflow and maps NaN to 0.
        let out = i64::from(self.offset) + i64::from(raw as i32);
        let limit = i64::from(self.output_limit);
        self.last_output = out.clamp(-limit, limit) as i32;
        self.last_output
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
