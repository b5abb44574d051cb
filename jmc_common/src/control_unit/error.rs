//! Bitflag types for the joint controller.
//!
//! `Readiness` tracks which configuration steps an axis is still missing.
//! `MotorMask` addresses motors in idle and stop masks.

use bitflags::bitflags;

use crate::consts::MAX_MOTORS;

bitflags! {
    /// Missing configuration items of one axis.
    ///
    /// An axis accepts motion commands only once every flag is cleared.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Readiness: u8 {
        /// Position PID gains not set.
        const NO_POS_PID     = 0x01;
        /// Torque PID gains not set.
        const NO_TRQ_PID     = 0x02;
        /// Lower position limit not set.
        const NO_MIN_LIMIT   = 0x04;
        /// Upper position limit not set.
        const NO_MAX_LIMIT   = 0x08;
        /// Velocity limit not set.
        const NO_VEL_LIMIT   = 0x10;
        /// Velocity command timeout not set.
        const NO_VEL_TIMEOUT = 0x20;
        /// Encoder zero not established.
        const NOT_CALIBRATED = 0x40;
    }
}

impl Readiness {
    /// State of a freshly created axis.
    pub const NOT_READY: Self = Self::all();

    /// No configuration item missing.
    #[inline]
    pub const fn is_ready(&self) -> bool {
        self.is_empty()
    }

    #[inline]
    pub const fn is_calibrated(&self) -> bool {
        !self.contains(Self::NOT_CALIBRATED)
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::NOT_READY
    }
}

bitflags! {
    /// One bit per motor of a board.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MotorMask: u8 {
        const MOTOR_0 = 0x01;
        const MOTOR_1 = 0x02;
        const MOTOR_2 = 0x04;
        const MOTOR_3 = 0x08;
    }
}

impl MotorMask {
    /// Bit of motor `index`; empty when `index >= MAX_MOTORS`.
    #[inline]
    pub const fn motor(index: usize) -> Self {
        if index >= MAX_MOTORS {
            return Self::empty();
        }
        Self::from_bits_truncate(1 << index)
    }

    /// Bits of the first `count` motors.
    #[inline]
    pub const fn first(count: usize) -> Self {
        if count >= MAX_MOTORS {
            return Self::all();
        }
        Self::from_bits_truncate(((1u16 << count) - 1) as u8)
    }

    #[inline]
    pub const fn has_motor(&self, index: usize) -> bool {
        self.intersects(Self::motor(index))
    }
}

impl Default for MotorMask {
    fn default() -> Self {
        Self::empty()
    }
}
