//! Joint-to-motor coupling and the safety envelope around it.
//!
//! All axis steps of a cycle complete before [`MotorCoupling::compute_pwm`]
//! aggregates their commands.

pub mod cable;
pub mod motors;
pub mod topology;

pub use cable::cable_limit_alarm;
pub use motors::{MotorCoupling, PwmOutput};
pub use topology::JointToMotor;
