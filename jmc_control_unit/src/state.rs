//! Per-axis state: mode transitions, control laws and encoder handling.

pub mod axis;
pub mod encoder;
pub mod mode;

pub use axis::{AxisController, AxisSettings};
pub use mode::ModeTransition;
