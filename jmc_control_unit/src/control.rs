//! Control law building blocks.
//!
//! PID filter with filtered derivative and the low-passed torque PI law.

pub mod filters;
pub mod pid;
