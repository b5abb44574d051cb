//! # JMC Control Unit Library
//!
//! Per-cycle control core of a joint motor control board. Every period the
//! host feeds encoder and torque samples into the axes, then runs one cycle
//! that evaluates each joint's control law and turns the joint commands into
//! clamped motor commands.
//!
//! ## Layers
//!
//! 1. **PidFilter**: discrete PID and low-passed torque PI (`control`)
//! 2. **AxisController**: per-joint mode state machine, watchdogs and
//!    control laws (`state`)
//! 3. **MotorCoupling**: joint-to-motor transform, fault masking and the
//!    cable envelope (`coupling`)
//! 4. **BoardController**: one cycle across all of the above (`board`)
//!
//! ## Allocation-Free Cycle
//!
//! Axes live in a fixed-capacity `heapless::Vec` and all per-cycle buffers
//! are fixed-size arrays. Allocation only happens while loading config.

pub mod board;
pub mod config;
pub mod control;
pub mod coupling;
pub mod state;
pub mod trajectory;
