//! Trajectory generator interface and a trapezoidal ramp implementation.
//!
//! The axis controller never shapes motion itself: it feeds references to a
//! [`TrajectoryGenerator`] and tracks the `(pos, vel, acc)` triple it returns
//! once per cycle.

use jmc_common::consts::TICKS_PER_REVOLUTION;

/// Reference produced by one trajectory step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrajectoryRef {
    /// Position reference [ticks].
    pub pos: f64,
    /// Velocity reference [ticks/s].
    pub vel: f64,
    /// Acceleration reference [ticks/s²].
    pub acc: f64,
}

/// Motion profile source driven by an axis controller.
pub trait TrajectoryGenerator {
    /// Reset the state to `(pos, vel, acc)` with no motion pending.
    fn init(&mut self, pos: i32, vel: i32, acc: i32);
    /// Move from `current` to `target` at average speed `avg_vel`.
    fn set_position_reference(&mut self, current: i32, target: i32, avg_vel: i32);
    /// Reach velocity `vel` with average acceleration `avg_acc`.
    fn set_velocity_reference(&mut self, vel: i32, avg_acc: i32);
    /// Jump to `pos` without shaping.
    fn set_raw_position(&mut self, pos: i32);
    /// Advance one cycle.
    fn step(&mut self) -> TrajectoryRef;
    /// Decelerate to rest from `current` at `decel`.
    fn stop(&mut self, current: i32, decel: i32);
    /// Bring the velocity reference to zero, keeping the position.
    fn velocity_stop(&mut self);
    /// No motion pending.
    fn is_done(&self) -> bool;
    fn set_pos_min(&mut self, pos_min: i32);
    fn set_pos_max(&mut self, pos_max: i32);
    fn set_vel_max(&mut self, vel_max: i32);
    /// Last position reference.
    fn position(&self) -> f64;
    /// Last velocity reference.
    fn velocity(&self) -> f64;
}

// ─── Ramp Trajectory ────────────────────────────────────────────────

/// Default acceleration limit [ticks/s²].
pub const RAMP_DEFAULT_ACC: f64 = 4.0 * TICKS_PER_REVOLUTION as f64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum RampMode {
    Hold,
    Position { target: f64, speed: f64 },
    Velocity { target: f64, acc: f64 },
}

/// Trapezoidal-velocity generator with position and velocity limits.
#[derive(Debug, Clone)]
pub struct RampTrajectory {
    dt: f64,
    pos: f64,
    vel: f64,
    acc: f64,
    acc_max: f64,
    pos_min: f64,
    pos_max: f64,
    vel_max: f64,
    mode: RampMode,
}

impl RampTrajectory {
    pub fn new(frequency_hz: u32) -> Self {
        let dt = if frequency_hz == 0 {
            0.0
        } else {
            1.0 / f64::from(frequency_hz)
        };
        Self {
            dt,
            pos: 0.0,
            vel: 0.0,
            acc: 0.0,
            acc_max: RAMP_DEFAULT_ACC,
            pos_min: f64::from(i32::MIN),
            pos_max: f64::from(i32::MAX),
            vel_max: f64::MAX,
            mode: RampMode::Hold,
        }
    }

    /// Override the acceleration used for position moves and velocity stops.
    pub fn with_acc_max(mut self, acc_max: f64) -> Self {
        if acc_max > 0.0 {
            self.acc_max = acc_max;
        }
        self
    }

    #[inline]
    fn clamp_pos(&self, pos: f64) -> f64 {
        if self.pos_min <= self.pos_max {
            pos.clamp(self.pos_min, self.pos_max)
        } else {
            pos
        }
    }

    fn step_position(&mut self, target: f64, speed: f64) {
        let dist = target - self.pos;
        if dist.abs() < 0.5 && self.vel.abs() <= self.acc_max * self.dt {
            self.finish_at(target);
            return;
        }

        let braking = (2.0 * self.acc_max * dist.abs()).sqrt();
        let desired = dist.signum() * speed.min(braking);
        self.ramp_velocity(desired, self.acc_max);
        self.pos += self.vel * self.dt;

        // Crossing the target ends the move.
        if (target - self.pos).signum() != dist.signum() {
            self.finish_at(target);
        }
    }

    fn step_velocity(&mut self, target: f64, acc: f64) {
        self.ramp_velocity(target, acc);
        let next = self.pos + self.vel * self.dt;
        let limited = self.clamp_pos(next);
        if limited != next {
            self.vel = 0.0;
            self.acc = 0.0;
        }
        self.pos = limited;
        if target == 0.0 && self.vel == 0.0 {
            self.mode = RampMode::Hold;
        }
    }

    #[inline]
    fn ramp_velocity(&mut self, desired: f64, acc: f64) {
        let dv_max = acc * self.dt;
        let dv = (desired - self.vel).clamp(-dv_max, dv_max);
        self.vel += dv;
        self.acc = if self.dt > 0.0 { dv / self.dt } else { 0.0 };
    }

    #[inline]
    fn finish_at(&mut self, pos: f64) {
        self.pos = pos;
        self.vel = 0.0;
        self.acc = 0.0;
        self.mode = RampMode::Hold;
    }
}

impl TrajectoryGenerator for RampTrajectory {
    fn init(&mut self, pos: i32, vel: i32, acc: i32) {
        self.pos = f64::from(pos);
        self.vel = f64::from(vel);
        self.acc = f64::from(acc);
        self.mode = RampMode::Hold;
    }

    fn set_position_reference(&mut self, current: i32, target: i32, avg_vel: i32) {
        if self.is_done() {
            self.pos = f64::from(current);
            self.vel = 0.0;
        }
        let speed = match f64::from(avg_vel).abs() {
            s if s > 0.0 => s.min(self.vel_max),
            _ => self.vel_max.min(f64::from(i32::MAX)),
        };
        self.mode = RampMode::Position {
            target: self.clamp_pos(f64::from(target)),
            speed,
        };
    }

    fn set_velocity_reference(&mut self, vel: i32, avg_acc: i32) {
        let target = f64::from(vel).clamp(-self.vel_max, self.vel_max);
        let acc = match f64::from(avg_acc).abs() {
            a if a > 0.0 => a,
            _ => self.acc_max,
        };
        self.mode = RampMode::Velocity { target, acc };
    }

    fn set_raw_position(&mut self, pos: i32) {
        let pos = self.clamp_pos(f64::from(pos));
        self.finish_at(pos);
    }

    fn step(&mut self) -> TrajectoryRef {
        match self.mode {
            RampMode::Hold => {
                self.vel = 0.0;
                self.acc = 0.0;
            }
            RampMode::Position { target, speed } => self.step_position(target, speed),
            RampMode::Velocity { target, acc } => self.step_velocity(target, acc),
        }
        TrajectoryRef {
            pos: self.pos,
            vel: self.vel,
            acc: self.acc,
        }
    }

    fn stop(&mut self, current: i32, decel: i32) {
        self.pos = f64::from(current);
        let acc = match f64::from(decel).abs() {
            a if a > 0.0 => a,
            _ => self.acc_max,
        };
        if self.vel == 0.0 {
            self.finish_at(self.pos);
        } else {
            self.mode = RampMode::Velocity { target: 0.0, acc };
        }
    }

    fn velocity_stop(&mut self) {
        match self.mode {
            RampMode::Velocity { acc, .. } => {
                self.mode = RampMode::Velocity { target: 0.0, acc };
            }
            RampMode::Position { .. } | RampMode::Hold => {}
        }
    }

    fn is_done(&self) -> bool {
        self.mode == RampMode::Hold
    }

    fn set_pos_min(&mut self, pos_min: i32) {
        self.pos_min = f64::from(pos_min);
    }

    fn set_pos_max(&mut self, pos_max: i32) {
        self.pos_max = f64::from(pos_max);
    }

    fn set_vel_max(&mut self, vel_max: i32) {
        if vel_max > 0 {
            self.vel_max = f64::from(vel_max);
        }
    }

    fn position(&self) -> f64 {
        self.pos
    }

    fn velocity(&self) -> f64 {
        self.vel
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
