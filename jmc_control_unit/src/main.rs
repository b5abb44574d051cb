//! # JMC Control Unit (dry run)
//!
//! Loads a board configuration, builds the board with a ramp trajectory per
//! joint and runs the control cycle against a simulated first-order plant.
//! Every joint is commanded to a position move; telemetry is logged at a
//! fixed cycle interval.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use jmc_common::config::{ConfigLoader, LogLevel};
use jmc_common::consts::MAX_JOINTS;
use jmc_common::control_unit::config::BoardConfig;
use jmc_common::control_unit::state::ControlCommand;
use jmc_control_unit::board::BoardController;
use jmc_control_unit::config::load_config;
use jmc_control_unit::trajectory::RampTrajectory;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JMC Control Unit: offline cycle runner
#[derive(Parser, Debug)]
#[command(name = "jmc_control_unit")]
#[command(version)]
#[command(about = "Run the joint motor control cycle against a simulated plant")]
struct Args {
    /// Path to the board configuration TOML.
    #[arg(default_value = "config/board.toml")]
    config: PathBuf,

    /// Number of control cycles to run.
    #[arg(long, default_value_t = 2000)]
    cycles: u64,

    /// Log telemetry every N cycles.
    #[arg(long, default_value_t = 250)]
    report_every: u64,

    /// Plant gain: joint ticks moved per cycle per 1000 PWM counts.
    #[arg(long, default_value_t = 100)]
    plant_gain: i32,

    /// Enable verbose logging (DEBUG level, overrides the config's log_level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    // Full validation happens in `run`; here only the log level matters.
    let log_level = BoardConfig::load(&args.config)
        .map(|config| config.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("JMC Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("JMC Control Unit dry run complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let frequency = config.control.frequency_hz;
    let mut board = BoardController::from_config(&config, |_| RampTrajectory::new(frequency))?;

    // Start every joint at mid-range and move it a quarter of the range.
    let mut positions = [0i32; MAX_JOINTS];
    for (index, (axis, joint)) in board.axes_mut().iter_mut().zip(&config.joints).enumerate() {
        let mid = joint.pos_min + (joint.pos_max - joint.pos_min) / 2;
        let target = mid + (joint.pos_max - joint.pos_min) / 4;
        positions[index] = mid;
        axis.set_encoder_position(mid);

        let transition = axis.set_control_mode(ControlCommand::Position);
        if !transition.is_ok() {
            warn!(joint = %joint.name, ?transition, "Joint stays out of position mode");
            continue;
        }
        if !axis.set_position_reference(target, joint.vel_max / 2) {
            warn!(joint = %joint.name, target, "Position reference rejected");
        }
    }

    let joints = board.axes().len();
    for cycle in 0..args.cycles {
        for (axis, &pos) in board.axes_mut().iter_mut().zip(&positions) {
            axis.set_encoder_position(pos);
        }
        let out = board.cycle();

        // Plant: each joint integrates its own command.
        for (pos, &command) in positions.iter_mut().zip(&out.joints).take(joints) {
            *pos += command.saturating_mul(args.plant_gain) / 1000;
        }

        if args.report_every > 0 && cycle % args.report_every == 0 {
            for axis in board.axes() {
                let status = axis.get_joint_status();
                let pid = axis.get_active_pid_status();
                info!(
                    cycle,
                    axis = axis.index(),
                    mode = ?status.mode,
                    position = status.position,
                    reference = pid.reference,
                    error = pid.error,
                    output = pid.output,
                    done = axis.get_motion_done(),
                    "Telemetry"
                );
            }
            info!(
                cycle,
                motors = ?out.pwm.motors,
                stop_mask = out.pwm.stop_mask.bits(),
                cable_alarm = out.cable_alarm,
                "Motor output"
            );
        }
    }

    let done = board.axes().iter().filter(|a| a.get_motion_done()).count();
    info!(
        cycles = board.cycles(),
        joints,
        done,
        "Dry run finished"
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
///
/// `RUST_LOG` takes precedence over both.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let directive = default_directive(args.verbose, log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

/// Filter directive used when `RUST_LOG` is unset.
fn default_directive(verbose: bool, log_level: LogLevel) -> &'static str {
    if verbose {
        LogLevel::Debug.as_directive()
    } else {
        log_level.as_directive()
    }
}
