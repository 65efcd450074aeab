//! ChakraIO - simulated swerve robot running the real drive core
//!
//! Usage:
//!   chakra-io --config chakra.toml --alliance blue --location 2 --mode orbit
//!   RUST_LOG=debug chakra-io --ticks 500 --mode speaker

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use chakra_drive::field::{Alliance, LineUpTarget};
use chakra_drive::hal::DriverInput;
use chakra_io::{AppConfig, Error, Result, SimRobot, zero_heading_after};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AllianceArg {
    Red,
    Blue,
}

/// Command to run after boot
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Idle,
    Orbit,
    Center,
    Amp,
    Speaker,
}

/// Simulated swerve robot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (defaults are used if it does not exist)
    #[arg(short, long, default_value = "chakra.toml")]
    config: PathBuf,

    /// Ticks to run (0 = until Ctrl-C)
    #[arg(long, default_value = "0")]
    ticks: u64,

    /// Alliance override
    #[arg(long, value_enum)]
    alliance: Option<AllianceArg>,

    /// Starting location override (1-3)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    location: Option<u8>,

    /// Noise seed override (0 = entropy)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "idle")]
    mode: Mode,

    /// Run as fast as possible instead of in real time
    #[arg(long)]
    fast: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = if args.config.exists() {
        AppConfig::from_file(&args.config)?
    } else {
        AppConfig::default()
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    log::info!("ChakraIO v{} starting...", env!("CARGO_PKG_VERSION"));
    if !args.config.exists() {
        log::info!("Config {} not found, using defaults", args.config.display());
    }

    if let Some(alliance) = args.alliance {
        config.sim.alliance = Some(match alliance {
            AllianceArg::Red => Alliance::Red,
            AllianceArg::Blue => Alliance::Blue,
        });
    }
    if args.location.is_some() {
        config.sim.location = args.location;
    }
    if let Some(seed) = args.seed {
        config.sim.seed = seed;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log::info!("Received Ctrl-C, shutting down...");
        flag.store(true, Ordering::Relaxed);
    })
    .map_err(|e| Error::Task(format!("failed to install Ctrl-C handler: {e}")))?;

    let mut robot = SimRobot::new(config)?;
    let delay = Duration::from_millis(robot.config.drive.startup.zero_heading_delay_ms);
    let zero_task = zero_heading_after(delay, robot.control.requests(), Arc::clone(&shutdown))?;

    start_mode(&mut robot, args.mode)?;

    let period = Duration::from_secs_f64(robot.period_s());
    let mut tick: u64 = 0;
    let result = loop {
        if shutdown.load(Ordering::Relaxed) || (args.ticks > 0 && tick >= args.ticks) {
            break Ok(());
        }
        let started = Instant::now();
        if let Err(e) = robot.step() {
            break Err(e);
        }
        tick += 1;

        if tick % 50 == 0 {
            let estimate = robot.pose();
            let truth = robot.world.pose();
            log::info!(
                "tick {tick}: est ({:.2}, {:.2}, {:.1}°) truth ({:.2}, {:.2}, {:.1}°) cmd {}",
                estimate.x,
                estimate.y,
                estimate.theta.to_degrees(),
                truth.x,
                truth.y,
                truth.theta.to_degrees(),
                robot.control.runner().active_name().unwrap_or("-"),
            );
        }

        if !args.fast
            && let Some(rest) = period.checked_sub(started.elapsed())
        {
            thread::sleep(rest);
        }
    };

    shutdown.store(true, Ordering::Relaxed);
    log::info!("Zero heading task: {:?}", zero_task.join());
    robot.control.shutdown()?;
    result
}

fn start_mode(robot: &mut SimRobot, mode: Mode) -> Result<()> {
    match mode {
        Mode::Idle => Ok(()),
        Mode::Orbit => {
            // Creep forward so the orbit has something to do
            robot.input.set(DriverInput {
                x: 0.5,
                field_oriented: true,
                ..DriverInput::default()
            });
            let orbit = Box::new(robot.orbit());
            robot.schedule(orbit, None)
        }
        Mode::Center => {
            let here = robot.world.pose();
            let behind = here.translation().minus(&chakra_drive::Translation2D::new(
                2.0 * here.theta.cos(),
                2.0 * here.theta.sin(),
            ));
            robot.world.set_object(Some(behind));
            robot.schedule_center()
        }
        Mode::Amp => {
            let line_up = Box::new(robot.line_up(LineUpTarget::Amp));
            robot.schedule(line_up, None)
        }
        Mode::Speaker => {
            let line_up = Box::new(robot.line_up(LineUpTarget::Speaker));
            robot.schedule(line_up, None)
        }
    }
}
