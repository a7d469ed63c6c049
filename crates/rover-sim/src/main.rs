//! Headless rover simulator.
//!
//! Drives the rover along a scripted pattern on the chosen biome, optionally
//! recording the run, playing it back as a ghost and exporting it as JSON.
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags, e.g. `rover-sim --biome dunes --pattern figure8 --record --playback`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rover_config::{CliArgs, Config, default_config_dir};
use rover_replay::{FileStore, ManualClock, MemoryStore, ReplayStore};
use rover_sim::{DrivePattern, Session, SessionError, SimMode};

#[derive(Parser, Debug)]
#[command(name = "rover-sim", about = "Headless rover simulator")]
struct Args {
    #[command(flatten)]
    common: CliArgs,

    /// Seconds of scripted driving.
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Steering pattern.
    #[arg(long, value_enum, default_value_t = DrivePattern::Circle)]
    pattern: DrivePattern,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Record the scripted drive.
    #[arg(long)]
    record: bool,

    /// Play back the recording (or the persisted one) after driving.
    #[arg(long)]
    playback: bool,

    /// Directory to export the replay JSON into.
    #[arg(long)]
    export: Option<PathBuf>,
}

/// Totals logged at the end of a drive.
#[derive(Debug, Default)]
struct DriveSummary {
    frames: u64,
    steps: u64,
    emitted: usize,
    distance: f64,
    max_rpm: f64,
    slip_frames: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config_dir = match args.common.config.clone() {
        Some(dir) => Some(dir),
        None => match default_config_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                eprintln!("{e}, using default config");
                None
            }
        },
    };

    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args.common);
    config.apply_rover_preset();

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    rover_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &Config) -> Result<(), SessionError> {
    let store: Box<dyn ReplayStore> = match config.replay.resolve_data_dir() {
        Some(dir) => {
            tracing::debug!(dir = %dir.display(), "Persisting replays to disk");
            Box::new(FileStore::new(dir))
        }
        None => {
            tracing::warn!("No data directory; replays are kept in memory only");
            Box::new(MemoryStore::new())
        }
    };

    let clock = ManualClock::new(0.0);
    let mut session = Session::new(config, clock.clone(), store)?;
    let fps = if args.fps > 0.0 { args.fps } else { 60.0 };
    let dt = 1.0 / fps;

    session.toggle_drive();
    if args.record {
        session.start_recording();
    }

    let frames = (args.seconds.max(0.0) * fps).ceil() as u64;
    let mut summary = DriveSummary::default();
    let mut previous = session.physics().pose();
    for frame in 0..frames {
        session.set_input(args.pattern.input_at(frame as f64 * dt));
        clock.advance(dt * 1000.0);
        let report = session.frame(dt);

        let mut moved = report.pose.position - previous.position;
        moved.y = 0.0;
        summary.distance += moved.length();
        previous = report.pose;
        summary.frames += 1;
        summary.steps += u64::from(report.steps);
        summary.emitted += report.emitted.len();
        summary.max_rpm = summary.max_rpm.max(report.telemetry.rpm);
        if report.telemetry.slipping {
            summary.slip_frames += 1;
        }
        if let Some(hud) = report.hud {
            tracing::trace!(rpm = hud.rpm, pitch = hud.pitch, roll = hud.roll, "HUD");
        }
    }

    if args.record {
        session.stop_recording();
    }

    let pose = session.physics().pose();
    tracing::info!(
        pattern = ?args.pattern,
        biome = %session.biome().id,
        frames = summary.frames,
        steps = summary.steps,
        emitted = summary.emitted,
        distance = summary.distance,
        max_rpm = summary.max_rpm,
        slip_frames = summary.slip_frames,
        x = pose.position.x,
        z = pose.position.z,
        heading = pose.heading,
        "Drive finished"
    );

    if args.playback {
        play_back(&mut session, &clock, dt);
    }

    if let Some(dir) = &args.export {
        let path = session.export_to(dir)?;
        println!("{}", path.display());
    }

    Ok(())
}

fn play_back(session: &mut Session, clock: &ManualClock, dt: f64) {
    session.start_playback();
    if session.mode() != SimMode::Play {
        tracing::warn!("Nothing to play back");
        return;
    }

    let duration = session.replay().state().duration;
    // A second of slack lets the final tick land past the end.
    let limit = ((duration / 1000.0 + 1.0) / dt).ceil() as u64;
    let mut frames = 0;
    while session.mode() == SimMode::Play && frames < limit {
        clock.advance(dt * 1000.0);
        session.frame(dt);
        frames += 1;
    }

    let ghost = session.replay().ghost_pose();
    tracing::info!(
        samples = session.replay().samples().len(),
        duration_ms = duration,
        frames,
        ghost = ?ghost.map(|p| p.position),
        "Playback finished"
    );
}
