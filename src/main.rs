//! # Lockdown Main Entry Point
//!
//! Builds a round, drives the player with the autopilot, and prints the
//! outcome and metrics as JSON. Useful for balancing and for reproducing a
//! seed without a graphical shell.

use clap::Parser;
use log::{info, warn};
use lockdown::{
    config, Autopilot, Difficulty, HeuristicPolicy, LockdownError, LockdownResult,
    MetricsSnapshot, Outcome, RoundConfig, RoundState,
};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Command line arguments for the headless Lockdown runner.
#[derive(Parser, Debug)]
#[command(name = "lockdown")]
#[command(about = "Headless guard pursuit rounds in procedurally generated mazes")]
#[command(version)]
struct Args {
    /// Random seed for maze generation and guard behavior
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of guards: easy = 2, medium = 4, hard = 8
    #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,

    /// JSON round configuration; missing fields take defaults
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Let the heuristic policy backend steer the guards
    #[arg(long)]
    policy: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    difficulty: Difficulty,
    policy: Option<&'static str>,
    outcome: Outcome,
    metrics: MetricsSnapshot,
}

fn main() -> LockdownResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Lockdown v{}", lockdown::VERSION);

    let mut config = match &args.config {
        Some(path) => RoundConfig::from_json_file(path)?,
        None => RoundConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.generation.seed = seed;
    }
    let seed = config.generation.seed;

    let mut round = RoundState::build(args.difficulty, config)?;
    let policy = if args.policy {
        let backend = HeuristicPolicy::new();
        round = round.with_policy(Box::new(backend));
        Some("heuristic")
    } else {
        None
    };

    let outcome = run_round(&mut round, args.max_ticks);
    if !outcome.is_terminal() {
        warn!("Round still running after {} ticks", args.max_ticks);
    }

    let summary = RunSummary {
        seed,
        difficulty: args.difficulty,
        policy,
        outcome,
        metrics: round.metrics_snapshot(),
    };
    let json = serde_json::to_string_pretty(&summary).map_err(LockdownError::from)?;
    println!("{}", json);
    Ok(())
}

/// Installs `env_logger`; `RUST_LOG` wins over `--log-level` when set.
fn initialize_logging(log_level: &str) {
    let filter = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format_target(false)
        .init();
}

/// Simulated time between two ticks.
fn frame_duration() -> Duration {
    Duration::from_secs(1) / config::TARGET_FPS as u32
}

/// Ticks the round with autopilot input until it ends or `max_ticks` pass.
///
/// Time advances one frame per tick, so freezes last a fixed number of ticks
/// however fast the loop runs.
fn run_round(round: &mut RoundState, max_ticks: u64) -> Outcome {
    let mut autopilot = Autopilot::new();
    let frame = frame_duration();
    let mut now = Instant::now();
    for _ in 0..max_ticks {
        let intent = autopilot.next_intent(round);
        let report = round.tick_at(intent, now);
        if report.outcome.is_terminal() {
            return report.outcome;
        }
        now += frame;
    }
    round.outcome()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdown::{Grid, Obstacle, Position, RoundLayout};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_frame_duration_matches_target_fps() {
        assert_eq!(frame_duration(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn test_freeze_lasts_whole_frames() {
        // The scripted player never bumps obstacles, so freeze it by hand
        let layout = RoundLayout {
            grid: Grid::from_ascii(&["#######", "#.....#", "#######"]),
            start: Position::new(1, 1),
            exit: Position::new(5, 1),
            doors: Vec::new(),
            keys: Vec::new(),
            obstacles: vec![Obstacle {
                position: Position::new(2, 1),
            }],
            guard_spawns: Vec::new(),
        };
        let mut config = RoundConfig::new(1);
        config.freeze_duration_ms = 100;
        let mut round = RoundState::from_layout(layout, config, StdRng::seed_from_u64(1)).unwrap();

        let frame = frame_duration();
        let start = Instant::now();
        let report = round.tick_at(lockdown::MoveIntent::new(0.125, 0.0), start);
        assert!(report.player_frozen);
        // 100 ms spans six frames at 60 fps
        assert!(round.tick_at(lockdown::MoveIntent::none(), start + frame * 6).player_frozen);
        assert!(!round.tick_at(lockdown::MoveIntent::none(), start + frame * 7).player_frozen);
    }

    #[test]
    fn test_headless_round_escapes_empty_maze() {
        let layout = RoundLayout {
            grid: Grid::from_ascii(&["#######", "#.....#", "#######"]),
            start: Position::new(1, 1),
            exit: Position::new(5, 1),
            doors: Vec::new(),
            keys: Vec::new(),
            obstacles: Vec::new(),
            guard_spawns: Vec::new(),
        };
        let mut round =
            RoundState::from_layout(layout, RoundConfig::new(1), StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(run_round(&mut round, 1000), Outcome::Escape);
        // Escape registers once the sprite centre crosses into the exit tile at x = 4.5
        assert_eq!(round.metrics_snapshot().ticks, 28);
    }
}
