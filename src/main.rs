use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use block_life::loader::load_initial_state;
use block_life::render::TerminalRenderer;
use block_life::{Outcome, Simulation, SimulationConfig};

const DEFAULT_WIDTH: usize = 30;
const DEFAULT_HEIGHT: usize = 30;
const DEFAULT_TIMESTEPS: u64 = 10;

/// Block-parallel Game of Life with per-block VTK snapshots.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Grid width in cells (non-positive means 30)
    #[arg(allow_negative_numbers = true)]
    width: Option<i64>,

    /// Grid height in cells (non-positive means 30)
    #[arg(allow_negative_numbers = true)]
    height: Option<i64>,

    /// Maximum number of timesteps (negative means none)
    #[arg(allow_negative_numbers = true)]
    timesteps: Option<i64>,

    /// Number of blocks along x
    #[arg(default_value_t = 2, allow_negative_numbers = true)]
    horizontal_blocks: i64,

    /// Number of blocks along y
    #[arg(default_value_t = 2, allow_negative_numbers = true)]
    vertical_blocks: i64,

    /// Image to rasterize as the initial state; all dead when omitted
    image: Option<PathBuf>,

    /// Snapshot path prefix
    #[arg(long, default_value = "out/output")]
    out: PathBuf,

    /// Skip snapshot files
    #[arg(long)]
    no_snapshots: bool,

    /// Draw the grid in the terminal every timestep
    #[arg(long)]
    show: bool,

    /// Pause after each timestep, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Pause after convergence, in milliseconds
    #[arg(long, default_value_t = 3000)]
    pause_ms: u64,

    /// Worker pool size (defaults to one worker per block)
    #[arg(long)]
    threads: Option<usize>,
}

fn dimension_or_default(value: Option<i64>, default: usize) -> usize {
    match value {
        Some(v) if v > 0 => v as usize,
        _ => default,
    }
}

fn timestep_budget(value: Option<i64>) -> u64 {
    value.map_or(DEFAULT_TIMESTEPS, |v| u64::try_from(v).unwrap_or(0))
}

fn block_count(value: i64, axis: &str) -> Result<usize> {
    usize::try_from(value)
        .ok()
        .filter(|&n| n > 0)
        .with_context(|| format!("{axis} block count must be positive, got {value}"))
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = SimulationConfig::new(
        dimension_or_default(args.width, DEFAULT_WIDTH),
        dimension_or_default(args.height, DEFAULT_HEIGHT),
    )
    .timesteps(timestep_budget(args.timesteps))
    .blocks(
        block_count(args.horizontal_blocks, "horizontal")?,
        block_count(args.vertical_blocks, "vertical")?,
    )
    .output_prefix(&args.out)
    .step_delay(Duration::from_millis(args.delay_ms))
    .convergence_pause(Duration::from_millis(args.pause_ms));

    if args.no_snapshots {
        config = config.without_snapshots();
    }
    if let Some(threads) = args.threads {
        config = config.workers(threads);
    }
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    config.validate().context("invalid configuration")?;

    let initial = match &args.image {
        Some(path) => Some(
            load_initial_state(path, config.width, config.height)
                .context("could not load initial state")?,
        ),
        None => None,
    };

    let mut simulation =
        Simulation::new(config, initial.as_deref()).context("simulation setup failed")?;
    if args.show {
        simulation = simulation.with_observer(Box::new(TerminalRenderer::stdout()));
    }

    let summary = simulation.run();
    match summary.outcome {
        Outcome::Converged { timestep } => info!("fixed point reached at timestep {timestep}"),
        Outcome::Exhausted => info!("ran {} timesteps", summary.timesteps_run()),
        Outcome::Cancelled { timestep } => info!("stopped before timestep {timestep}"),
    }
    if summary.snapshot_failures() > 0 {
        warn!("{} snapshot writes failed", summary.snapshot_failures());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
