//! Fork-join simulation loop.
//!
//! Lifecycle: INIT (allocate buffers, partition, build pool) -> RUNNING ->
//! CONVERGED | EXHAUSTED | CANCELLED -> TERMINATED (drop).
//!
//! Each timestep spawns one task per block into a dedicated rayon pool. A task
//! snapshots its block of the current buffer, evolves the block into its own
//! region of the next buffer and adds its change count to a shared atomic
//! counter. The scope joins every task before the counter is read and the
//! buffers are swapped.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::automaton::partition::{partition, Partition};
use crate::automaton::region::split_block_regions;
use crate::automaton::stepping::evolve_block;
use crate::error::{LifeError, Result};
use crate::render::Observer;
use crate::snapshot::SnapshotWriter;
use crate::state::GridState;

/// Simulation parameters. `Default` matches the command-line defaults, except
/// that it never pauses.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub width: usize,
    pub height: usize,
    pub timesteps: u64,
    pub horizontal_blocks: usize,
    pub vertical_blocks: usize,
    /// Worker-pool size. `None` means one worker per block.
    pub workers: Option<usize>,
    /// Snapshot path prefix, or `None` to skip snapshots.
    pub output_prefix: Option<PathBuf>,
    /// Pause before stopping once a fixed point is reached.
    pub convergence_pause: Duration,
    /// Pause after every non-final timestep.
    pub step_delay: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            width: 30,
            height: 30,
            timesteps: 10,
            horizontal_blocks: 2,
            vertical_blocks: 2,
            workers: None,
            output_prefix: Some(PathBuf::from("out/output")),
            convergence_pause: Duration::ZERO,
            step_delay: Duration::ZERO,
        }
    }
}

impl SimulationConfig {
    pub fn new(width: usize, height: usize) -> Self {
        SimulationConfig {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn timesteps(mut self, timesteps: u64) -> Self {
        self.timesteps = timesteps;
        self
    }

    pub fn blocks(mut self, horizontal: usize, vertical: usize) -> Self {
        self.horizontal_blocks = horizontal;
        self.vertical_blocks = vertical;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn output_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.output_prefix = Some(prefix.into());
        self
    }

    pub fn without_snapshots(mut self) -> Self {
        self.output_prefix = None;
        self
    }

    pub fn convergence_pause(mut self, pause: Duration) -> Self {
        self.convergence_pause = pause;
        self
    }

    pub fn step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn block_count(&self) -> usize {
        self.horizontal_blocks * self.vertical_blocks
    }

    /// Reject configurations that cannot produce a non-empty partition.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LifeError::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.horizontal_blocks == 0 || self.vertical_blocks == 0 {
            return Err(LifeError::Config(format!(
                "block counts must be positive, got {}x{}",
                self.horizontal_blocks, self.vertical_blocks
            )));
        }
        if self.horizontal_blocks > self.width || self.vertical_blocks > self.height {
            return Err(LifeError::Config(format!(
                "{}x{} blocks do not fit a {}x{} grid",
                self.horizontal_blocks, self.vertical_blocks, self.width, self.height
            )));
        }
        if self.workers == Some(0) {
            return Err(LifeError::Config("worker pool size must be positive".into()));
        }
        Ok(())
    }
}

/// What one timestep did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    pub timestep: u64,
    /// Change count per block, in `Partition::blocks` order.
    pub block_changes: Vec<usize>,
    /// Value of the shared change counter after the join.
    pub changes: usize,
    pub snapshot_failures: usize,
}

/// Terminal state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No cell changed during `timestep`.
    Converged { timestep: u64 },
    /// Every timestep ran and cells were still changing.
    Exhausted,
    /// The cancel flag was observed before `timestep` started.
    Cancelled { timestep: u64 },
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub outcome: Outcome,
    pub steps: Vec<StepReport>,
}

impl RunSummary {
    pub fn timesteps_run(&self) -> usize {
        self.steps.len()
    }

    pub fn snapshot_failures(&self) -> usize {
        self.steps.iter().map(|s| s.snapshot_failures).sum()
    }
}

pub struct Simulation {
    config: SimulationConfig,
    grid: GridState,
    partition: Partition,
    pool: rayon::ThreadPool,
    snapshots: Option<SnapshotWriter>,
    observer: Option<Box<dyn Observer>>,
    cancel: Arc<AtomicBool>,
}

impl Simulation {
    /// INIT: validate, allocate both buffers, load `initial` into the current
    /// buffer (all dead when `None`), partition the grid and build the pool.
    pub fn new(config: SimulationConfig, initial: Option<&[bool]>) -> Result<Self> {
        config.validate()?;

        let grid = match initial {
            Some(cells) => GridState::from_cells(config.width, config.height, cells)?,
            None => GridState::new(config.width, config.height)?,
        };
        let partition = partition(
            config.width,
            config.height,
            config.horizontal_blocks,
            config.vertical_blocks,
        )?;

        let num_threads = config.workers.unwrap_or(partition.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("block-worker-{i}"))
            .build()
            .map_err(|err| LifeError::Config(format!("failed to build worker pool: {err}")))?;

        let snapshots = config.output_prefix.clone().map(SnapshotWriter::new);
        if let Some(writer) = &snapshots {
            if let Err(err) = writer.prepare() {
                warn!("could not prepare snapshot output: {err}");
            }
        }

        info!(
            "initialized {}x{} grid, {} blocks ({}x{}), {} workers",
            config.width,
            config.height,
            partition.len(),
            config.horizontal_blocks,
            config.vertical_blocks,
            num_threads
        );

        Ok(Simulation {
            config,
            grid,
            partition,
            pool,
            snapshots,
            observer: None,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Shared flag; setting it stops the run at the next timestep boundary.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Run one fork-join timestep. Buffers are swapped only if something changed.
    pub fn step(&mut self, timestep: u64) -> StepReport {
        if let Some(observer) = self.observer.as_mut() {
            observer.observe(&self.grid, timestep);
        }

        let (width, height) = (self.grid.width, self.grid.height);
        let changes = AtomicUsize::new(0);
        let snapshot_failures = AtomicUsize::new(0);
        let mut block_changes = vec![0usize; self.partition.len()];

        {
            let (current, next) = self.grid.split_mut();
            let regions = split_block_regions(&self.partition, next);
            let snapshots = self.snapshots.as_ref();
            let changes = &changes;
            let snapshot_failures = &snapshot_failures;

            self.pool.scope(|scope| {
                for (mut region, slot) in regions.into_iter().zip(block_changes.iter_mut()) {
                    scope.spawn(move |_| {
                        if let Some(writer) = snapshots {
                            if let Err(err) = writer.write(current, width, &region.block, timestep) {
                                warn!("block {} timestep {timestep}: {err}", region.block.id);
                                snapshot_failures.fetch_add(1, Ordering::Relaxed);
                            }
                        }

                        let local = evolve_block(current, width, height, &mut region);
                        *slot = local;
                        changes.fetch_add(local, Ordering::Relaxed);
                    });
                }
            });
        }

        let changes = changes.into_inner();
        if changes > 0 {
            self.grid.swap();
        }
        debug!("timestep {timestep}: {changes} cells changed");

        StepReport {
            timestep,
            block_changes,
            changes,
            snapshot_failures: snapshot_failures.into_inner(),
        }
    }

    /// RUNNING until the grid converges, the timestep budget runs out or the
    /// cancel flag is set.
    pub fn run(&mut self) -> RunSummary {
        let mut steps = Vec::new();

        for t in 0..self.config.timesteps {
            if self.cancel.load(Ordering::Relaxed) {
                info!("cancelled before timestep {t}");
                return RunSummary {
                    outcome: Outcome::Cancelled { timestep: t },
                    steps,
                };
            }

            let report = self.step(t);
            let converged = report.changes == 0;
            steps.push(report);

            if converged {
                info!("converged at timestep {t}");
                if !self.config.convergence_pause.is_zero() {
                    thread::sleep(self.config.convergence_pause);
                }
                return RunSummary {
                    outcome: Outcome::Converged { timestep: t },
                    steps,
                };
            }

            if !self.config.step_delay.is_zero() {
                thread::sleep(self.config.step_delay);
            }
        }

        info!(
            "timestep budget of {} exhausted without convergence",
            self.config.timesteps
        );
        RunSummary {
            outcome: Outcome::Exhausted,
            steps,
        }
    }

    /// TERMINATED: release the pool and partition, keep the final grid.
    pub fn into_grid(self) -> GridState {
        self.grid
    }
}
