//! Block Life - block-decomposed Game of Life on a torus
//!
//! The grid is split into rectangular blocks, each evolved by its own task
//! once per timestep, with every block writing a VTK snapshot of its region.

pub mod automaton;
pub mod error;
pub mod loader;
pub mod render;
pub mod simulation;
pub mod snapshot;
pub mod state;


pub use error::{LifeError, Result};
pub use simulation::{Outcome, RunSummary, Simulation, SimulationConfig, StepReport};
pub use snapshot::SnapshotWriter;
pub use state::GridState;
