//! Core automaton logic: indexing, neighbor counting, partitioning and stepping.
//!
//! The simulation loop in `simulation` drives these functions from worker
//! threads; nothing here owns a thread or performs I/O.

pub mod grid;
pub mod partition;
pub mod region;
pub mod stepping;

pub use grid::{index_of, live_neighbors};
pub use partition::{boundaries, partition, Block, Partition};
pub use region::{extract_region, split_block_regions, BlockRegionMut};
pub use stepping::{evolve_block, next_state, step_automaton};
