//! Life rule (B3/S23) applied block by block.

use super::grid::{index_of, live_neighbors};
use super::partition::Partition;
use super::region::{split_block_regions, BlockRegionMut};
use crate::state::GridState;

/// B3/S23 transition.
///
/// `neighbors` is the number of live cells around the cell, not counting the
/// cell itself. Birth on exactly 3, survival on 2 or 3.
#[inline]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    neighbors == 3 || (neighbors == 2 && alive)
}

/// Evolve every cell of `region.block`, reading `current` and writing `region`.
///
/// Returns how many cells in the block changed state. Reads may reach into
/// other blocks' territory; writes stay inside the region.
pub fn evolve_block(
    current: &[u8],
    width: usize,
    height: usize,
    region: &mut BlockRegionMut<'_>,
) -> usize {
    let (xstart, ystart) = (region.block.xstart, region.block.ystart);
    let mut changes = 0;

    for (dy, row) in region.rows_mut().iter_mut().enumerate() {
        let y = ystart + dy;
        for (dx, cell) in row.iter_mut().enumerate() {
            let x = xstart + dx;
            let alive = current[index_of(width, x, y)] != 0;
            let next = next_state(alive, live_neighbors(current, x, y, width, height));

            *cell = next as u8;
            if next != alive {
                changes += 1;
            }
        }
    }

    changes
}

/// Single-threaded step over all blocks in order, then swap buffers.
///
/// Produces the same grid as the pooled step; useful for small grids and as a
/// reference. Returns per-block change counts.
pub fn step_automaton(state: &mut GridState, partition: &Partition) -> Vec<usize> {
    let (width, height) = (state.width, state.height);
    let block_changes: Vec<usize> = {
        let (current, next) = state.split_mut();
        split_block_regions(partition, next)
            .iter_mut()
            .map(|region| evolve_block(current, width, height, region))
            .collect()
    };

    state.swap();
    block_changes
}
