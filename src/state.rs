//! Double-buffered grid state.
//!
//! Two same-shaped cell buffers; one is "current" (read-only during a step) and
//! the other is "next" (write target). `swap` flips the roles after the join barrier.

use crate::error::{LifeError, Result};

/// Grid dimensions plus the two cell buffers (0 = dead, 1 = alive).
pub struct GridState {
    pub width: usize,
    pub height: usize,
    buffers: [Vec<u8>; 2],
    current: usize,
    pub generation: u64,
}

/// Allocate a zeroed cell buffer, reporting failure instead of aborting.
fn alloc_cells(width: usize, height: usize) -> Result<Vec<u8>> {
    let alloc_error = || LifeError::Allocation {
        width,
        height,
        cells: width.saturating_mul(height),
    };
    let size = width.checked_mul(height).ok_or_else(alloc_error)?;

    let mut cells = Vec::new();
    cells.try_reserve_exact(size).map_err(|_| alloc_error())?;
    cells.resize(size, 0);
    Ok(cells)
}

impl GridState {
    /// Allocate an all-dead grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LifeError::Config(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }

        Ok(GridState {
            width,
            height,
            buffers: [alloc_cells(width, height)?, alloc_cells(width, height)?],
            current: 0,
            generation: 0,
        })
    }

    /// Allocate a grid whose current buffer holds `cells` (row-major, `width * height` long).
    pub fn from_cells(width: usize, height: usize, cells: &[bool]) -> Result<Self> {
        let mut state = Self::new(width, height)?;
        if cells.len() != width * height {
            return Err(LifeError::Config(format!(
                "initial state has {} cells, expected {}",
                cells.len(),
                width * height
            )));
        }

        for (dst, &alive) in state.buffers[state.current].iter_mut().zip(cells) {
            *dst = alive as u8;
        }
        Ok(state)
    }

    /// Row-major index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// The buffer read during the current step.
    #[inline]
    pub fn current(&self) -> &[u8] {
        &self.buffers[self.current]
    }

    /// Borrow the current buffer immutably and the next buffer mutably at once.
    pub fn split_mut(&mut self) -> (&[u8], &mut [u8]) {
        let (first, second) = self.buffers.split_at_mut(1);
        if self.current == 0 {
            (first[0].as_slice(), second[0].as_mut_slice())
        } else {
            (second[0].as_slice(), first[0].as_mut_slice())
        }
    }

    /// Flip current/next roles and advance the generation counter.
    pub fn swap(&mut self) {
        self.current ^= 1;
        self.generation += 1;
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.current()[self.index(x, y)] != 0
    }

    /// Set a cell in the current buffer. Only meaningful between steps.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        let idx = self.index(x, y);
        self.buffers[self.current][idx] = alive as u8;
    }

    pub fn population(&self) -> usize {
        self.current().iter().filter(|&&c| c != 0).count()
    }
}
