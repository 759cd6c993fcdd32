//! Cell indexing and toroidal neighbor counting.

/// Calculate the row-major index for a 2D coordinate.
#[inline]
pub fn index_of(width: usize, x: usize, y: usize) -> usize {
    y * width + x
}

/// Count live cells among the 8 Moore neighbors of `(x, y)` on a torus.
///
/// Each offset wraps independently modulo `width`/`height`, so on grids
/// narrower than 3 cells an offset may land on `(x, y)` itself and is
/// counted like any other position. Only the `(0, 0)` offset is skipped.
/// All wraparound handling in the crate goes through this function.
pub fn live_neighbors(cells: &[u8], x: usize, y: usize, width: usize, height: usize) -> u8 {
    let mut count = 0;

    for dy in -1isize..=1 {
        let ny = (y as isize + dy).rem_euclid(height as isize) as usize;
        for dx in -1isize..=1 {
            // Skip the center cell
            if dx == 0 && dy == 0 {
                continue;
            }

            let nx = (x as isize + dx).rem_euclid(width as isize) as usize;
            if cells[index_of(width, nx, ny)] != 0 {
                count += 1;
            }
        }
    }

    count
}
