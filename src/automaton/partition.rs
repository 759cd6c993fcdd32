//! Block decomposition of the grid.
//!
//! Block edges along each axis come from one shared boundary table, so
//! adjacent blocks always meet at the same coordinate. Blocks tile the
//! grid exactly even when the dimensions are not divisible by the counts.

use crate::error::{LifeError, Result};

/// Rectangle `[xstart, xend) x [ystart, yend)` owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    /// Row-major block index (`row * horizontal_blocks + column`).
    pub id: usize,
    pub xstart: usize,
    pub xend: usize,
    pub ystart: usize,
    pub yend: usize,
}

impl Block {
    #[inline]
    pub fn width(&self) -> usize {
        self.xend - self.xstart
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.yend - self.ystart
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.xstart..self.xend).contains(&x) && (self.ystart..self.yend).contains(&y)
    }
}

/// Immutable set of blocks computed once at startup.
#[derive(Clone, Debug)]
pub struct Partition {
    width: usize,
    height: usize,
    x_bounds: Vec<usize>,
    y_bounds: Vec<usize>,
    blocks: Vec<Block>,
}

/// `parts + 1` boundary positions spanning `[0, extent]`.
///
/// Entry `i` is `i * extent / parts` rounded half up, which is monotonically
/// non-decreasing with the first entry 0 and the last entry `extent`.
/// Intermediates are widened to `u128`, so any `usize` extent is accepted.
pub fn boundaries(extent: usize, parts: usize) -> Vec<usize> {
    let (extent, parts) = (extent as u128, parts as u128);
    (0..=parts)
        .map(|i| ((2 * i * extent + parts) / (2 * parts)) as usize)
        .collect()
}

/// Split a `width x height` grid into `horizontal_blocks * vertical_blocks` blocks.
///
/// Blocks are listed in row-major order. When a count exceeds the extent along
/// its axis some blocks are empty, which is still a valid partition.
pub fn partition(
    width: usize,
    height: usize,
    horizontal_blocks: usize,
    vertical_blocks: usize,
) -> Result<Partition> {
    if horizontal_blocks == 0 || vertical_blocks == 0 {
        return Err(LifeError::Config(format!(
            "block counts must be positive, got {horizontal_blocks}x{vertical_blocks}"
        )));
    }

    let count = horizontal_blocks.checked_mul(vertical_blocks).ok_or_else(|| {
        LifeError::Config(format!(
            "too many blocks: {horizontal_blocks}x{vertical_blocks}"
        ))
    })?;

    let x_bounds = boundaries(width, horizontal_blocks);
    let y_bounds = boundaries(height, vertical_blocks);

    let mut blocks = Vec::with_capacity(count);
    for (row, ys) in y_bounds.windows(2).enumerate() {
        for (column, xs) in x_bounds.windows(2).enumerate() {
            blocks.push(Block {
                id: row * horizontal_blocks + column,
                xstart: xs[0],
                xend: xs[1],
                ystart: ys[0],
                yend: ys[1],
            });
        }
    }

    Ok(Partition {
        width,
        height,
        x_bounds,
        y_bounds,
        blocks,
    })
}

impl Partition {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn horizontal_blocks(&self) -> usize {
        self.x_bounds.len() - 1
    }

    pub fn vertical_blocks(&self) -> usize {
        self.y_bounds.len() - 1
    }

    /// Column boundary table shared by every block row.
    pub fn x_bounds(&self) -> &[usize] {
        &self.x_bounds
    }

    /// Row boundary table shared by every block column.
    pub fn y_bounds(&self) -> &[usize] {
        &self.y_bounds
    }

    /// Index of the block row containing grid row `y`.
    pub fn band_of_row(&self, y: usize) -> usize {
        self.y_bounds[1..].partition_point(|&bound| bound <= y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries_even_split() {
        assert_eq!(boundaries(30, 2), vec![0, 15, 30]);
        assert_eq!(boundaries(12, 4), vec![0, 3, 6, 9, 12]);
    }

    #[test]
    fn test_boundaries_uneven_split() {
        // 10 / 3 = 3.33 -> rounded edges at 3 and 7
        assert_eq!(boundaries(10, 3), vec![0, 3, 7, 10]);
        assert_eq!(boundaries(7, 2), vec![0, 4, 7]);
    }

    #[test]
    fn test_boundaries_huge_extent() {
        let bounds = boundaries(usize::MAX, 3);
        assert_eq!(bounds.first(), Some(&0));
        assert_eq!(bounds.last(), Some(&usize::MAX));
        assert!(bounds.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(bounds[1], usize::MAX / 3);

        let p = partition(usize::MAX, usize::MAX / 2, 2, 3).unwrap();
        assert_eq!(p.len(), 6);
        assert_eq!(p.blocks()[5].xend, usize::MAX);
        assert_eq!(p.blocks()[5].yend, usize::MAX / 2);
    }

    #[test]
    fn test_block_count_overflow_rejected() {
        assert!(matches!(
            partition(4, 4, usize::MAX, 2),
            Err(LifeError::Config(_))
        ));
    }

    #[test]
    fn test_more_blocks_than_cells() {
        let bounds = boundaries(2, 5);
        assert_eq!(bounds.first(), Some(&0));
        assert_eq!(bounds.last(), Some(&2));
        assert!(bounds.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_partition_layout() {
        let p = partition(30, 30, 2, 2).unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(p.horizontal_blocks(), 2);
        assert_eq!(p.vertical_blocks(), 2);
        assert_eq!(
            p.blocks()[1],
            Block {
                id: 1,
                xstart: 15,
                xend: 30,
                ystart: 0,
                yend: 15
            }
        );
        assert_eq!(p.blocks()[2].ystart, 15);
        assert_eq!(p.blocks()[2].xstart, 0);
    }

    #[test]
    fn test_zero_blocks_rejected() {
        assert!(matches!(partition(10, 10, 0, 2), Err(LifeError::Config(_))));
        assert!(matches!(partition(10, 10, 2, 0), Err(LifeError::Config(_))));
    }

    #[test]
    fn test_band_of_row() {
        let p = partition(4, 10, 1, 3).unwrap();
        assert_eq!(p.y_bounds(), &[0, 3, 7, 10]);
        assert_eq!(p.band_of_row(0), 0);
        assert_eq!(p.band_of_row(2), 0);
        assert_eq!(p.band_of_row(3), 1);
        assert_eq!(p.band_of_row(6), 1);
        assert_eq!(p.band_of_row(9), 2);
    }

    #[test]
    fn test_band_of_row_skips_empty_bands() {
        let p = partition(4, 1, 1, 3).unwrap();
        let owner = p.band_of_row(0);
        assert_eq!(p.blocks()[owner].height(), 1);
    }

    proptest! {
        #[test]
        fn prop_blocks_partition_grid(
            w in 1usize..64,
            h in 1usize..64,
            hb in 1usize..9,
            vb in 1usize..9,
        ) {
            let p = partition(w, h, hb, vb).unwrap();
            prop_assert_eq!(p.len(), hb * vb);

            let mut owners = vec![0u32; w * h];
            for block in p.blocks() {
                for y in block.ystart..block.yend {
                    for x in block.xstart..block.xend {
                        owners[y * w + x] += 1;
                    }
                }
            }
            prop_assert!(owners.iter().all(|&n| n == 1));

            let total: usize = p.blocks().iter().map(Block::area).sum();
            prop_assert_eq!(total, w * h);

            for y in 0..h {
                let band = p.band_of_row(y);
                prop_assert!(p.y_bounds()[band] <= y && y < p.y_bounds()[band + 1]);
            }
        }
    }
}
