//! Per-block views into the cell buffers.

use super::grid::index_of;
use super::partition::{Block, Partition};

/// Exclusive mutable view of one block's rows in the "next" buffer.
///
/// Holds one slice per grid row of the block, each exactly `block.width()`
/// long. Views produced by `split_block_regions` never alias, so they can be
/// handed to different workers without synchronization.
pub struct BlockRegionMut<'a> {
    pub block: Block,
    rows: Vec<&'a mut [u8]>,
}

impl<'a> BlockRegionMut<'a> {
    /// Rows of the block, top to bottom. Row `i` is grid row `block.ystart + i`.
    pub fn rows_mut(&mut self) -> &mut [&'a mut [u8]] {
        &mut self.rows
    }

    /// Write a cell using grid coordinates. Panics if `(x, y)` is outside the block.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        debug_assert!(self.block.contains(x, y));
        self.rows[y - self.block.ystart][x - self.block.xstart] = value;
    }
}

/// Carve `buf` (a full `width * height` buffer) into one view per block.
///
/// Every grid row is split at the shared column boundaries and each segment
/// goes to the block owning that row band and column range. The returned
/// views are in the same order as `partition.blocks()`.
pub fn split_block_regions<'a>(
    partition: &Partition,
    buf: &'a mut [u8],
) -> Vec<BlockRegionMut<'a>> {
    debug_assert_eq!(buf.len(), partition.width() * partition.height());

    let mut regions: Vec<BlockRegionMut<'a>> = partition
        .blocks()
        .iter()
        .map(|&block| BlockRegionMut {
            block,
            rows: Vec::with_capacity(block.height()),
        })
        .collect();

    let columns = partition.horizontal_blocks();
    let x_bounds = partition.x_bounds();

    for (y, row) in buf.chunks_mut(partition.width()).enumerate() {
        let band = partition.band_of_row(y);
        let mut rest = row;
        for column in 0..columns {
            let segment_len = x_bounds[column + 1] - x_bounds[column];
            let (segment, tail) = std::mem::take(&mut rest).split_at_mut(segment_len);
            regions[band * columns + column].rows.push(segment);
            rest = tail;
        }
    }

    regions
}

/// Copy a block's cells out of a full buffer into `out_buf`.
///
/// # Layout
/// Row-major, x changes fastest, matching the snapshot payload order.
///
/// # Returns
/// Number of cells written, or 0 if `out_buf` is too small.
pub fn extract_region(cells: &[u8], width: usize, block: &Block, out_buf: &mut [u8]) -> usize {
    if out_buf.len() < block.area() {
        return 0;
    }

    let mut offset = 0;
    for y in block.ystart..block.yend {
        let start = index_of(width, block.xstart, y);
        out_buf[offset..offset + block.width()]
            .copy_from_slice(&cells[start..start + block.width()]);
        offset += block.width();
    }

    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::partition::partition;

    #[test]
    fn test_regions_cover_buffer_exactly_once() {
        let p = partition(7, 5, 3, 2).unwrap();
        let mut buf = vec![0u8; 35];

        {
            let mut regions = split_block_regions(&p, &mut buf);
            assert_eq!(regions.len(), 6);
            for region in regions.iter_mut() {
                let id = region.block.id as u8 + 1;
                for row in region.rows_mut() {
                    for cell in row.iter_mut() {
                        *cell += id;
                    }
                }
            }
        }

        // Every cell touched by exactly the block that contains it
        for y in 0..5 {
            for x in 0..7 {
                let owner = p.blocks().iter().find(|b| b.contains(x, y)).unwrap();
                assert_eq!(buf[index_of(7, x, y)], owner.id as u8 + 1);
            }
        }
    }

    #[test]
    fn test_region_rows_match_block_shape() {
        let p = partition(4, 6, 2, 2).unwrap();
        let mut buf = vec![0u8; 24];
        let mut regions = split_block_regions(&p, &mut buf);

        let lower_right = &mut regions[3];
        assert_eq!(lower_right.block.ystart, 3);
        assert_eq!(lower_right.rows_mut().len(), 3);
        for row in lower_right.rows_mut() {
            assert_eq!(row.len(), 2);
        }
    }

    #[test]
    fn test_region_set_uses_grid_coordinates() {
        let p = partition(4, 4, 2, 2).unwrap();
        let mut buf = vec![0u8; 16];
        {
            let mut regions = split_block_regions(&p, &mut buf);
            regions[3].set(3, 2, 1);
            regions[0].set(0, 0, 1);
        }
        assert_eq!(buf[index_of(4, 3, 2)], 1);
        assert_eq!(buf[0], 1);
        assert_eq!(buf.iter().filter(|&&c| c == 1).count(), 2);
    }

    #[test]
    fn test_extract_region_basic() {
        let cells: Vec<u8> = (0..16).collect();
        let block = Block {
            id: 0,
            xstart: 1,
            xend: 3,
            ystart: 2,
            yend: 4,
        };

        let mut buffer = vec![0u8; 4];
        assert_eq!(extract_region(&cells, 4, &block, &mut buffer), 4);
        assert_eq!(buffer, vec![9, 10, 13, 14]);
    }

    #[test]
    fn test_extract_region_buffer_too_small() {
        let cells = vec![1u8; 16];
        let block = Block {
            id: 0,
            xstart: 0,
            xend: 4,
            ystart: 0,
            yend: 4,
        };

        let mut buffer = vec![0u8; 15];
        assert_eq!(extract_region(&cells, 4, &block, &mut buffer), 0);
    }
}
