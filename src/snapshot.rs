//! Legacy VTK structured-points snapshots, one file per block per timestep.
//!
//! Header is ASCII, payload is `width * height` big-endian f32 values in
//! row-major order (x fastest), 0.0 for dead and 1.0 for alive.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::automaton::partition::Block;
use crate::automaton::region::extract_region;
use crate::error::{LifeError, Result};

pub const FORMAT_NAME: &str = "vtk";

/// Host f32 to big-endian bytes, independent of host byte order.
#[inline]
pub fn to_big_endian(value: f32) -> [u8; 4] {
    value.to_bits().to_be_bytes()
}

/// Inverse of `to_big_endian`.
#[inline]
pub fn from_big_endian(bytes: [u8; 4]) -> f32 {
    f32::from_bits(u32::from_be_bytes(bytes))
}

/// `<prefix>_<block_id>_<timestep>.vtk`
pub fn snapshot_path(prefix: &Path, block_id: usize, timestep: u64) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("_{block_id}_{timestep}.{FORMAT_NAME}"));
    PathBuf::from(name)
}

/// ASCII header for a block snapshot, ending with the `LOOKUP_TABLE` line.
pub fn header(block: &Block, timestep: u64) -> String {
    format!(
        "# {FORMAT_NAME} DataFile Version 3.0\n\
         FRAME {timestep}\n\
         BINARY\n\
         DATASET STRUCTURED_POINTS\n\
         DIMENSIONS {} {} 1\n\
         SPACING 1.0 1.0 1.0\n\
         ORIGIN {} {} 0\n\
         POINT_DATA {}\n\
         SCALARS data float 1\n\
         LOOKUP_TABLE default\n",
        block.width(),
        block.height(),
        block.xstart,
        block.ystart,
        block.area(),
    )
}

/// Full file contents for one block at one timestep.
pub fn encode_snapshot(cells: &[u8], width: usize, block: &Block, timestep: u64) -> Vec<u8> {
    let header = header(block, timestep);
    let mut bytes = Vec::with_capacity(header.len() + block.area() * 4);
    bytes.extend_from_slice(header.as_bytes());

    let mut region = vec![0u8; block.area()];
    let copied = extract_region(cells, width, block, &mut region);
    debug_assert_eq!(copied, block.area());
    for &cell in &region {
        let value = if cell != 0 { 1.0 } else { 0.0 };
        bytes.extend_from_slice(&to_big_endian(value));
    }

    bytes
}

/// Writes block snapshots under a fixed path prefix.
#[derive(Clone, Debug)]
pub struct SnapshotWriter {
    prefix: PathBuf,
}

impl SnapshotWriter {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        SnapshotWriter {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Create the directory the prefix points into, if any.
    pub fn prepare(&self) -> Result<()> {
        match self.prefix.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|source| LifeError::Io {
                    path: dir.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    /// Serialize `block` of `cells` for `timestep`. Returns the written path.
    pub fn write(
        &self,
        cells: &[u8],
        width: usize,
        block: &Block,
        timestep: u64,
    ) -> Result<PathBuf> {
        let path = snapshot_path(&self.prefix, block.id, timestep);
        let io_error = |source: std::io::Error| LifeError::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(io_error)?;
        let mut out = BufWriter::new(file);
        out.write_all(&encode_snapshot(cells, width, block, timestep))
            .map_err(io_error)?;
        out.flush().map_err(io_error)?;

        debug!("wrote snapshot {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: usize, xstart: usize, xend: usize, ystart: usize, yend: usize) -> Block {
        Block {
            id,
            xstart,
            xend,
            ystart,
            yend,
        }
    }

    #[test]
    fn test_big_endian_bytes() {
        assert_eq!(to_big_endian(1.0), [0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(to_big_endian(0.0), [0, 0, 0, 0]);
        assert_eq!(to_big_endian(-2.5), [0xC0, 0x20, 0x00, 0x00]);
        assert_eq!(from_big_endian([0x3F, 0x80, 0x00, 0x00]), 1.0);
    }

    #[test]
    fn test_snapshot_path() {
        let path = snapshot_path(Path::new("out/output"), 3, 17);
        assert_eq!(path, PathBuf::from("out/output_3_17.vtk"));
    }

    #[test]
    fn test_header_exact() {
        let text = header(&block(1, 15, 30, 0, 15), 4);
        assert_eq!(
            text,
            "# vtk DataFile Version 3.0\n\
             FRAME 4\n\
             BINARY\n\
             DATASET STRUCTURED_POINTS\n\
             DIMENSIONS 15 15 1\n\
             SPACING 1.0 1.0 1.0\n\
             ORIGIN 15 0 0\n\
             POINT_DATA 225\n\
             SCALARS data float 1\n\
             LOOKUP_TABLE default\n"
        );
    }

    #[test]
    fn test_payload_layout() {
        // 3x2 grid, alive at (2,0) and (1,1)
        let cells = [0, 0, 1, 0, 1, 0];
        let b = block(0, 1, 3, 0, 2);
        let bytes = encode_snapshot(&cells, 3, &b, 0);
        let payload = &bytes[header(&b, 0).len()..];

        let values: Vec<f32> = payload
            .chunks_exact(4)
            .map(|c| from_big_endian([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(values, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_payload_covers_whole_block() {
        let cells = vec![1u8; 20];
        let b = block(0, 1, 4, 2, 5);
        let bytes = encode_snapshot(&cells, 4, &b, 0);
        let payload = &bytes[header(&b, 0).len()..];

        assert_eq!(payload.len(), b.area() * 4);
        assert!(payload
            .chunks_exact(4)
            .all(|c| from_big_endian([c[0], c[1], c[2], c[3]]) == 1.0));
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("nested/output"));
        writer.prepare().unwrap();

        let cells = vec![1u8; 4];
        let path = writer.write(&cells, 2, &block(2, 0, 2, 0, 2), 9).unwrap();

        assert_eq!(path, dir.path().join("nested/output_2_9.vtk"));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes, encode_snapshot(&cells, 2, &block(2, 0, 2, 0, 2), 9));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("absent/output"));

        let err = writer
            .write(&[0u8; 1], 1, &block(0, 0, 1, 0, 1), 0)
            .unwrap_err();
        assert!(matches!(err, LifeError::Io { .. }));
    }
}
