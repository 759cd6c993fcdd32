//! Error kinds for grid setup, snapshot output and initial-state loading.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifeError {
    /// Cell buffers could not be allocated.
    #[error("failed to allocate {cells} cells for a {width}x{height} grid")]
    Allocation {
        width: usize,
        height: usize,
        cells: usize,
    },

    /// Invalid grid dimensions or block counts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A snapshot file could not be created or written.
    #[error("snapshot I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The initial-state image could not be loaded.
    #[error("failed to load initial state from {}: {reason}", path.display())]
    InitialState { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, LifeError>;
