//! Initial grid state from an image file.

use std::path::Path;

use image::imageops::FilterType;
use log::info;

use crate::error::{LifeError, Result};

/// Luma values below this are alive (dark ink on light paper).
pub const ALIVE_THRESHOLD: u8 = 128;

/// Rasterize the image at `path` into a `width * height` row-major cell grid.
///
/// The image is scaled to exactly `width x height` with nearest-neighbor
/// sampling, converted to grayscale and thresholded.
pub fn load_initial_state(path: &Path, width: usize, height: usize) -> Result<Vec<bool>> {
    let fail = |reason: String| LifeError::InitialState {
        path: path.to_path_buf(),
        reason,
    };

    let target_w = u32::try_from(width).map_err(|_| fail(format!("width {width} too large")))?;
    let target_h = u32::try_from(height).map_err(|_| fail(format!("height {height} too large")))?;

    let img = image::open(path).map_err(|err| fail(err.to_string()))?;
    info!(
        "loaded {} ({}x{}), scaling to {width}x{height}",
        path.display(),
        img.width(),
        img.height()
    );

    let luma = img
        .resize_exact(target_w, target_h, FilterType::Nearest)
        .to_luma8();
    Ok(luma.pixels().map(|p| p.0[0] < ALIVE_THRESHOLD).collect())
}
