//! Reading images from disk.

use std::path::Path;

use sobelmap_pipeline::{PixelArray, decode_pixels};

use crate::IoError;

/// Read and decode the image at `path` into an 8-bit RGB pixel array.
///
/// The format is detected from the file contents, not the extension.
/// An empty path is rejected before the filesystem is touched.
///
/// # Errors
///
/// Returns [`IoError::EmptyPath`] if `path` is empty, [`IoError::Read`]
/// if the file cannot be read, and [`IoError::Load`] if its contents are
/// not a decodable image.
pub fn load_image(path: impl AsRef<Path>) -> Result<PixelArray, IoError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(IoError::EmptyPath { what: "input" });
    }

    let bytes = std::fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let pixels = decode_pixels(&bytes).map_err(|source| IoError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        width = pixels.width(),
        height = pixels.height(),
        "loaded image"
    );
    Ok(pixels)
}
