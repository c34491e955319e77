//! Writing output rasters and JSON reports.
//!
//! Image formats are chosen from the path's extension by the `image`
//! crate; `.png` is the expected case.

use std::path::Path;

use serde::Serialize;
use sobelmap_pipeline::{GrayImage, PixelArray};

use crate::IoError;

/// Write a single-channel 8-bit image.
///
/// # Errors
///
/// Returns [`IoError::EmptyPath`] if `path` is empty and
/// [`IoError::Save`] if encoding or writing fails.
pub fn save_gray_image(path: impl AsRef<Path>, image: &GrayImage) -> Result<(), IoError> {
    let path = path.as_ref();
    check_path(path)?;
    image.save(path).map_err(|source| IoError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "saved grayscale image"
    );
    Ok(())
}

/// Write an RGB pixel array, such as the denoised intermediate.
///
/// # Errors
///
/// Same as [`save_gray_image`].
pub fn save_pixels(path: impl AsRef<Path>, pixels: &PixelArray) -> Result<(), IoError> {
    let path = path.as_ref();
    check_path(path)?;
    pixels
        .to_rgb_image()
        .save(path)
        .map_err(|source| IoError::Save {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "saved color image");
    Ok(())
}

/// Serialize `value` as pretty-printed JSON and write it to `path`.
///
/// `what` names the value in error messages.
///
/// # Errors
///
/// Returns [`IoError::EmptyPath`] if `path` is empty,
/// [`IoError::Serialize`] if serialization fails, and
/// [`IoError::Write`] if the file cannot be written.
pub fn write_json<T: Serialize>(
    path: impl AsRef<Path>,
    what: &'static str,
    value: &T,
) -> Result<(), IoError> {
    let path = path.as_ref();
    check_path(path)?;
    let json =
        serde_json::to_string_pretty(value).map_err(|source| IoError::Serialize { what, source })?;
    std::fs::write(path, json).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), what, "wrote json");
    Ok(())
}

fn check_path(path: &Path) -> Result<(), IoError> {
    if path.as_os_str().is_empty() {
        Err(IoError::EmptyPath { what: "output" })
    } else {
        Ok(())
    }
}
