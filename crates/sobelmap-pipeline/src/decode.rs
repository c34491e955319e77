//! Image decoding and color normalization.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces a
//! validated 3-channel [`PixelArray`].
//!
//! This is the first step in the pipeline: raw bytes in, RGB array out.
//! Reading the bytes from disk is left to `sobelmap-io`.

use image::{ColorType, DynamicImage};

use crate::types::{PipelineError, PixelArray};

/// Decode raw image bytes into an 8-bit RGB pixel array.
///
/// Supports whatever formats the `image` crate was built with. Sources
/// that are not already 8-bit RGB are converted with
/// [`to_pixel_array`].
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
/// Returns [`PipelineError::InvalidFormat`] if the decoded image has no
/// pixels.
pub fn decode_pixels(bytes: &[u8]) -> Result<PixelArray, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let image = image::load_from_memory(bytes)?;
    to_pixel_array(&image)
}

/// Normalize a decoded image to 8-bit RGB.
///
/// Grayscale sources have their single channel replicated, alpha is
/// dropped, and 16-bit or float samples are scaled down to 8 bits.
/// Paletted sources arrive here already expanded by the decoder.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidFormat`] if the image has zero width
/// or height.
pub fn to_pixel_array(image: &DynamicImage) -> Result<PixelArray, PipelineError> {
    let color = image.color();
    if color != ColorType::Rgb8 {
        tracing::debug!(?color, "converting decoded image to 8-bit RGB");
    }
    PixelArray::from_rgb_image(&image.to_rgb8())
}
