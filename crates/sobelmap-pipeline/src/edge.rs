//! Sobel gradient-magnitude edge detection.
//!
//! Four stateless steps: validate the input shape, reduce to grayscale by
//! channel mean, convolve with the [`HORIZONTAL`] and [`VERTICAL`]
//! kernels (same size, zero fill), and combine the two responses into
//! the Euclidean norm `sqrt(gx^2 + gy^2)`.
//!
//! The output is not normalized. A step from 0 to 255 produces a
//! magnitude of 1020 across the step; thresholding or rescaling happens
//! downstream.

use ndarray::{ArrayView2, ArrayView3, ArrayViewD, Ix3, Zip};

use crate::convolve::convolve_same_zero;
use crate::grayscale::channel_mean;
use crate::kernel::{HORIZONTAL, VERTICAL};
use crate::types::{CHANNELS, EdgeMagnitudeMap, GradientMap, PipelineError};

/// Detect edges in a `(height, width, 3)` array.
///
/// Accepts 8-bit or wider samples (anything losslessly convertible to
/// `f64`). The shape is checked before any arithmetic so a malformed
/// array fails with a clear error rather than a panic deep inside the
/// convolution.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] if `pixels` is not
/// three-dimensional, its last axis is not 3 wide, or it has no pixels.
pub fn detect_edges<T>(pixels: ArrayViewD<'_, T>) -> Result<EdgeMagnitudeMap, PipelineError>
where
    T: Copy + Into<f64>,
{
    let pixels = validate_shape(pixels)?;
    let gray = channel_mean(pixels);
    let (gx, gy) = gradients(gray.view());
    tracing::debug!(
        height = gray.nrows(),
        width = gray.ncols(),
        "computed sobel gradients"
    );
    magnitude(gx.view(), gy.view())
}

/// Horizontal and vertical gradient responses of a grayscale map.
///
/// Returned as `(gx, gy)` where `gx` uses [`HORIZONTAL`] and `gy` uses
/// [`VERTICAL`].
#[must_use = "returns the gradient maps"]
pub fn gradients(gray: ArrayView2<'_, f64>) -> (GradientMap, GradientMap) {
    let gx = convolve_same_zero(gray, &HORIZONTAL);
    let gy = convolve_same_zero(gray, &VERTICAL);
    (gx, gy)
}

/// Per-pixel Euclidean norm of two gradient maps.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] if `gx` and `gy` differ in
/// shape.
pub fn magnitude(
    gx: ArrayView2<'_, f64>,
    gy: ArrayView2<'_, f64>,
) -> Result<EdgeMagnitudeMap, PipelineError> {
    if gx.dim() != gy.dim() {
        return Err(PipelineError::InvalidInput(format!(
            "gradient maps differ in shape: {:?} vs {:?}",
            gx.dim(),
            gy.dim()
        )));
    }
    let values = Zip::from(gx).and(gy).map_collect(|&x, &y| x.hypot(y));
    Ok(EdgeMagnitudeMap::from_valid(values))
}

fn validate_shape<T>(pixels: ArrayViewD<'_, T>) -> Result<ArrayView3<'_, T>, PipelineError> {
    let shape = pixels.shape().to_vec();
    let pixels = pixels.into_dimensionality::<Ix3>().map_err(|_| {
        PipelineError::InvalidInput(format!(
            "expected a (height, width, {CHANNELS}) array, got shape {shape:?}"
        ))
    })?;
    let (height, width, channels) = pixels.dim();
    if channels != CHANNELS {
        return Err(PipelineError::InvalidInput(format!(
            "expected {CHANNELS} channels, got shape {shape:?}"
        )));
    }
    if height == 0 || width == 0 {
        return Err(PipelineError::InvalidInput(format!(
            "image has no pixels, got shape {shape:?}"
        )));
    }
    Ok(pixels)
}
