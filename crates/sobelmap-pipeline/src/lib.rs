//! sobelmap-pipeline: Sobel edge detection (sans-IO).
//!
//! Turns a color image into an 8-bit edge map through:
//! decode -> median filter -> grayscale -> Sobel convolution ->
//! gradient magnitude -> threshold.
//!
//! This crate has **no I/O dependencies**; it operates on in-memory
//! byte slices and arrays. Filesystem access lives in `sobelmap-io`.

pub mod convolve;
pub mod decode;
pub mod denoise;
pub mod diagnostics;
pub mod edge;
pub mod grayscale;
pub mod histogram;
pub mod kernel;
pub mod normalize;
pub mod pipeline;
pub mod threshold;
pub mod types;

pub use decode::decode_pixels;
pub use diagnostics::{
    Clock, PipelineDiagnostics, PipelineSummary, StageDiagnostics, StageMetrics,
    process_pixels_with_diagnostics, process_staged_with_diagnostics,
};
pub use edge::detect_edges;
pub use histogram::Histogram;
pub use kernel::Kernel3;
pub use pipeline::Pipeline;
pub use types::{
    BinaryEdgeMap, Dimensions, EdgeMagnitudeMap, ErrorKind, GradientMap, GrayImage,
    GrayscaleMap, OutputImage, PipelineConfig, PipelineError, PixelArray, RgbImage,
    StagedResult, ThresholdPolicy,
};

/// Run the full pipeline on encoded image bytes and return only the
/// output raster.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// validation, [`PipelineError::EmptyInput`] if `image_bytes` is empty,
/// [`PipelineError::ImageDecode`] if the image cannot be decoded, and
/// [`PipelineError::InvalidFormat`] if it has no pixels.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<OutputImage, PipelineError> {
    process_staged(image_bytes, config).map(|staged| staged.output)
}

/// Run the full pipeline on encoded image bytes, keeping every
/// intermediate.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_staged(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    config.validate()?;
    Ok(Pipeline::new(image_bytes.to_vec(), config.clone())
        .decode()?
        .denoise()
        .detect_edges()?
        .threshold()
        .into_result())
}

/// Run the pipeline on an already loaded pixel array.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// validation.
pub fn process_pixels(
    pixels: PixelArray,
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    config.validate()?;
    Ok(Pipeline::from_pixels(pixels, config.clone())
        .denoise()
        .detect_edges()?
        .threshold()
        .into_result())
}
