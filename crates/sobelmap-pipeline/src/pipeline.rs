//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process_staged`] which runs the entire pipeline in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use sobelmap_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let staged = Pipeline::new(png, PipelineConfig::default())
//!     .decode()?
//!     .denoise()
//!     .detect_edges()?
//!     .threshold()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying all previously computed
//! intermediates. Stages never check the config; callers that accept
//! untrusted configs should run [`PipelineConfig::validate`] first, as
//! the `process*` functions do.

use crate::diagnostics::StageMetrics;
use crate::histogram::Histogram;
use crate::types::{
    Dimensions, EdgeMagnitudeMap, OutputImage, PipelineConfig, PipelineError, PixelArray,
    StagedResult,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .decode() to continue"]
pub struct Pending {
    config: PipelineConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Decode the source image and advance to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if the source bytes are
    /// empty, [`PipelineError::ImageDecode`] if the image format is
    /// unrecognized or the data is corrupt, and
    /// [`PipelineError::InvalidFormat`] if the image has no pixels.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        let source_len = self.source.len();
        let original = crate::decode::decode_pixels(&self.source)?;
        tracing::debug!(
            bytes = source_len,
            width = original.width(),
            height = original.height(),
            "decoded source image"
        );
        Ok(Decoded {
            config: self.config,
            original,
            source_len,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state holding a validated RGB pixel array.
#[must_use = "pipeline stages are consumed by advancing; call .denoise() to continue"]
pub struct Decoded {
    config: PipelineConfig,
    original: PixelArray,
    source_len: usize,
}

impl Decoded {
    /// The decoded RGB image.
    #[must_use]
    pub const fn original(&self) -> &PixelArray {
        &self.original
    }

    /// Advance to the median filter stage.
    pub fn denoise(self) -> Denoised {
        let radius = self.config.median_radius;
        let denoised = crate::denoise::median_filter(&self.original, radius);
        tracing::debug!(radius, "applied median filter");
        Denoised {
            config: self.config,
            original: self.original,
            denoised,
        }
    }

    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::Decode {
            input_bytes: self.source_len,
            width: self.original.width(),
            height: self.original.height(),
        }
    }
}

// ───────────────────────── Stage 2: Denoised ─────────────────────────

/// Pipeline state after median filtering.
#[must_use = "pipeline stages are consumed by advancing; call .detect_edges() to continue"]
pub struct Denoised {
    config: PipelineConfig,
    original: PixelArray,
    denoised: PixelArray,
}

impl Denoised {
    /// The median-filtered image.
    #[must_use]
    pub const fn denoised(&self) -> &PixelArray {
        &self.denoised
    }

    /// Advance to the edge detection stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if the filtered array is
    /// not `(height, width, 3)`. A [`PixelArray`] always is, so in
    /// practice this does not fail.
    pub fn detect_edges(self) -> Result<EdgesDetected, PipelineError> {
        let magnitude = crate::edge::detect_edges(self.denoised.view().into_dyn())?;
        Ok(EdgesDetected {
            config: self.config,
            original: self.original,
            denoised: self.denoised,
            magnitude,
        })
    }

    pub(crate) const fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::Denoise {
            radius: self.config.median_radius,
        }
    }
}

// ─────────────────────── Stage 3: EdgesDetected ──────────────────────

/// Pipeline state holding the raw gradient magnitudes.
#[must_use = "pipeline stages are consumed by advancing; call .threshold() to continue"]
pub struct EdgesDetected {
    config: PipelineConfig,
    original: PixelArray,
    denoised: PixelArray,
    magnitude: EdgeMagnitudeMap,
}

impl EdgesDetected {
    /// The unnormalized gradient magnitudes.
    #[must_use]
    pub const fn magnitude(&self) -> &EdgeMagnitudeMap {
        &self.magnitude
    }

    /// Histogram of the magnitudes, for choosing a threshold.
    #[must_use]
    pub fn histogram(&self, bins: usize) -> Histogram {
        Histogram::from_magnitudes(&self.magnitude, bins)
    }

    /// Advance to the threshold stage.
    pub fn threshold(self) -> Thresholded {
        let output = crate::threshold::apply(&self.magnitude, self.config.threshold);
        let dimensions = self.original.dimensions();
        Thresholded {
            config: self.config,
            original: self.original,
            denoised: self.denoised,
            magnitude: self.magnitude,
            output,
            dimensions,
        }
    }

    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        let (min_magnitude, max_magnitude) = self.magnitude.min_max();
        StageMetrics::EdgeDetection {
            min_magnitude,
            max_magnitude,
            mean_magnitude: self.magnitude.mean(),
        }
    }
}

// ──────────────────────── Stage 4: Thresholded ───────────────────────

/// Final pipeline state: the 8-bit output raster is ready.
#[must_use = "call .into_result() to take the staged result"]
pub struct Thresholded {
    config: PipelineConfig,
    original: PixelArray,
    denoised: PixelArray,
    magnitude: EdgeMagnitudeMap,
    output: OutputImage,
    dimensions: Dimensions,
}

impl Thresholded {
    /// The output raster.
    #[must_use]
    pub const fn output_image(&self) -> &OutputImage {
        &self.output
    }

    /// The gradient magnitudes the output was derived from.
    #[must_use]
    pub const fn magnitude(&self) -> &EdgeMagnitudeMap {
        &self.magnitude
    }

    /// Image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Consume the pipeline and return the full [`StagedResult`].
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            original: self.original,
            denoised: self.denoised,
            magnitude: self.magnitude,
            output: self.output,
            dimensions: self.dimensions,
        }
    }

    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        let edge_pixel_count = match &self.output {
            OutputImage::Binary { edges, .. } => Some(edges.edge_pixel_count()),
            OutputImage::Rescaled(_) => None,
        };
        StageMetrics::Threshold {
            policy: self.config.threshold.name().to_string(),
            threshold: self.output.threshold(),
            edge_pixel_count,
            total_pixel_count: self.dimensions.pixel_count(),
        }
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental edge detection pipeline.
///
/// Each stage method consumes the current state and returns the next,
/// making it a compile-time error to skip stages or call them out of
/// order.
pub struct Pipeline;

impl Pipeline {
    /// Start from encoded image bytes. Nothing is decoded until
    /// [`Pending::decode`] is called.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: PipelineConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }

    /// Start from an already decoded pixel array, skipping the decode
    /// stage.
    pub const fn from_pixels(pixels: PixelArray, config: PipelineConfig) -> Decoded {
        Decoded {
            config,
            original: pixels,
            source_len: 0,
        }
    }
}
