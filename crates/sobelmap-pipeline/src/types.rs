//! Shared types for the sobelmap edge detection pipeline.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference output
/// rasters without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can convert pixel arrays
/// without depending on `image` directly.
pub use image::RgbImage;

/// Number of color channels in a [`PixelArray`] (red, green, blue).
pub const CHANNELS: usize = 3;

/// Per-pixel intensity, shape `(height, width)`.
pub type GrayscaleMap = Array2<f64>;

/// Signed directional derivative, shape `(height, width)`.
pub type GradientMap = Array2<f64>;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total number of pixels (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A decoded color image as a `(height, width, 3)` array of 8-bit
/// samples in red/green/blue order.
///
/// Construction validates the shape: exactly three channels and a
/// non-zero height and width that fit in `u32`. Once built, the array
/// is never mutated; every stage produces a fresh value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelArray(Array3<u8>);

impl PixelArray {
    /// Wrap a `(height, width, channels)` array.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidFormat`] if the channel axis is
    /// not 3 wide, if either spatial axis is empty, or if a dimension
    /// does not fit in `u32`.
    pub fn from_array(array: Array3<u8>) -> Result<Self, PipelineError> {
        let (height, width, channels) = array.dim();
        if channels != CHANNELS {
            return Err(PipelineError::InvalidFormat(format!(
                "expected {CHANNELS} color channels, got {channels}"
            )));
        }
        if height == 0 || width == 0 {
            return Err(PipelineError::InvalidFormat(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        if u32::try_from(height).is_err() || u32::try_from(width).is_err() {
            return Err(PipelineError::InvalidFormat(format!(
                "image dimensions {width}x{height} exceed the supported range"
            )));
        }
        Ok(Self(array))
    }

    /// Copy an 8-bit RGB image into a pixel array.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidFormat`] if the image has zero
    /// width or height.
    pub fn from_rgb_image(image: &RgbImage) -> Result<Self, PipelineError> {
        let shape = (image.height() as usize, image.width() as usize, CHANNELS);
        let array = Array3::from_shape_vec(shape, image.as_raw().clone())
            .map_err(|e| PipelineError::InvalidFormat(e.to_string()))?;
        Self::from_array(array)
    }

    /// Wrap an array whose shape the caller has already validated.
    pub(crate) fn from_valid(array: Array3<u8>) -> Self {
        debug_assert_eq!(array.dim().2, CHANNELS);
        Self(array)
    }

    /// Convert back into an `image` RGB buffer.
    #[must_use]
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let (x, y) = (x as usize, y as usize);
            image::Rgb([self.0[[y, x, 0]], self.0[[y, x, 1]], self.0[[y, x, 2]]])
        })
    }

    /// Borrow the underlying `(height, width, 3)` array.
    #[must_use]
    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.0.view()
    }

    /// Height in pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u32 {
        // Checked against u32 on construction.
        self.0.dim().0 as u32
    }

    /// Width in pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u32 {
        self.0.dim().1 as u32
    }

    /// Width and height as [`Dimensions`].
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Per-pixel gradient magnitude, shape `(height, width)`.
///
/// Values are finite and non-negative but otherwise unbounded: no
/// normalization is applied. Scaling to 8 bits is the job of
/// [`crate::threshold`] and [`crate::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMagnitudeMap(Array2<f64>);

impl EdgeMagnitudeMap {
    /// Wrap an existing magnitude array.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if the array is empty or
    /// holds a negative or non-finite value.
    pub fn from_array(values: Array2<f64>) -> Result<Self, PipelineError> {
        if values.is_empty() {
            return Err(PipelineError::InvalidInput(
                "edge magnitude map has no pixels".to_string(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(PipelineError::InvalidInput(format!(
                "edge magnitudes must be finite and non-negative, found {bad}"
            )));
        }
        Ok(Self(values))
    }

    /// Wrap magnitudes computed by the detector.
    pub(crate) fn from_valid(values: Array2<f64>) -> Self {
        Self(values)
    }

    /// Borrow the underlying `(height, width)` array.
    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }

    /// Consume the wrapper and return the underlying array.
    #[must_use]
    pub fn into_inner(self) -> Array2<f64> {
        self.0
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.0.nrows()
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.0.ncols()
    }

    /// Smallest and largest magnitude.
    #[must_use]
    pub fn min_max(&self) -> (f64, f64) {
        self.0
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Arithmetic mean magnitude.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.0.mean().unwrap_or(0.0)
    }
}

/// A thresholded edge map whose pixels are exactly 0 or 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryEdgeMap(GrayImage);

impl BinaryEdgeMap {
    pub(crate) const fn from_valid(image: GrayImage) -> Self {
        Self(image)
    }

    /// Borrow the binary raster.
    #[must_use]
    pub const fn image(&self) -> &GrayImage {
        &self.0
    }

    /// Consume the wrapper and return the binary raster.
    #[must_use]
    pub fn into_image(self) -> GrayImage {
        self.0
    }

    /// Number of edge (255) pixels.
    #[must_use]
    pub fn edge_pixel_count(&self) -> u64 {
        self.0.pixels().map(|p| u64::from(p.0[0] == 255)).sum()
    }
}

/// The 8-bit raster written to disk, produced by a [`ThresholdPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub enum OutputImage {
    /// Binary edges produced by a scalar threshold.
    Binary {
        /// The {0, 255} edge map.
        edges: BinaryEdgeMap,
        /// The magnitude cutoff; pixels strictly above it are edges.
        threshold: f64,
    },
    /// Min-max rescaled magnitudes in `[0, 255]`.
    Rescaled(GrayImage),
}

impl OutputImage {
    /// Borrow the output raster regardless of how it was produced.
    #[must_use]
    pub const fn image(&self) -> &GrayImage {
        match self {
            Self::Binary { edges, .. } => edges.image(),
            Self::Rescaled(image) => image,
        }
    }

    /// Consume and return the output raster.
    #[must_use]
    pub fn into_image(self) -> GrayImage {
        match self {
            Self::Binary { edges, .. } => edges.into_image(),
            Self::Rescaled(image) => image,
        }
    }

    /// The threshold used, if the output is binary.
    #[must_use]
    pub const fn threshold(&self) -> Option<f64> {
        match self {
            Self::Binary { threshold, .. } => Some(*threshold),
            Self::Rescaled(_) => None,
        }
    }
}

/// How the edge magnitude map is turned into an 8-bit output image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Cut at the given percentile (0 to 100) of the magnitude
    /// distribution.
    Percentile {
        /// Percentile in `[0, 100]`.
        percentile: f64,
    },
    /// Cut at a fixed magnitude.
    Fixed {
        /// Magnitude cutoff.
        threshold: f64,
    },
    /// Min-max rescale to `[0, 255]` without binarizing.
    Rescale,
}

impl ThresholdPolicy {
    /// Default percentile for [`ThresholdPolicy::Percentile`].
    pub const DEFAULT_PERCENTILE: f64 = 90.0;

    /// Short name used in diagnostics and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Percentile { .. } => "percentile",
            Self::Fixed { .. } => "fixed",
            Self::Rescale => "rescale",
        }
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::Percentile {
            percentile: Self::DEFAULT_PERCENTILE,
        }
    }
}

/// Configuration for the edge detection pipeline.
///
/// Stage functions are total over any config (out-of-range percentiles
/// are clamped), but [`PipelineConfig::validate`] rejects values that
/// are almost certainly mistakes. The `process*` entry points call it
/// before doing any work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Median filter radius in pixels. The window is
    /// `(2 * radius + 1)` pixels square; 0 disables noise suppression.
    pub median_radius: u32,

    /// How the magnitude map becomes the output image.
    pub threshold: ThresholdPolicy,
}

impl PipelineConfig {
    /// Default median filter radius (a 7x7 window).
    pub const DEFAULT_MEDIAN_RADIUS: u32 = 3;

    /// Check that the config holds sensible values.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the percentile is
    /// outside `[0, 100]` or the fixed threshold is not finite.
    pub fn validate(&self) -> Result<(), PipelineError> {
        match self.threshold {
            ThresholdPolicy::Percentile { percentile } if !(0.0..=100.0).contains(&percentile) => {
                Err(PipelineError::InvalidConfig(format!(
                    "percentile must be within [0, 100], got {percentile}"
                )))
            }
            ThresholdPolicy::Fixed { threshold } if !threshold.is_finite() => {
                Err(PipelineError::InvalidConfig(format!(
                    "fixed threshold must be finite, got {threshold}"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            median_radius: Self::DEFAULT_MEDIAN_RADIUS,
            threshold: ThresholdPolicy::default(),
        }
    }
}

/// Result of running the pipeline with every intermediate kept.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Stage 1: the decoded RGB image.
    pub original: PixelArray,
    /// Stage 2: the median-filtered image.
    pub denoised: PixelArray,
    /// Stage 3: gradient magnitudes.
    pub magnitude: EdgeMagnitudeMap,
    /// Stage 4: the thresholded or rescaled output raster.
    pub output: OutputImage,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Broad failure categories shared by every sobelmap crate.
///
/// Lets callers branch on what went wrong without matching each
/// crate's concrete error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing or empty argument (e.g. an empty input path).
    InvalidArgument,
    /// The input could not be read or decoded.
    LoadFailure,
    /// The decoded image does not reduce to a 3-channel array.
    InvalidFormat,
    /// An array handed to a stage has the wrong shape or values.
    InvalidInput,
    /// The pipeline configuration is out of range.
    InvalidConfig,
    /// An output could not be written.
    SaveFailure,
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The decoded image is not a 3-channel array.
    #[error("invalid image format: {0}")]
    InvalidFormat(String),

    /// An array passed to a stage has the wrong shape or contents.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// The broad category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput | Self::ImageDecode(_) => ErrorKind::LoadFailure,
            Self::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}
