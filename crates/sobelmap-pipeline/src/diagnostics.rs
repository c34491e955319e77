//! Pipeline diagnostics: timing and per-stage metrics.
//!
//! Timing goes through the [`Clock`] trait so this crate never reads the
//! system clock itself; the CLI supplies a `std::time::Instant` backed
//! implementation and tests can supply a fake one.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::{Decoded, Pipeline};
use crate::types::{PipelineConfig, PipelineError, PixelArray, StagedResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: image decoding (`None` when the run started from an
    /// already loaded pixel array).
    pub decode: Option<StageDiagnostics>,
    /// Stage 2: median filter.
    pub denoise: StageDiagnostics,
    /// Stage 3: Sobel edge detection.
    pub edge_detection: StageDiagnostics,
    /// Stage 4: thresholding or rescaling.
    pub threshold: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
    },
    /// Median filter metrics.
    Denoise {
        /// Window radius in pixels (0 means the stage was a no-op).
        radius: u32,
    },
    /// Edge detection metrics.
    EdgeDetection {
        /// Smallest gradient magnitude.
        min_magnitude: f64,
        /// Largest gradient magnitude.
        max_magnitude: f64,
        /// Mean gradient magnitude.
        mean_magnitude: f64,
    },
    /// Thresholding metrics.
    Threshold {
        /// Policy name (`percentile`, `fixed` or `rescale`).
        policy: String,
        /// Magnitude cutoff, when the output is binary.
        threshold: Option<f64>,
        /// Number of edge pixels, when the output is binary.
        edge_pixel_count: Option<u64>,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
}

/// High-level summary for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Edge pixels in the output (`None` for rescaled output).
    pub edge_pixel_count: Option<u64>,
}

/// Run the full pipeline on encoded image bytes, timing every stage.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// validation, and any error [`Pending::decode`](crate::pipeline::Pending::decode)
/// or [`Denoised::detect_edges`](crate::pipeline::Denoised::detect_edges)
/// returns.
pub fn process_staged_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let total_start = clock.now();

    let start = clock.now();
    let decoded = Pipeline::new(image_bytes.to_vec(), config.clone()).decode()?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: decoded.stage_metrics(),
    };

    let (result, mut diagnostics) = run_timed(decoded, clock)?;
    diagnostics.decode = Some(decode);
    diagnostics.total_duration = clock.elapsed(&total_start);
    Ok((result, diagnostics))
}

/// Run the pipeline on an already loaded pixel array, timing every
/// stage after decoding.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// validation.
pub fn process_pixels_with_diagnostics<C: Clock>(
    pixels: PixelArray,
    config: &PipelineConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let total_start = clock.now();
    let (result, mut diagnostics) = run_timed(Pipeline::from_pixels(pixels, config.clone()), clock)?;
    diagnostics.total_duration = clock.elapsed(&total_start);
    Ok((result, diagnostics))
}

fn run_timed<C: Clock>(
    decoded: Decoded,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    let start = clock.now();
    let denoised = decoded.denoise();
    let denoise = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: denoised.stage_metrics(),
    };

    let start = clock.now();
    let edges = denoised.detect_edges()?;
    let edge_detection = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: edges.stage_metrics(),
    };

    let start = clock.now();
    let thresholded = edges.threshold();
    let threshold = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: thresholded.stage_metrics(),
    };

    let result = thresholded.into_result();
    let summary = PipelineSummary {
        image_width: result.dimensions.width,
        image_height: result.dimensions.height,
        pixel_count: result.dimensions.pixel_count(),
        edge_pixel_count: match &threshold.metrics {
            StageMetrics::Threshold {
                edge_pixel_count, ..
            } => *edge_pixel_count,
            _ => None,
        },
    };
    let diagnostics = PipelineDiagnostics {
        decode: None,
        denoise,
        edge_detection,
        threshold,
        total_duration: Duration::ZERO,
        summary,
    };
    Ok((result, diagnostics))
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages: Vec<(&str, &StageDiagnostics)> = Vec::with_capacity(4);
        if let Some(ref decode) = self.decode {
            stages.push(("Decode", decode));
        }
        stages.push(("Denoise", &self.denoise));
        stages.push(("Edge Detection", &self.edge_detection));
        stages.push(("Threshold", &self.threshold));

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        if let Some(edges) = self.summary.edge_pixel_count {
            lines.push(String::new());
            lines.push(format!("Edge pixels: {edges}"));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Denoise { radius } => {
            if *radius == 0 {
                "disabled".to_string()
            } else {
                let side = 2 * radius + 1;
                format!("median {side}x{side}")
            }
        }
        StageMetrics::EdgeDetection {
            min_magnitude,
            max_magnitude,
            mean_magnitude,
        } => format!(
            "min={min_magnitude:.1} max={max_magnitude:.1} mean={mean_magnitude:.2}"
        ),
        StageMetrics::Threshold {
            policy,
            threshold,
            edge_pixel_count,
            total_pixel_count,
        } => match (threshold, edge_pixel_count) {
            (Some(t), Some(edges)) => {
                #[allow(clippy::cast_precision_loss)]
                let density = if *total_pixel_count > 0 {
                    *edges as f64 / *total_pixel_count as f64 * 100.0
                } else {
                    0.0
                };
                format!("{policy} threshold={t:.2} edges={edges} ({density:.1}%)")
            }
            _ => format!("{policy} to [0, 255]"),
        },
    }
}
