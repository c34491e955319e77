//! Threshold selection and binarization of the edge magnitude map.
//!
//! The default policy cuts at the 90th percentile of the magnitude
//! distribution, so roughly the strongest tenth of pixels become edges
//! regardless of image contrast. Pixels strictly above the cutoff are
//! set to 255, everything else to 0.

use image::{GrayImage, Luma};

use crate::normalize::rescale_min_max;
use crate::types::{BinaryEdgeMap, EdgeMagnitudeMap, OutputImage, ThresholdPolicy};

/// The `percentile`-th percentile of all magnitudes.
///
/// Uses linear interpolation between the two nearest order statistics:
/// with `n` sorted values the rank is `percentile / 100 * (n - 1)`.
/// `percentile` is clamped to `[0, 100]`; NaN is treated as 0.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(map: &EdgeMagnitudeMap, percentile: f64) -> f64 {
    let mut sorted: Vec<f64> = map.view().iter().copied().collect();
    sorted.sort_unstable_by(f64::total_cmp);

    let p = if percentile.is_nan() {
        0.0
    } else {
        percentile.clamp(0.0, 100.0)
    };
    let last = sorted.len().saturating_sub(1);
    let rank = p / 100.0 * last as f64;
    let lo = (rank.floor() as usize).min(last);
    let hi = (rank.ceil() as usize).min(last);
    let (Some(&low), Some(&high)) = (sorted.get(lo), sorted.get(hi)) else {
        return 0.0;
    };
    let fraction = rank - rank.floor();
    (high - low).mul_add(fraction, low)
}

/// Mark every pixel whose magnitude is strictly above `threshold`.
#[must_use = "returns the binary edge map"]
#[allow(clippy::cast_possible_truncation)]
pub fn binarize(map: &EdgeMagnitudeMap, threshold: f64) -> BinaryEdgeMap {
    let values = map.view();
    let image = GrayImage::from_fn(map.width() as u32, map.height() as u32, |x, y| {
        if values[[y as usize, x as usize]] > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    BinaryEdgeMap::from_valid(image)
}

/// Produce the output raster for `policy`.
#[must_use = "returns the output image"]
pub fn apply(map: &EdgeMagnitudeMap, policy: ThresholdPolicy) -> OutputImage {
    let threshold = match policy {
        ThresholdPolicy::Percentile { percentile: p } => percentile(map, p),
        ThresholdPolicy::Fixed { threshold } => threshold,
        ThresholdPolicy::Rescale => return OutputImage::Rescaled(rescale_min_max(map)),
    };
    tracing::debug!(policy = policy.name(), threshold, "binarizing edge map");
    OutputImage::Binary {
        edges: binarize(map, threshold),
        threshold,
    }
}
