//! Min-max rescaling of edge magnitudes to 8 bits.
//!
//! The alternative to binarization: the full magnitude range is mapped
//! linearly onto `[0, 255]`.
//!
//! ```text
//! out = round((m - min) / (max - min) * 255)
//! ```
//!
//! A constant map has no range to stretch and rescales to all zeros.

use image::{GrayImage, Luma};

use crate::types::EdgeMagnitudeMap;

/// Linearly map `[min, max]` of `map` onto `[0, 255]`.
#[must_use = "returns the rescaled image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rescale_min_max(map: &EdgeMagnitudeMap) -> GrayImage {
    let (min, max) = map.min_max();
    let range = max - min;
    let values = map.view();
    GrayImage::from_fn(map.width() as u32, map.height() as u32, |x, y| {
        if range <= 0.0 {
            return Luma([0]);
        }
        let scaled = (values[[y as usize, x as usize]] - min) / range * 255.0;
        Luma([scaled.round().clamp(0.0, 255.0) as u8])
    })
}
