//! Grayscale reduction by unweighted channel mean.
//!
//! Intensity is the plain arithmetic mean of the three color channels,
//! `(R + G + B) / 3`, not a luminance-weighted formula. A pure red edge
//! and a pure blue edge of equal step size produce equal magnitudes.

use ndarray::{ArrayView3, Axis};

use crate::types::GrayscaleMap;

/// Average the channel axis of a `(height, width, channels)` array.
///
/// Callers validate the channel count before calling; see
/// [`crate::edge::detect_edges`].
#[must_use = "returns the grayscale map"]
#[allow(clippy::cast_precision_loss)]
pub fn channel_mean<T>(pixels: ArrayView3<'_, T>) -> GrayscaleMap
where
    T: Copy + Into<f64>,
{
    pixels.map_axis(Axis(2), |channels| {
        let sum: f64 = channels.iter().map(|&v| -> f64 { v.into() }).sum();
        sum / channels.len() as f64
    })
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;

    use super::*;

    #[test]
    fn output_drops_channel_axis() {
        let pixels = Array3::<u8>::zeros((5, 7, 3));
        let gray = channel_mean(pixels.view());
        assert_eq!(gray.dim(), (5, 7));
    }

    #[test]
    fn value_is_unweighted_mean() {
        let mut pixels = Array3::<u8>::zeros((1, 2, 3));
        pixels[[0, 0, 0]] = 255;
        pixels[[0, 1, 0]] = 30;
        pixels[[0, 1, 1]] = 60;
        pixels[[0, 1, 2]] = 90;
        let gray = channel_mean(pixels.view());
        assert!((gray[[0, 0]] - 85.0).abs() < 1e-12);
        assert!((gray[[0, 1]] - 60.0).abs() < 1e-12);
    }

    #[test]
    fn pure_primaries_have_equal_intensity() {
        // Unlike luminance, red, green and blue all map to 255 / 3.
        let mut pixels = Array3::<u8>::zeros((1, 3, 3));
        for c in 0..3 {
            pixels[[0, c, c]] = 255;
        }
        let gray = channel_mean(pixels.view());
        assert!((gray[[0, 0]] - gray[[0, 1]]).abs() < 1e-12);
        assert!((gray[[0, 1]] - gray[[0, 2]]).abs() < 1e-12);
    }

    #[test]
    fn mean_does_not_overflow_u8() {
        let pixels = Array3::<u8>::from_elem((2, 2, 3), 255);
        let gray = channel_mean(pixels.view());
        assert!(gray.iter().all(|&v| (v - 255.0).abs() < 1e-12));
    }

    #[test]
    fn wider_sample_types_are_accepted() {
        let pixels = Array3::<u16>::from_elem((2, 2, 3), 1000);
        let gray = channel_mean(pixels.view());
        assert!(gray.iter().all(|&v| (v - 1000.0).abs() < 1e-12));
    }

    #[test]
    fn uniform_gray_stays_uniform() {
        let pixels = Array3::<u8>::from_elem((10, 10, 3), 128);
        let gray = channel_mean(pixels.view());
        assert!(gray.iter().all(|&v| (v - 128.0).abs() < 1e-12));
    }
}
