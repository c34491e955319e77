//! Median filtering for noise suppression before edge detection.
//!
//! Wraps [`imageproc::filter::median_filter`], which takes the median of
//! each channel independently over a square window. Salt-and-pepper
//! noise is removed while step edges survive, unlike a Gaussian blur
//! which smears them.
//!
//! The window is a flat square applied to each channel on its own. A
//! 3-D ball footprint (radius 3 spanning rows, columns and the channel
//! axis) would mix neighbouring channels into each median and round off
//! the window corners; this filter does neither, so results on
//! saturated color edges differ from a ball median.

use ndarray::Array3;

use crate::types::{CHANNELS, PixelArray};

/// Apply a per-channel median filter with a `(2 * radius + 1)` square
/// window.
///
/// A radius of zero returns the input unchanged. The output keeps the
/// [`PixelArray`] shape, so it is a valid input for
/// [`crate::edge::detect_edges`].
#[must_use = "returns the filtered image"]
pub fn median_filter(pixels: &PixelArray, radius: u32) -> PixelArray {
    if radius == 0 {
        return pixels.clone();
    }

    let filtered = imageproc::filter::median_filter(&pixels.to_rgb_image(), radius, radius);
    let (height, width) = (pixels.height() as usize, pixels.width() as usize);
    let array = Array3::from_shape_fn((height, width, CHANNELS), |(y, x, c)| {
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = (x as u32, y as u32);
        filtered.get_pixel(x, y).0[c]
    });
    PixelArray::from_valid(array)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pixels_from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> PixelArray {
        let img = image::RgbImage::from_fn(width, height, |x, y| image::Rgb(f(x, y)));
        PixelArray::from_rgb_image(&img).unwrap()
    }

    #[test]
    fn zero_radius_returns_identical_image() {
        let pixels = pixels_from_fn(5, 5, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let v = (x * 40 + y) as u8;
            [v, v, v]
        });
        assert_eq!(median_filter(&pixels, 0), pixels);
    }

    #[test]
    fn output_dimensions_preserved() {
        let pixels = pixels_from_fn(17, 31, |_, _| [1, 2, 3]);
        let filtered = median_filter(&pixels, 3);
        assert_eq!(filtered.width(), 17);
        assert_eq!(filtered.height(), 31);
        assert_eq!(filtered.view().dim(), (31, 17, 3));
    }

    #[test]
    fn uniform_image_unchanged() {
        let pixels = pixels_from_fn(10, 10, |_, _| [100, 150, 200]);
        assert_eq!(median_filter(&pixels, 3), pixels);
    }

    #[test]
    fn isolated_speck_is_removed() {
        let pixels = pixels_from_fn(9, 9, |x, y| {
            if (x, y) == (4, 4) {
                [255, 255, 255]
            } else {
                [0, 0, 0]
            }
        });
        let filtered = median_filter(&pixels, 1);
        assert!(filtered.view().iter().all(|&v| v == 0));
    }

    #[test]
    fn step_edge_survives() {
        let pixels = pixels_from_fn(10, 10, |x, _| if x < 5 { [0, 0, 0] } else { [255, 255, 255] });
        let filtered = median_filter(&pixels, 1);
        assert_eq!(filtered, pixels);
    }

    #[test]
    fn channels_are_filtered_independently() {
        // A single red speck on a blue field: red is removed, blue stays.
        let pixels = pixels_from_fn(7, 7, |x, y| {
            if (x, y) == (3, 3) {
                [255, 0, 200]
            } else {
                [0, 0, 200]
            }
        });
        let filtered = median_filter(&pixels, 1);
        let view = filtered.view();
        assert_eq!(
            [view[[3, 3, 0]], view[[3, 3, 1]], view[[3, 3, 2]]],
            [0, 0, 200]
        );
    }
}
