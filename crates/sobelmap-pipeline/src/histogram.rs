//! Edge magnitude histogram for threshold selection.
//!
//! Bins are equal-width over `[min, max]` of the magnitude map; the last
//! bin is closed on the right so the maximum is counted. A constant map
//! gets a unit-wide range centred on its value.

use serde::{Deserialize, Serialize};

use crate::types::EdgeMagnitudeMap;

/// Counts of edge magnitudes in equal-width bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Lower edge of the first bin.
    pub lower: f64,
    /// Upper edge of the last bin.
    pub upper: f64,
    /// Pixel count per bin.
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Default number of bins.
    pub const DEFAULT_BINS: usize = 256;

    /// Bin the magnitudes of `map` into `bins` equal-width bins.
    ///
    /// `bins` of zero is treated as one.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_magnitudes(map: &EdgeMagnitudeMap, bins: usize) -> Self {
        let bins = bins.max(1);
        let (min, max) = map.min_max();
        let (lower, upper) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };
        let scale = bins as f64 / (upper - lower);

        let mut counts = vec![0_u64; bins];
        for &value in map.view() {
            let index = (((value - lower) * scale).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }

        Self {
            lower,
            upper,
            counts,
        }
    }

    /// Width of a single bin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.counts.len().max(1) as f64
    }

    /// `(lower, upper)` edges of bin `index`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bin_edges(&self, index: usize) -> (f64, f64) {
        let width = self.bin_width();
        let start = (index as f64).mul_add(width, self.lower);
        (start, start + width)
    }

    /// Total number of counted pixels.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Render as a compact text bar chart with at most `rows` lines,
    /// merging neighbouring bins as needed.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn render(&self, rows: usize, bar_width: usize) -> String {
        let rows = rows.clamp(1, self.counts.len().max(1));
        let per_row = self.counts.len().div_ceil(rows);
        let merged: Vec<(usize, u64)> = self
            .counts
            .chunks(per_row.max(1))
            .enumerate()
            .map(|(i, chunk)| (i * per_row, chunk.iter().sum()))
            .collect();
        let peak = merged.iter().map(|&(_, c)| c).max().unwrap_or(0).max(1);

        let mut lines = Vec::with_capacity(merged.len());
        for (first_bin, count) in merged {
            let (start, _) = self.bin_edges(first_bin);
            let len = (count as f64 / peak as f64 * bar_width as f64).round() as usize;
            lines.push(format!("{start:>10.1} | {:<bar_width$} {count}", "#".repeat(len)));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ndarray::Array2;

    use super::*;

    fn map_from(values: Vec<f64>) -> EdgeMagnitudeMap {
        let n = values.len();
        EdgeMagnitudeMap::from_array(Array2::from_shape_vec((1, n), values).unwrap()).unwrap()
    }

    #[test]
    fn counts_every_pixel() {
        let map = map_from((0..50).map(f64::from).collect());
        let hist = Histogram::from_magnitudes(&map, Histogram::DEFAULT_BINS);
        assert_eq!(hist.counts.len(), 256);
        assert_eq!(hist.total(), 50);
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let map = map_from(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let hist = Histogram::from_magnitudes(&map, 4);
        assert_eq!(hist.counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn constant_map_uses_unit_range() {
        let map = map_from(vec![5.0; 8]);
        let hist = Histogram::from_magnitudes(&map, 10);
        assert!((hist.lower - 4.5).abs() < 1e-12);
        assert!((hist.upper - 5.5).abs() < 1e-12);
        assert_eq!(hist.counts[5], 8);
        assert_eq!(hist.total(), 8);
    }

    #[test]
    fn zero_bins_becomes_one() {
        let map = map_from(vec![1.0, 2.0]);
        let hist = Histogram::from_magnitudes(&map, 0);
        assert_eq!(hist.counts, vec![2]);
    }

    #[test]
    fn bin_edges_are_contiguous() {
        let map = map_from(vec![0.0, 100.0]);
        let hist = Histogram::from_magnitudes(&map, 4);
        assert!((hist.bin_width() - 25.0).abs() < 1e-12);
        let (a0, a1) = hist.bin_edges(1);
        let (b0, _) = hist.bin_edges(2);
        assert!((a0 - 25.0).abs() < 1e-12);
        assert!((a1 - b0).abs() < 1e-12);
    }

    #[test]
    fn render_limits_rows() {
        let map = map_from((0..100).map(f64::from).collect());
        let hist = Histogram::from_magnitudes(&map, 256);
        let text = hist.render(16, 20);
        assert_eq!(text.lines().count(), 16);
        assert!(text.contains('#'));
    }

    #[test]
    fn serializes_to_json() {
        let map = map_from(vec![0.0, 1.0]);
        let hist = Histogram::from_magnitudes(&map, 2);
        let json = serde_json::to_string(&hist).unwrap();
        let back: Histogram = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hist);
    }
}
