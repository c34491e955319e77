//! Same-size 2-D convolution with zero-fill boundaries.
//!
//! This is true convolution (the kernel is rotated by 180 degrees before
//! sliding), so for a 3x3 kernel `k`:
//!
//! ```text
//! out[r][c] = sum over a, b in 0..3 of k[a][b] * in[r + 1 - a][c + 1 - b]
//! ```
//!
//! Samples outside the input are zero. Border pixels therefore see a
//! dark frame around the image rather than a replicated or reflected
//! edge, which changes their values materially.

use ndarray::{Array2, ArrayView2};

use crate::kernel::Kernel3;

/// Convolve `input` with `kernel`, returning an array of the same shape.
#[must_use = "returns the convolved map"]
pub fn convolve_same_zero(input: ArrayView2<'_, f64>, kernel: &Kernel3) -> Array2<f64> {
    let (rows, cols) = input.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let mut acc = 0.0;
        for (a, kernel_row) in kernel.coefficients().iter().enumerate() {
            let Some(sr) = (r + 1).checked_sub(a).filter(|&sr| sr < rows) else {
                continue;
            };
            for (b, &k) in kernel_row.iter().enumerate() {
                if k == 0 {
                    continue;
                }
                let Some(sc) = (c + 1).checked_sub(b).filter(|&sc| sc < cols) else {
                    continue;
                };
                acc += f64::from(k) * input[[sr, sc]];
            }
        }
        acc
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kernel::{HORIZONTAL, VERTICAL};

    #[test]
    fn zero_input_gives_zero_output() {
        for (rows, cols) in [(1, 1), (2, 3), (7, 5)] {
            let input = Array2::<f64>::zeros((rows, cols));
            for kernel in [HORIZONTAL, VERTICAL] {
                let out = convolve_same_zero(input.view(), &kernel);
                assert_eq!(out.dim(), (rows, cols));
                assert!(out.iter().all(|&v| v == 0.0));
            }
        }
    }

    #[test]
    fn impulse_response_is_the_kernel() {
        // Convolving a unit impulse reproduces the kernel unflipped
        // around the impulse position.
        let mut input = Array2::<f64>::zeros((5, 5));
        input[[2, 2]] = 1.0;
        let kernel = Kernel3::new([[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
        let out = convolve_same_zero(input.view(), &kernel);
        for a in 0..3 {
            for b in 0..3 {
                let expected = f64::from(kernel.coefficients()[a][b]);
                assert!((out[[1 + a, 1 + b]] - expected).abs() < 1e-12);
            }
        }
        assert!(out[[0, 0]].abs() < 1e-12);
    }

    #[test]
    fn constant_input_is_zero_in_the_interior() {
        let input = Array2::<f64>::from_elem((6, 6), 42.0);
        for kernel in [HORIZONTAL, VERTICAL] {
            let out = convolve_same_zero(input.view(), &kernel);
            for r in 1..5 {
                for c in 1..5 {
                    assert!(out[[r, c]].abs() < 1e-12, "({r},{c}) = {}", out[[r, c]]);
                }
            }
        }
    }

    #[test]
    fn zero_fill_border_values() {
        // Against a uniform field of 1.0 the horizontal kernel sees the
        // missing row above the top edge: the lower row (weight -1 -2 -1
        // after the flip) is present and the upper one is zero.
        let input = Array2::<f64>::from_elem((4, 4), 1.0);
        let out = convolve_same_zero(input.view(), &HORIZONTAL);
        assert!((out[[0, 1]] - -4.0).abs() < 1e-12);
        assert!((out[[3, 1]] - 4.0).abs() < 1e-12);
        // Corners also lose one column of taps.
        assert!((out[[0, 0]] - -3.0).abs() < 1e-12);
    }

    #[test]
    fn single_pixel_uses_only_the_centre_tap() {
        let input = Array2::<f64>::from_elem((1, 1), 200.0);
        let kernel = Kernel3::new([[9, 9, 9], [9, 2, 9], [9, 9, 9]]);
        let out = convolve_same_zero(input.view(), &kernel);
        assert!((out[[0, 0]] - 400.0).abs() < 1e-12);
    }
}
