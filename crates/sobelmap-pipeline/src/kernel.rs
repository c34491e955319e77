//! Fixed 3x3 directional derivative kernels.
//!
//! The two kernels are a transposed pair. Their sign convention is kept
//! exactly as written below; flipping it mirrors the gradient direction
//! but leaves the magnitude unchanged.

/// A 3x3 integer convolution kernel in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel3([[i32; 3]; 3]);

/// Horizontal kernel: responds to intensity change between the row
/// above and the row below.
///
/// ```text
/// -1 -2 -1
///  0  0  0
///  1  2  1
/// ```
pub const HORIZONTAL: Kernel3 = Kernel3([[-1, -2, -1], [0, 0, 0], [1, 2, 1]]);

/// Vertical kernel: responds to intensity change between the column to
/// the left and the column to the right.
///
/// ```text
///  1  0 -1
///  2  0 -2
///  1  0 -1
/// ```
pub const VERTICAL: Kernel3 = Kernel3([[1, 0, -1], [2, 0, -2], [1, 0, -1]]);

// A constant field must produce zero gradient.
const _: () = assert!(HORIZONTAL.sum() == 0);
const _: () = assert!(VERTICAL.sum() == 0);

impl Kernel3 {
    /// Build a kernel from row-major coefficients.
    #[must_use]
    pub const fn new(coefficients: [[i32; 3]; 3]) -> Self {
        Self(coefficients)
    }

    /// Row-major coefficients.
    #[must_use]
    pub const fn coefficients(&self) -> &[[i32; 3]; 3] {
        &self.0
    }

    /// Sum of all coefficients.
    #[must_use]
    pub const fn sum(&self) -> i32 {
        let mut total = 0;
        let mut r = 0;
        while r < 3 {
            let mut c = 0;
            while c < 3 {
                total += self.0[r][c];
                c += 1;
            }
            r += 1;
        }
        total
    }
}
