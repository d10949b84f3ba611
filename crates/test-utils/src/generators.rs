//! Test data generators for staging tests.
//!
//! These generators create predictable, verifiable axes and fields. Fields
//! are affine in every coordinate, so linear interpolation must reproduce
//! them exactly at any interior point.

use ndarray::{Array1, Array2, Array3};

/// Creates an evenly spaced, strictly increasing axis.
///
/// # Arguments
///
/// * `start` - First coordinate
/// * `step` - Spacing, must be positive
/// * `len` - Number of points
///
/// # Example
///
/// ```
/// use test_utils::linear_axis;
///
/// let axis = linear_axis(-1.0, 0.5, 4);
/// assert_eq!(axis, vec![-1.0, -0.5, 0.0, 0.5]);
/// ```
pub fn linear_axis(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| start + step * i as f64).collect()
}

/// Creates a strictly increasing but unevenly spaced axis.
///
/// Spacing grows by `step` at every point: `start, start + step,
/// start + 3 step, start + 6 step, ...`
pub fn stretched_axis(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| start + step * (i * (i + 1) / 2) as f64)
        .collect()
}

/// Coefficients of the affine field `c0 + c1 x1 + c2 x2 + c3 x3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineField {
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl AffineField {
    /// Create an affine field.
    pub const fn new(c0: f64, c1: f64, c2: f64, c3: f64) -> Self {
        Self { c0, c1, c2, c3 }
    }

    /// Value at a point.
    pub fn at(&self, x1: f64, x2: f64, x3: f64) -> f64 {
        self.c0 + self.c1 * x1 + self.c2 * x2 + self.c3 * x3
    }

    /// Field scaled by a factor, e.g. to vary a frame in time.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.c0 * factor,
            self.c1 * factor,
            self.c2 * factor,
            self.c3 * factor,
        )
    }

    /// Samples along one axis; the other coordinates are zero.
    pub fn sample1(&self, axis: usize, coords: &[f64]) -> Array1<f64> {
        Array1::from_iter(coords.iter().map(|&x| match axis {
            0 => self.at(x, 0.0, 0.0),
            1 => self.at(0.0, x, 0.0),
            _ => self.at(0.0, 0.0, x),
        }))
    }

    /// Samples on the plaid lattice of two coordinate vectors, treating them
    /// as the `(x2, x3)` plane.
    pub fn sample2(&self, a: &[f64], b: &[f64]) -> Array2<f64> {
        Array2::from_shape_fn((a.len(), b.len()), |(i, j)| self.at(0.0, a[i], b[j]))
    }

    /// Samples on the plaid lattice of three coordinate vectors.
    pub fn sample3(&self, x1: &[f64], x2: &[f64], x3: &[f64]) -> Array3<f64> {
        Array3::from_shape_fn((x1.len(), x2.len(), x3.len()), |(i, j, k)| {
            self.at(x1[i], x2[j], x3[k])
        })
    }
}
