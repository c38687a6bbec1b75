use std::fmt::Debug;

use approx::{AbsDiffEq, RelativeEq};

use crate::{Error, Result};

/// Affine pixel to world transformation, stored in GDAL coefficient order.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct GeoTransform([f64; 6]);

impl GeoTransform {
    /// Creates a transform from the row-major affine matrix `[a b c; d e f]`
    /// where `x = a * col + b * row + c` and `y = d * col + e * row + f`.
    pub const fn from_affine(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        GeoTransform([c, a, b, f, d, e])
    }

    /// The row-major affine coefficients `(a, b, c, d, e, f)`
    pub fn to_affine(&self) -> [f64; 6] {
        [self.0[1], self.0[2], self.0[0], self.0[4], self.0[5], self.0[3]]
    }

    /// Translates a pixel position to world coordinates.
    /// Position (0, 0) is the top left corner of the top left pixel.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.0[0] + self.0[1] * col + self.0[2] * row;
        let y = self.0[3] + self.0[4] * col + self.0[5] * row;
        (x, y)
    }

    /// The horizontal cell size
    pub fn cell_size_x(&self) -> f64 {
        self.0[1]
    }

    /// The vertical cell size, negative for north up rasters
    pub fn cell_size_y(&self) -> f64 {
        self.0[5]
    }

    pub fn is_north_up(&self) -> bool {
        self.0[2] == 0.0 && self.0[4] == 0.0
    }

    pub fn coefficients(&self) -> [f64; 6] {
        self.0
    }

    pub fn invert(&self) -> Result<Self> {
        let gt_in = &self.0;

        if self.is_north_up() && gt_in[1] != 0.0 && gt_in[5] != 0.0 {
            // No rotation, avoid the determinant and its precision loss
            return Ok(GeoTransform([
                -gt_in[0] / gt_in[1],
                1.0 / gt_in[1],
                0.0,
                -gt_in[3] / gt_in[5],
                0.0,
                1.0 / gt_in[5],
            ]));
        }

        let det = gt_in[1] * gt_in[5] - gt_in[2] * gt_in[4];
        let magnitude = f64::max(f64::max(gt_in[1].abs(), gt_in[2].abs()), f64::max(gt_in[4].abs(), gt_in[5].abs()));

        if det.abs() <= 1e-10 * magnitude * magnitude {
            return Err(Error::Runtime("GeoTransform is not invertible".to_string()));
        }

        let inv_det = 1.0 / det;
        Ok(GeoTransform([
            (gt_in[2] * gt_in[3] - gt_in[0] * gt_in[5]) * inv_det,
            gt_in[5] * inv_det,
            -gt_in[2] * inv_det,
            (-gt_in[1] * gt_in[3] + gt_in[0] * gt_in[4]) * inv_det,
            -gt_in[4] * inv_det,
            gt_in[1] * inv_det,
        ]))
    }
}

impl From<[f64; 6]> for GeoTransform {
    fn from(coefficients: [f64; 6]) -> Self {
        GeoTransform(coefficients)
    }
}

impl Debug for GeoTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, f_] = self.to_affine();
        write!(f, "GeoTransform([{a}, {b}, {c}; {d}, {e}, {f_}])")
    }
}

impl AbsDiffEq for GeoTransform {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.0.abs_diff_eq(&other.0, epsilon)
    }
}

impl RelativeEq for GeoTransform {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.0.relative_eq(&other.0, epsilon, max_relative)
    }
}
