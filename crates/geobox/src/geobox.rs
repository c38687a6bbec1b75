use approx::{AbsDiffEq, RelativeEq};

use crate::{Crs, Error, GeoTransform, Result};

/// A georeferenced pixel grid: its size, pixel to world transform and coordinate reference system.
///
/// Immutable once constructed, the shape of an array allocated for the grid is `(height, width)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoBox {
    width: usize,
    height: usize,
    transform: GeoTransform,
    crs: Crs,
}

impl GeoBox {
    pub fn new(width: usize, height: usize, transform: GeoTransform, crs: Crs) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!("Invalid grid size: {width}x{height}")));
        }

        Ok(GeoBox {
            width,
            height,
            transform,
            crs,
        })
    }

    /// Grid with a north up transform built from the pixel size and the top left corner
    pub fn from_resolution(crs: Crs, resolution: (f64, f64), offset: (f64, f64), width: usize, height: usize) -> Result<Self> {
        let transform = GeoTransform::from_affine(resolution.0, 0.0, offset.0, 0.0, resolution.1, offset.1);
        Self::new(width, height, transform, crs)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn resolution(&self) -> (f64, f64) {
        (self.transform.cell_size_x(), self.transform.cell_size_y())
    }

    pub fn pixel_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        self.transform.apply(col, row)
    }

    /// World extent as `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let corners = [
            self.pixel_to_world(0.0, 0.0),
            self.pixel_to_world(self.width as f64, 0.0),
            self.pixel_to_world(0.0, self.height as f64),
            self.pixel_to_world(self.width as f64, self.height as f64),
        ];

        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)),
        )
    }
}

impl std::fmt::Display for GeoBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let crs = match &self.crs {
            Crs::Epsg(_) => self.crs.to_string(),
            Crs::Wkt(_) => "wkt".to_string(),
        };
        write!(f, "GeoBox({}x{}, {:?}, {crs})", self.width, self.height, self.transform)
    }
}

impl AbsDiffEq for GeoBox {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.shape() == other.shape() && self.crs == other.crs && self.transform.abs_diff_eq(&other.transform, epsilon)
    }
}

impl RelativeEq for GeoBox {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.shape() == other.shape() && self.crs == other.crs && self.transform.relative_eq(&other.transform, epsilon, max_relative)
    }
}
