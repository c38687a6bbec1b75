use ndarray::Array2;

use crate::{ArrayNum, Crs, GeoBox};

/// Array where every value is `row * cols + col`, wrapped to the range of the element type
pub fn ramp<T: ArrayNum>(rows: usize, cols: usize) -> Array2<T> {
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let value = ((r * cols + c) % 200) as f64;
        num::NumCast::from(value).expect("Ramp value does not fit in the element type")
    })
}

/// Web mercator grid with 10m pixels and the top left corner at the origin
pub fn web_mercator_gbox(width: usize, height: usize) -> GeoBox {
    GeoBox::from_resolution(Crs::Epsg(3857), (10.0, -10.0), (0.0, 0.0), width, height).expect("Invalid test grid")
}
