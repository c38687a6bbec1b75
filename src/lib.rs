//! Raster test helpers: write arrays to GeoTIFF files and read them back,
//! either as stored or reprojected onto a [`GeoBox`].

#[doc(inline)]
pub use geobox::*;

pub use inf;
