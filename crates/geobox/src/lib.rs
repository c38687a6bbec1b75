#![warn(clippy::unwrap_used)]

//! Read and write GeoTIFF rasters against a canonical output grid.
//!
//! The helpers in [`io`] cover the common test scenarios: writing an in-memory array to a
//! georeferenced file, reading it back as-is and reading it reprojected onto a [`GeoBox`].
//! All raster work is delegated to a [`RasterBackend`], GDAL by default.

pub use inf::{Error, Result};

#[macro_use]
mod anyarray_macros;
mod anyarray;
mod arraydatatype;
mod arraynum;
pub mod backend;
pub mod crs;
mod geobox;
mod geotransform;
pub mod io;
mod rastermeta;
mod resampling;
mod runtimeconfiguration;
pub mod srs;
#[cfg(test)]
mod testutils;
mod writeprofile;

#[doc(inline)]
pub use anyarray::AnyArray;
#[doc(inline)]
pub use arraydatatype::ArrayDataType;
#[doc(inline)]
pub use arraynum::ArrayNum;
#[doc(inline)]
pub use backend::{GdalBackend, RasterBackend, RasterDataset};
#[doc(inline)]
pub use crs::Crs;
#[doc(inline)]
pub use geobox::GeoBox;
#[doc(inline)]
pub use geotransform::GeoTransform;
#[doc(inline)]
pub use io::{ReadOptions, ReprojectOptions, SlurpTarget, WriteOptions, read, slurp, slurp_read, slurp_reproject, write};
#[doc(inline)]
pub use rastermeta::{RasterMeta, RasterProfile, geobox_from_profile};
#[doc(inline)]
pub use resampling::Resampling;
pub use runtimeconfiguration::RuntimeConfiguration;
#[doc(inline)]
pub use writeprofile::{WriteProfile, tile_size};
