//! Raster I/O backend abstraction.
//!
//! The read and write helpers only talk to a backend through these traits.
//! [`GdalBackend`] is the implementation used by the plain helper functions.

use std::path::Path;

use ndarray::{Array2, ArrayD};

use crate::{AnyArray, ArrayDataType, ArrayNum, GeoBox, RasterProfile, Resampling, Result, WriteProfile};

pub mod gdal;

pub use self::gdal::{GdalBackend, GdalDataset};

/// Element type and nodata value of a single band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandInfo {
    pub dtype: ArrayDataType,
    pub nodata: Option<f64>,
}

/// Warp settings for reprojecting a single band onto a destination grid
#[derive(Debug, Clone)]
pub struct ReprojectParams<'a> {
    /// 1-based band index in the source dataset
    pub band: usize,
    pub dst_gbox: &'a GeoBox,
    /// Source pixels with this value are ignored
    pub src_nodata: Option<f64>,
    pub dst_nodata: f64,
    pub resampling: Resampling,
    /// Additional `KEY=VALUE` warp options handed to the backend verbatim
    pub warp_options: &'a [(String, String)],
}

pub trait RasterBackend {
    type Dataset: RasterDataset;

    /// Opens an existing raster for reading
    fn open(&self, path: &Path) -> Result<Self::Dataset>;

    /// Creates the raster file described by the profile from the pixels and
    /// returns the profile of the file as it was written.
    fn create(&self, path: &Path, profile: &WriteProfile, pixels: &AnyArray) -> Result<RasterProfile>;
}

/// An opened raster, closed when dropped
pub trait RasterDataset {
    fn profile(&self) -> Result<RasterProfile>;

    /// Describes a single band (1-based), formats like VRT can have a different nodata per band
    fn band_info(&self, band: usize) -> Result<BandInfo>;

    /// Reads the requested bands (1-based).
    /// A single band gives a `(height, width)` array, multiple bands are stacked as `(bands, height, width)`.
    /// When `out_shape` is provided the bands are resampled to that `(height, width)` with nearest neighbour.
    fn read<T: ArrayNum>(&self, bands: &[usize], out_shape: Option<(usize, usize)>) -> Result<ArrayD<T>>;

    /// Warps a band into `dst`, which must have the shape of the destination grid.
    /// Pixels of `dst` that receive no source data keep their current value.
    fn reproject_band<T: ArrayNum>(&self, dst: &mut Array2<T>, params: &ReprojectParams) -> Result<()>;
}
