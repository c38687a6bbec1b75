//! Read and write helpers for raster files.
//!
//! Every function comes in two flavours: the plain one uses the [`GdalBackend`],
//! the `_with` variant takes the backend to use as first argument.

use std::path::Path;

use ndarray::{Array2, ArrayD};

use crate::{
    AnyArray, ArrayDataType, ArrayNum, Crs, Error, GdalBackend, GeoBox, GeoTransform, RasterBackend, RasterDataset, RasterMeta,
    Resampling, Result, WriteProfile,
    backend::ReprojectParams,
    rastermeta::geobox_from_profile,
    tile_size,
};

/// Fill value used when neither the caller nor the file provide a nodata value.
/// Note that this can alias valid pixel values.
const FALLBACK_NODATA: f64 = 0.0;

/// Options for reading a single band onto a grid
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct ReadOptions {
    /// 1-based band index
    #[builder(default = 1)]
    pub band: usize,
    /// Output grid, defaults to the grid of the file
    pub gbox: Option<GeoBox>,
    #[builder(default)]
    pub resampling: Resampling,
    /// Output data type, defaults to the data type of the band
    pub dtype: Option<ArrayDataType>,
    pub dst_nodata: Option<f64>,
    /// Source nodata value for files that do not declare one
    pub fallback_nodata: Option<f64>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Options for reading a file reprojected onto a grid
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct ReprojectOptions {
    #[builder(default)]
    pub resampling: Resampling,
    pub dtype: Option<ArrayDataType>,
    pub dst_nodata: Option<f64>,
    /// Extra `KEY=VALUE` options passed to the warper
    #[builder(default)]
    pub warp_options: Vec<(String, String)>,
}

impl Default for ReprojectOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Options for writing an array to a GeoTIFF file
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct WriteOptions {
    #[builder(default = Crs::Epsg(3857), into)]
    pub crs: Crs,
    /// Pixel size `(x, y)`, `y` is negative for north up rasters
    #[builder(default = (10.0, -10.0))]
    pub resolution: (f64, f64),
    /// World coordinate of the top left corner
    #[builder(default = (0.0, 0.0))]
    pub offset: (f64, f64),
    /// Set on every band
    pub nodata: Option<f64>,
    /// Replace an existing file instead of failing
    #[builder(default)]
    pub overwrite: bool,
    /// Write a tiled file with blocks of at most this size
    pub blocksize: Option<usize>,
    /// Overrides for the raster properties or driver creation options, keys are case insensitive
    #[builder(default)]
    pub extra: Vec<(String, String)>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WriteOptions {
    /// Builds the profile for writing the pixels with these options.
    /// Only 2-D `(height, width)` and 3-D `(bands, height, width)` arrays can be written.
    pub fn write_profile(&self, pixels: &AnyArray) -> Result<WriteProfile> {
        let (count, height, width) = match *pixels.shape() {
            [height, width] => (1, height, width),
            [count, height, width] => (count, height, width),
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "Need 2d or 3d array on input, got {}d",
                    pixels.ndim()
                )));
            }
        };

        let (res_x, res_y) = self.resolution;
        let (offset_x, offset_y) = self.offset;

        let mut profile = WriteProfile::new(width, height, count, pixels.data_type());
        profile.crs = Some(self.crs.clone());
        profile.transform = Some(GeoTransform::from_affine(res_x, 0.0, offset_x, 0.0, res_y, offset_y));
        profile.nodata = self.nodata;
        profile.set_creation_option("COMPRESS", "DEFLATE");
        profile.set_creation_option("PREDICTOR", "2");

        if let Some(blocksize) = self.blocksize {
            if blocksize == 0 {
                return Err(Error::InvalidArgument("Block size must be positive".to_string()));
            }

            let (block_x, block_y) = tile_size(blocksize, width, height);
            profile.set_creation_option("TILED", "YES");
            profile.set_creation_option("BLOCKXSIZE", block_x.to_string());
            profile.set_creation_option("BLOCKYSIZE", block_y.to_string());
        }

        for (key, value) in &self.extra {
            profile.apply_option(key, value)?;
        }

        profile.validate(pixels)?;
        Ok(profile)
    }
}

/// What [`slurp`] should produce
#[derive(Debug, Clone, PartialEq)]
pub enum SlurpTarget {
    /// The file as stored
    Native,
    /// The file resampled to `(height, width)`
    Shape((usize, usize)),
    /// The first band reprojected onto the grid
    Grid(GeoBox, ReprojectOptions),
}

impl SlurpTarget {
    fn out_shape(&self) -> Option<(usize, usize)> {
        match self {
            SlurpTarget::Shape(shape) => Some(*shape),
            _ => None,
        }
    }
}

impl From<GeoBox> for SlurpTarget {
    fn from(gbox: GeoBox) -> Self {
        SlurpTarget::Grid(gbox, ReprojectOptions::default())
    }
}

impl From<(GeoBox, ReprojectOptions)> for SlurpTarget {
    fn from((gbox, options): (GeoBox, ReprojectOptions)) -> Self {
        SlurpTarget::Grid(gbox, options)
    }
}

impl From<(usize, usize)> for SlurpTarget {
    fn from(shape: (usize, usize)) -> Self {
        SlurpTarget::Shape(shape)
    }
}

impl From<Option<(usize, usize)>> for SlurpTarget {
    fn from(shape: Option<(usize, usize)>) -> Self {
        shape.map_or(SlurpTarget::Native, SlurpTarget::Shape)
    }
}

/// Reads a single band onto a grid, see [`ReadOptions`] for the defaults
pub fn read(path: impl AsRef<Path>, options: &ReadOptions) -> Result<AnyArray> {
    read_with(&GdalBackend, path, options)
}

pub fn read_with<B: RasterBackend>(backend: &B, path: impl AsRef<Path>, options: &ReadOptions) -> Result<AnyArray> {
    let path = path.as_ref();
    let ds = backend.open(path)?;
    let profile = ds.profile()?;

    let gbox = match &options.gbox {
        Some(gbox) => gbox.clone(),
        None => geobox_from_profile(&profile)?
            .ok_or_else(|| Error::InvalidArgument(format!("{} is not georeferenced, provide a grid", path.display())))?,
    };

    let band = ds.band_info(options.band)?;
    let src_nodata = band.nodata.or(options.fallback_nodata);
    let dst_nodata = options.dst_nodata.or(src_nodata).unwrap_or(FALLBACK_NODATA);
    let dtype = options.dtype.unwrap_or(band.dtype);

    reproject_new(
        &ds,
        dtype,
        &ReprojectParams {
            band: options.band,
            dst_gbox: &gbox,
            src_nodata,
            dst_nodata,
            resampling: options.resampling,
            warp_options: &[],
        },
    )
}

/// Writes a 2-D or 3-D array to a GeoTIFF file.
///
/// Fails with [`Error::FileExists`] when the file exists and `overwrite` is not set,
/// the existing file is left untouched in that case.
pub fn write(path: impl AsRef<Path>, pixels: impl Into<AnyArray>, options: &WriteOptions) -> Result<RasterMeta> {
    write_with(&GdalBackend, path, pixels, options)
}

pub fn write_with<B: RasterBackend>(
    backend: &B,
    path: impl AsRef<Path>,
    pixels: impl Into<AnyArray>,
    options: &WriteOptions,
) -> Result<RasterMeta> {
    let path = path.as_ref();
    let pixels = pixels.into();
    let profile = options.write_profile(&pixels)?;

    // The data type can be overridden in the options
    let pixels = if pixels.data_type() != profile.dtype {
        pixels.cast(profile.dtype)?
    } else {
        pixels
    };

    inf::fs::clear_output_path(path, options.overwrite)?;

    log::debug!(
        "Write {:?} {} array to {} (nodata {:?})",
        pixels.shape(),
        profile.dtype,
        path.display(),
        profile.nodata
    );

    let written = backend.create(path, &profile, &pixels)?;
    RasterMeta::from_profile(written, path)
}

/// Reads the complete file, a single band file gives a 2-D array, otherwise all bands are stacked in a 3-D array.
/// When `out_shape` is provided the bands are resampled to that `(height, width)`.
pub fn slurp_read(path: impl AsRef<Path>, out_shape: Option<(usize, usize)>) -> Result<(AnyArray, RasterMeta)> {
    slurp_read_with(&GdalBackend, path, out_shape)
}

pub fn slurp_read_with<B: RasterBackend>(
    backend: &B,
    path: impl AsRef<Path>,
    out_shape: Option<(usize, usize)>,
) -> Result<(AnyArray, RasterMeta)> {
    let path = path.as_ref();
    let ds = backend.open(path)?;
    let profile = ds.profile()?;

    let bands: Vec<usize> = (1..=profile.count).collect();
    let pixels = dispatch_datatype!(profile.dtype, T, ds.read::<T>(&bands, out_shape)?);

    Ok((pixels, RasterMeta::from_profile(profile, path)?))
}

/// Reads the first band reprojected onto `gbox`.
///
/// Pixels outside of the source footprint are set to the destination nodata value:
/// `options.dst_nodata`, the nodata value of the file or 0.
/// The returned metadata contains the grid of the file as `src_gbox` and the requested grid as `gbox`.
pub fn slurp_reproject(path: impl AsRef<Path>, gbox: &GeoBox, options: &ReprojectOptions) -> Result<(AnyArray, RasterMeta)> {
    slurp_reproject_with(&GdalBackend, path, gbox, options)
}

pub fn slurp_reproject_with<B: RasterBackend>(
    backend: &B,
    path: impl AsRef<Path>,
    gbox: &GeoBox,
    options: &ReprojectOptions,
) -> Result<(AnyArray, RasterMeta)> {
    let path = path.as_ref();
    let ds = backend.open(path)?;
    let profile = ds.profile()?;

    let src_nodata = profile.nodata;
    let dst_nodata = options.dst_nodata.or(src_nodata).unwrap_or(FALLBACK_NODATA);
    let dtype = options.dtype.unwrap_or(profile.dtype);

    let pixels = reproject_new(
        &ds,
        dtype,
        &ReprojectParams {
            band: 1,
            dst_gbox: gbox,
            src_nodata,
            dst_nodata,
            resampling: options.resampling,
            warp_options: &options.warp_options,
        },
    )?;

    let mut meta = RasterMeta::from_profile(profile, path)?;
    meta.src_gbox = meta.gbox.take();
    meta.gbox = Some(gbox.clone());

    Ok((pixels, meta))
}

/// Reads the file reprojected when the target is a grid, as stored otherwise
pub fn slurp(path: impl AsRef<Path>, target: impl Into<SlurpTarget>) -> Result<(AnyArray, RasterMeta)> {
    slurp_with(&GdalBackend, path, target)
}

pub fn slurp_with<B: RasterBackend>(
    backend: &B,
    path: impl AsRef<Path>,
    target: impl Into<SlurpTarget>,
) -> Result<(AnyArray, RasterMeta)> {
    match target.into() {
        SlurpTarget::Grid(gbox, options) => slurp_reproject_with(backend, path, &gbox, &options),
        other => slurp_read_with(backend, path, other.out_shape()),
    }
}

/// Allocates the destination array pre-filled with the destination nodata and warps the band into it
fn reproject_new<D: RasterDataset>(ds: &D, dtype: ArrayDataType, params: &ReprojectParams) -> Result<AnyArray> {
    if !dtype.fits(params.dst_nodata) {
        return Err(Error::InvalidArgument(format!(
            "Nodata value {} does not fit in data type {dtype}",
            params.dst_nodata
        )));
    }

    log::debug!(
        "Reproject band {} as {dtype} onto {} (nodata {})",
        params.band,
        params.dst_gbox,
        params.dst_nodata
    );

    Ok(dispatch_datatype!(dtype, T, reproject_into::<D, T>(ds, params)?))
}

fn reproject_into<D: RasterDataset, T: ArrayNum>(ds: &D, params: &ReprojectParams) -> Result<ArrayD<T>> {
    let fill: T = num::NumCast::from(params.dst_nodata)
        .ok_or_else(|| Error::InvalidArgument(format!("Invalid nodata value: {}", params.dst_nodata)))?;

    let mut dst = Array2::from_elem(params.dst_gbox.shape(), fill);
    ds.reproject_band(&mut dst, params)?;
    Ok(dst.into_dyn())
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array3, Array4};

    use super::*;
    use crate::testutils;

    #[test]
    fn write_profile_defaults() {
        let pixels: AnyArray = testutils::ramp::<u8>(20, 30).into();
        let profile = WriteOptions::default().write_profile(&pixels).unwrap();

        assert_eq!(profile.driver, "GTiff");
        assert_eq!((profile.width, profile.height, profile.count), (30, 20, 1));
        assert_eq!(profile.dtype, ArrayDataType::Uint8);
        assert_eq!(profile.crs, Some(Crs::Epsg(3857)));
        assert_eq!(profile.transform, Some(GeoTransform::from_affine(10.0, 0.0, 0.0, 0.0, -10.0, 0.0)));
        assert_eq!(profile.nodata, None);
        assert_eq!(profile.creation_option("compress"), Some("DEFLATE"));
        assert_eq!(profile.creation_option("predictor"), Some("2"));
        assert_eq!(profile.creation_option("tiled"), None);
    }

    #[test]
    fn write_profile_tiling() {
        let pixels: AnyArray = testutils::ramp::<u8>(300, 100).into();
        let options = WriteOptions::builder().blocksize(512).build();
        let profile = options.write_profile(&pixels).unwrap();

        assert_eq!(profile.creation_option("TILED"), Some("YES"));
        assert_eq!(profile.creation_option("BLOCKXSIZE"), Some("100"));
        assert_eq!(profile.creation_option("BLOCKYSIZE"), Some("300"));
    }

    #[test]
    fn write_profile_overrides() {
        let pixels: AnyArray = Array3::<f32>::zeros((2, 16, 32)).into();
        let options = WriteOptions::builder()
            .crs(Crs::Epsg(31370))
            .resolution((5.0, -5.0))
            .offset((100.0, 200.0))
            .nodata(-1.0)
            .blocksize(16)
            .extra(vec![
                ("Compress".to_string(), "LZW".to_string()),
                ("blockxsize".to_string(), "32".to_string()),
                ("NODATA".to_string(), "-9999".to_string()),
            ])
            .build();

        let profile = options.write_profile(&pixels).unwrap();
        assert_eq!(profile.count, 2);
        assert_eq!(profile.crs, Some(Crs::Epsg(31370)));
        assert_eq!(profile.transform, Some(GeoTransform::from_affine(5.0, 0.0, 100.0, 0.0, -5.0, 200.0)));
        assert_eq!(profile.nodata, Some(-9999.0));
        assert_eq!(profile.creation_option("COMPRESS"), Some("LZW"));
        assert_eq!(profile.creation_option("BLOCKXSIZE"), Some("32"));
        assert_eq!(profile.creation_option("BLOCKYSIZE"), Some("16"));
    }

    #[test]
    fn write_profile_rejects_dimensions() {
        let options = WriteOptions::default();

        let one_d: AnyArray = Array1::<u8>::zeros(10).into();
        assert!(matches!(options.write_profile(&one_d), Err(Error::InvalidArgument(_))));

        let four_d: AnyArray = Array4::<u8>::zeros((1, 2, 3, 4)).into();
        assert!(matches!(options.write_profile(&four_d), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn write_profile_rejects_zero_block_size() {
        let pixels: AnyArray = testutils::ramp::<u8>(16, 16).into();
        let options = WriteOptions::builder().blocksize(0).build();
        assert!(matches!(options.write_profile(&pixels), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn slurp_target_conversions() {
        let gbox = testutils::web_mercator_gbox(10, 10);
        assert_eq!(SlurpTarget::from(None::<(usize, usize)>), SlurpTarget::Native);
        assert_eq!(SlurpTarget::from((3_usize, 4_usize)), SlurpTarget::Shape((3, 4)));
        assert_eq!(SlurpTarget::from(Some((3_usize, 4_usize))).out_shape(), Some((3, 4)));
        assert_eq!(
            SlurpTarget::from(gbox.clone()),
            SlurpTarget::Grid(gbox, ReprojectOptions::default())
        );
    }

    #[test]
    fn option_defaults() {
        let read = ReadOptions::default();
        assert_eq!(read.band, 1);
        assert_eq!(read.resampling, Resampling::Nearest);
        assert!(read.gbox.is_none() && read.dtype.is_none() && read.dst_nodata.is_none() && read.fallback_nodata.is_none());

        let write = WriteOptions::default();
        assert_eq!(write.crs.to_string(), "epsg:3857");
        assert_eq!(write.resolution, (10.0, -10.0));
        assert_eq!(write.offset, (0.0, 0.0));
        assert!(!write.overwrite);
        assert!(write.blocksize.is_none());
    }
}
