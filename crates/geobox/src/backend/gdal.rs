use std::{
    ffi::{CString, c_double, c_int, c_void},
    path::{Path, PathBuf},
};

use gdal::{
    cpl::CslStringList,
    errors::GdalError,
    raster::{GdalDataType, GdalType, ResampleAlg},
};
use inf::gdalinterop::{FALSE, check_pointer, check_rc, create_string_list};
use ndarray::{Array2, ArrayD, IxDyn};

use crate::{
    AnyArray, ArrayDataType, ArrayNum, Error, GeoTransform, RasterProfile, Result, WriteProfile,
    backend::{BandInfo, RasterBackend, RasterDataset, ReprojectParams},
    srs::SpatialReference,
};

/// Raster backend on top of GDAL
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalBackend;

pub struct GdalDataset {
    ds: gdal::Dataset,
}

impl GdalDataset {
    pub fn from_dataset(ds: gdal::Dataset) -> Self {
        Self { ds }
    }

    fn check_band_index(&self, band: usize) -> Result<()> {
        let count = self.ds.raster_count();
        if band == 0 || band > count {
            return Err(Error::InvalidArgument(format!(
                "Invalid band index {band}, the raster has {count} band(s)"
            )));
        }

        Ok(())
    }
}

impl TryFrom<GdalDataType> for ArrayDataType {
    type Error = Error;

    fn try_from(value: GdalDataType) -> Result<Self> {
        match value {
            GdalDataType::UInt8 => Ok(ArrayDataType::Uint8),
            GdalDataType::UInt16 => Ok(ArrayDataType::Uint16),
            GdalDataType::Int16 => Ok(ArrayDataType::Int16),
            GdalDataType::UInt32 => Ok(ArrayDataType::Uint32),
            GdalDataType::Int32 => Ok(ArrayDataType::Int32),
            GdalDataType::Float32 => Ok(ArrayDataType::Float32),
            GdalDataType::Float64 => Ok(ArrayDataType::Float64),
            other => Err(Error::Runtime(format!("Unsupported raster data type: {other:?}"))),
        }
    }
}

impl RasterBackend for GdalBackend {
    type Dataset = GdalDataset;

    fn open(&self, path: &Path) -> Result<GdalDataset> {
        log::debug!("Open raster {}", path.display());
        Ok(GdalDataset::from_dataset(open_dataset_read_only(path)?))
    }

    fn create(&self, path: &Path, profile: &WriteProfile, pixels: &AnyArray) -> Result<RasterProfile> {
        dispatch_anyarray!(pixels, arr, create_raster(path, profile, arr))
    }
}

impl RasterDataset for GdalDataset {
    fn profile(&self) -> Result<RasterProfile> {
        let (width, height) = self.ds.raster_size();
        let first_band = self.band_info(1)?;

        let projection = self.ds.projection();
        let crs = if projection.is_empty() {
            None
        } else {
            Some(SpatialReference::from_definition(&projection)?.crs_definition()?)
        };

        Ok(RasterProfile {
            driver: self.ds.driver().short_name(),
            width,
            height,
            count: self.ds.raster_count(),
            dtype: first_band.dtype,
            nodata: first_band.nodata,
            crs,
            // A missing transform is reported as an error by the driver
            transform: self.ds.geo_transform().ok().map(GeoTransform::from),
            block_size: self.ds.rasterband(1)?.block_size(),
        })
    }

    fn band_info(&self, band: usize) -> Result<BandInfo> {
        self.check_band_index(band)?;
        let band = self.ds.rasterband(band)?;
        Ok(BandInfo {
            dtype: ArrayDataType::try_from(band.band_type())?,
            nodata: band.no_data_value(),
        })
    }

    fn read<T: ArrayNum>(&self, bands: &[usize], out_shape: Option<(usize, usize)>) -> Result<ArrayD<T>> {
        if bands.is_empty() {
            return Err(Error::InvalidArgument("No bands requested".to_string()));
        }

        let (width, height) = self.ds.raster_size();
        let (rows, cols) = out_shape.unwrap_or((height, width));
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidArgument(format!("Invalid output shape: ({rows}, {cols})")));
        }

        let band_size = rows * cols;
        let mut data = vec![T::default(); band_size * bands.len()];
        for (&band_index, band_data) in bands.iter().zip(data.chunks_exact_mut(band_size)) {
            self.check_band_index(band_index)?;
            let band = self.ds.rasterband(band_index)?;
            band.read_into_slice::<T>(
                (0, 0),
                (width, height),
                (cols, rows),
                band_data,
                Some(ResampleAlg::NearestNeighbour),
            )?;
        }

        let shape = if bands.len() == 1 {
            vec![rows, cols]
        } else {
            vec![bands.len(), rows, cols]
        };

        ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| Error::Runtime(format!("Invalid raster buffer: {e}")))
    }

    fn reproject_band<T: ArrayNum>(&self, dst: &mut Array2<T>, params: &ReprojectParams) -> Result<()> {
        self.check_band_index(params.band)?;

        let gbox = params.dst_gbox;
        if dst.dim() != gbox.shape() {
            return Err(Error::InvalidArgument(format!(
                "Destination shape {:?} does not match the grid shape {:?}",
                dst.dim(),
                gbox.shape()
            )));
        }

        let dst_data = dst
            .as_slice_mut()
            .ok_or_else(|| Error::InvalidArgument("Destination array must be contiguous".to_string()))?;

        // The destination dataset writes straight into the pre-filled array
        let mut dst_ds = create_in_memory_dataset(gbox.width(), gbox.height())?;
        add_band_from_mut_data_ptr(&mut dst_ds, dst_data)?;
        dst_ds.set_geo_transform(&gbox.transform().coefficients())?;
        dst_ds.set_projection(&SpatialReference::from_crs(gbox.crs())?.to_wkt()?)?;
        dst_ds.rasterband(1)?.set_no_data_value(Some(params.dst_nodata))?;

        log::debug!(
            "Warp band {} onto {gbox} ({}, nodata {})",
            params.band,
            params.resampling,
            params.dst_nodata
        );
        warp(&self.ds, &dst_ds, params)
    }
}

fn open_dataset_read_only(path: &Path) -> Result<gdal::Dataset> {
    let options = gdal::DatasetOptions {
        open_flags: gdal::GdalOpenFlags::GDAL_OF_READONLY | gdal::GdalOpenFlags::GDAL_OF_RASTER,
        ..Default::default()
    };

    gdal::Dataset::open_ex(path, options).map_err(|err| match err {
        // Give a cleaner error when the file does not exist
        GdalError::NullPointer { .. } if !path.exists() => Error::InvalidPath(PathBuf::from(path)),
        err => Error::GdalError(err),
    })
}

/// Creates an in-memory dataset without any bands
fn create_in_memory_dataset(width: usize, height: usize) -> Result<gdal::Dataset> {
    let mem_driver = gdal::DriverManager::get_driver_by_name("MEM")?;
    Ok(mem_driver.create("in_mem", width, height, 0)?)
}

/// Adds a band to the in-memory dataset that uses the provided data as storage.
/// The data must stay alive as long as the dataset and the band must only be read from.
fn add_band_from_data_ptr<T: GdalType>(ds: &mut gdal::Dataset, data: &[T]) -> Result<()> {
    add_band_from_ptr::<T>(ds, data.as_ptr().cast::<c_void>())
}

/// Same as [`add_band_from_data_ptr`] for bands that GDAL writes into
fn add_band_from_mut_data_ptr<T: GdalType>(ds: &mut gdal::Dataset, data: &mut [T]) -> Result<()> {
    add_band_from_ptr::<T>(ds, data.as_mut_ptr().cast::<c_void>())
}

fn add_band_from_ptr<T: GdalType>(ds: &mut gdal::Dataset, data_ptr: *const c_void) -> Result<()> {
    let data_ptr = format!("DATAPOINTER={data_ptr:p}");

    let mut str_options = CslStringList::new();
    str_options.add_string(data_ptr.as_str())?;
    let rc = unsafe { gdal_sys::GDALAddBand(ds.c_dataset(), T::gdal_ordinal(), str_options.as_ptr()) };
    check_rc(rc)?;

    Ok(())
}

fn create_raster<T: ArrayNum>(path: &Path, profile: &WriteProfile, pixels: &ArrayD<T>) -> Result<RasterProfile> {
    if T::TYPE != profile.dtype {
        return Err(Error::InvalidArgument(format!(
            "Pixel data type {} does not match the profile data type {}",
            T::TYPE,
            profile.dtype
        )));
    }

    let pixels = pixels.as_standard_layout();
    let data = pixels
        .as_slice()
        .ok_or_else(|| Error::Runtime("Pixel array is not contiguous".to_string()))?;

    let band_size = profile.width * profile.height;
    if band_size == 0 || data.len() != band_size * profile.count {
        return Err(Error::InvalidArgument(format!(
            "Pixel buffer of {} values does not match {} bands of {}x{}",
            data.len(),
            profile.count,
            profile.width,
            profile.height
        )));
    }

    let mut ds = create_in_memory_dataset(profile.width, profile.height)?;
    for band_data in data.chunks_exact(band_size) {
        add_band_from_data_ptr(&mut ds, band_data)?;
    }

    if let Some(transform) = &profile.transform {
        ds.set_geo_transform(&transform.coefficients())?;
    }

    if let Some(crs) = &profile.crs {
        ds.set_projection(&SpatialReference::from_crs(crs)?.to_wkt()?)?;
    }

    if let Some(nodata) = profile.nodata {
        for band_index in 1..=profile.count {
            ds.rasterband(band_index)?.set_no_data_value(Some(nodata))?;
        }
    }

    write_to_disk(&ds, path, &profile.driver, profile.creation_options())?;
    GdalDataset::from_dataset(open_dataset_read_only(path)?).profile()
}

// Write dataset to disk using the CreateCopy method of the driver
fn write_to_disk(ds: &gdal::Dataset, path: &Path, driver_name: &str, creation_options: &[(String, String)]) -> Result<()> {
    let driver = gdal::DriverManager::get_driver_by_name(driver_name)?;
    let c_opts = create_string_list(creation_options)?;

    log::debug!("Write raster {} ({driver_name}, {creation_options:?})", path.display());

    let path_str = CString::new(path.to_str().ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?)?;
    let ds_handle = check_pointer(
        unsafe {
            gdal_sys::GDALCreateCopy(
                driver.c_driver(),
                path_str.as_ptr(),
                ds.c_dataset(),
                FALSE,
                c_opts.as_ptr(),
                None,
                std::ptr::null_mut(),
            )
        },
        "GDALCreateCopy",
    )?;

    // Closing the handle flushes the file
    drop(unsafe { gdal::Dataset::from_c_dataset(ds_handle) });
    Ok(())
}

/// Warps a single band of the source dataset into the first band of the destination dataset.
/// The destination is not initialized, pixels without source data keep their value.
fn warp(src_ds: &gdal::Dataset, dst_ds: &gdal::Dataset, params: &ReprojectParams) -> Result<()> {
    let str_options = create_string_list(params.warp_options)?;

    let (dst_width, dst_height) = dst_ds.raster_size();

    unsafe {
        let warp_options = gdal_sys::GDALCreateWarpOptions();
        (*warp_options).papszWarpOptions = gdal_sys::CSLDuplicate(str_options.as_ptr());
        (*warp_options).hSrcDS = src_ds.c_dataset();
        (*warp_options).hDstDS = dst_ds.c_dataset();
        (*warp_options).nBandCount = 1;
        (*warp_options).panSrcBands = gdal_sys::CPLMalloc(std::mem::size_of::<c_int>()).cast::<c_int>();
        (*warp_options).panSrcBands.write(params.band as c_int);
        (*warp_options).panDstBands = gdal_sys::CPLMalloc(std::mem::size_of::<c_int>()).cast::<c_int>();
        (*warp_options).panDstBands.write(1);
        (*warp_options).pfnTransformer = Some(gdal_sys::GDALGenImgProjTransform);
        (*warp_options).eResampleAlg = params.resampling.to_gdal();

        // Freed together with the warp options
        if let Some(src_nodata) = params.src_nodata {
            (*warp_options).padfSrcNoDataReal = gdal_sys::CPLMalloc(std::mem::size_of::<c_double>()).cast::<c_double>();
            (*warp_options).padfSrcNoDataReal.write(src_nodata);
        }

        (*warp_options).padfDstNoDataReal = gdal_sys::CPLMalloc(std::mem::size_of::<c_double>()).cast::<c_double>();
        (*warp_options).padfDstNoDataReal.write(params.dst_nodata);

        let transformer = gdal_sys::GDALCreateGenImgProjTransformer(
            src_ds.c_dataset(),
            std::ptr::null_mut(),
            dst_ds.c_dataset(),
            std::ptr::null_mut(),
            FALSE,
            0.0,
            0,
        );

        if let Err(err) = check_pointer(transformer, "GDALCreateGenImgProjTransformer") {
            gdal_sys::GDALDestroyWarpOptions(warp_options);
            return Err(err.into());
        }

        (*warp_options).pTransformerArg = transformer;

        let operation = gdal_sys::GDALCreateWarpOperation(warp_options);
        let result = match check_pointer(operation, "GDALCreateWarpOperation") {
            Ok(operation) => {
                let rc = gdal_sys::GDALChunkAndWarpImage(operation, 0, 0, dst_width as c_int, dst_height as c_int);
                gdal_sys::GDALDestroyWarpOperation(operation);
                check_rc(rc)
            }
            Err(err) => Err(err),
        };

        gdal_sys::GDALDestroyGenImgProjTransformer(transformer);
        gdal_sys::GDALDestroyWarpOptions(warp_options);

        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array3;
    use tempfile::TempDir;

    use super::*;
    use crate::{Crs, testutils};

    fn profile_for(width: usize, height: usize, count: usize, dtype: ArrayDataType) -> WriteProfile {
        let mut profile = WriteProfile::new(width, height, count, dtype);
        profile.crs = Some(Crs::Epsg(3857));
        profile.transform = Some(GeoTransform::from_affine(10.0, 0.0, 0.0, 0.0, -10.0, 0.0));
        profile
    }

    #[test_log::test]
    fn create_and_read_bands() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("bands.tif");

        let pixels: AnyArray = Array3::from_shape_fn((3, 4, 5), |(b, r, c)| (b * 100 + r * 10 + c) as u16).into();
        let written = GdalBackend.create(&path, &profile_for(5, 4, 3, ArrayDataType::Uint16), &pixels)?;
        assert_eq!(written.driver, "GTiff");
        assert_eq!(written.count, 3);
        assert_eq!(written.dtype, ArrayDataType::Uint16);
        assert_eq!(written.crs.as_ref().and_then(|crs| crs.epsg), Some(3857));

        let ds = GdalBackend.open(&path)?;
        let second = ds.read::<u16>(&[2], None)?;
        assert_eq!(second.shape(), &[4, 5]);
        assert_eq!(second[[3, 4]], 134);

        let all = ds.read::<u16>(&[1, 2, 3], None)?;
        assert_eq!(AnyArray::from(all), pixels);

        assert!(matches!(ds.read::<u16>(&[4], None), Err(Error::InvalidArgument(_))));
        Ok(())
    }

    #[test_log::test]
    fn read_resampled() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("resampled.tif");

        let pixels: AnyArray = testutils::ramp::<u8>(8, 8).into();
        GdalBackend.create(&path, &profile_for(8, 8, 1, ArrayDataType::Uint8), &pixels)?;

        let ds = GdalBackend.open(&path)?;
        let half = ds.read::<u8>(&[1], Some((4, 4)))?;
        assert_eq!(half.shape(), &[4, 4]);
        assert!(matches!(ds.read::<u8>(&[1], Some((0, 4))), Err(Error::InvalidArgument(_))));
        Ok(())
    }

    #[test_log::test]
    fn missing_file_is_an_invalid_path() {
        let path = Path::new("/this/path/does/not/exist.tif");
        assert!(matches!(GdalBackend.open(path), Err(Error::InvalidPath(p)) if p == path));
    }

    #[cfg(unix)]
    #[test_log::test]
    fn non_utf8_path_is_rejected() -> Result<()> {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let tmp = TempDir::new()?;
        let path = tmp.path().join(OsStr::from_bytes(b"invalid\xff.tif"));

        let pixels: AnyArray = testutils::ramp::<u8>(4, 4).into();
        let res = GdalBackend.create(&path, &profile_for(4, 4, 1, ArrayDataType::Uint8), &pixels);
        assert!(matches!(res, Err(Error::InvalidPath(p)) if p == path));
        assert_eq!(std::fs::read_dir(tmp.path())?.count(), 0);
        Ok(())
    }

    #[test_log::test]
    fn band_info_per_band() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("info.tif");

        let pixels: AnyArray = Array3::<i16>::zeros((2, 4, 4)).into();
        let mut profile = profile_for(4, 4, 2, ArrayDataType::Int16);
        profile.nodata = Some(-1.0);
        GdalBackend.create(&path, &profile, &pixels)?;

        let ds = GdalBackend.open(&path)?;
        let info = ds.band_info(2)?;
        assert_eq!(info.dtype, ArrayDataType::Int16);
        assert_eq!(info.nodata, Some(-1.0));
        assert!(matches!(ds.band_info(3), Err(Error::InvalidArgument(_))));
        Ok(())
    }

    #[test_log::test]
    fn data_type_mismatch_is_rejected() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("mismatch.tif");

        let pixels: AnyArray = testutils::ramp::<u8>(4, 4).into();
        let res = GdalBackend.create(&path, &profile_for(4, 4, 1, ArrayDataType::Float32), &pixels);
        assert!(matches!(res, Err(Error::InvalidArgument(_))));
        assert!(!path.exists());
        Ok(())
    }
}
