use std::path::{Path, PathBuf};

use crate::{ArrayDataType, Crs, GeoBox, GeoTransform, Result, crs::CrsDefinition};

/// Metadata of a raster file as reported by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct RasterProfile {
    /// Short driver name (e.g. `GTiff`)
    pub driver: String,
    pub width: usize,
    pub height: usize,
    /// Number of bands
    pub count: usize,
    /// Data type of the first band
    pub dtype: ArrayDataType,
    pub nodata: Option<f64>,
    pub crs: Option<CrsDefinition>,
    pub transform: Option<GeoTransform>,
    /// Block size of the first band as `(x, y)`
    pub block_size: (usize, usize),
}

/// Result record of the read and write helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterMeta {
    pub profile: RasterProfile,
    pub path: PathBuf,
    /// Grid of the returned pixels
    pub gbox: Option<GeoBox>,
    /// Native grid of the file, only set by reprojecting reads
    pub src_gbox: Option<GeoBox>,
}

impl RasterMeta {
    pub fn from_profile(profile: RasterProfile, path: impl AsRef<Path>) -> Result<Self> {
        let gbox = geobox_from_profile(&profile)?;
        Ok(RasterMeta {
            profile,
            path: path.as_ref().to_path_buf(),
            gbox,
            src_gbox: None,
        })
    }
}

/// Derives the grid of a raster from its profile.
///
/// Returns `None` when the profile lacks a coordinate reference system or a transform.
/// Registered EPSG systems become `epsg:<code>`, anything else is kept as WKT.
pub fn geobox_from_profile(profile: &RasterProfile) -> Result<Option<GeoBox>> {
    match (&profile.crs, &profile.transform) {
        (Some(crs), Some(transform)) => Ok(Some(GeoBox::new(
            profile.width,
            profile.height,
            *transform,
            Crs::from_definition(crs),
        )?)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(crs: Option<CrsDefinition>, transform: Option<GeoTransform>) -> RasterProfile {
        RasterProfile {
            driver: "GTiff".to_string(),
            width: 30,
            height: 20,
            count: 1,
            dtype: ArrayDataType::Uint8,
            nodata: None,
            crs,
            transform,
            block_size: (30, 20),
        }
    }

    fn transform() -> GeoTransform {
        GeoTransform::from_affine(10.0, 0.0, 0.0, 0.0, -10.0, 0.0)
    }

    #[test]
    fn missing_crs_or_transform_gives_no_grid() {
        assert!(geobox_from_profile(&profile(None, Some(transform()))).unwrap().is_none());

        let crs = CrsDefinition {
            epsg: Some(3857),
            wkt: String::new(),
        };
        assert!(geobox_from_profile(&profile(Some(crs), None)).unwrap().is_none());
    }

    #[test]
    fn epsg_crs_is_normalized() {
        let crs = CrsDefinition {
            epsg: Some(3857),
            wkt: "PROJCS[\"WGS 84 / Pseudo-Mercator\"]".to_string(),
        };

        let gbox = geobox_from_profile(&profile(Some(crs), Some(transform()))).unwrap().unwrap();
        assert_eq!(gbox.crs().to_string(), "epsg:3857");
        assert_eq!(gbox.shape(), (20, 30));
        assert_eq!(*gbox.transform(), transform());
    }

    #[test]
    fn non_epsg_crs_is_kept_as_wkt() {
        let wkt = "PROJCS[\"unknown\",PROJECTION[\"Transverse_Mercator\"]]".to_string();
        let crs = CrsDefinition {
            epsg: None,
            wkt: wkt.clone(),
        };

        let meta = RasterMeta::from_profile(profile(Some(crs), Some(transform())), "/tmp/x.tif").unwrap();
        assert_eq!(meta.gbox.unwrap().crs(), &Crs::Wkt(wkt));
        assert_eq!(meta.path, PathBuf::from("/tmp/x.tif"));
        assert!(meta.src_gbox.is_none());
    }
}
