use crate::{AnyArray, ArrayDataType, Crs, Error, GeoTransform, Result};

pub const GEOTIFF_DRIVER: &str = "GTiff";

/// Everything the backend needs to create a raster file
#[derive(Debug, Clone, PartialEq)]
pub struct WriteProfile {
    pub driver: String,
    pub width: usize,
    pub height: usize,
    pub count: usize,
    pub dtype: ArrayDataType,
    pub crs: Option<Crs>,
    pub transform: Option<GeoTransform>,
    pub nodata: Option<f64>,
    creation_options: Vec<(String, String)>,
}

impl WriteProfile {
    pub fn new(width: usize, height: usize, count: usize, dtype: ArrayDataType) -> Self {
        WriteProfile {
            driver: GEOTIFF_DRIVER.to_string(),
            width,
            height,
            count,
            dtype,
            crs: None,
            transform: None,
            nodata: None,
            creation_options: Vec::new(),
        }
    }

    /// Sets a driver creation option, keys are case insensitive and a later value replaces an earlier one
    pub fn set_creation_option(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_ascii_uppercase();
        let value = value.into();
        match self.creation_options.iter_mut().find(|(k, _)| *k == key) {
            Some(opt) => opt.1 = value,
            None => self.creation_options.push((key, value)),
        }
    }

    pub fn creation_option(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_uppercase();
        self.creation_options
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn creation_options(&self) -> &[(String, String)] {
        &self.creation_options
    }

    /// Applies a single `key=value` override.
    ///
    /// The raster properties (`width`, `height`, `count`, `dtype`, `crs`, `transform`, `nodata`, `driver`)
    /// are recognized case insensitively, any other key is passed to the driver as a creation option.
    /// `crs`, `transform` and `nodata` can be cleared with the value `none`.
    /// A transform is given as the six comma separated row-major affine coefficients.
    pub fn apply_option(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "driver" => self.driver = value.to_string(),
            "width" => self.width = parse_option(key, value)?,
            "height" => self.height = parse_option(key, value)?,
            "count" => self.count = parse_option(key, value)?,
            "dtype" => self.dtype = value.parse()?,
            "crs" => {
                self.crs = if is_none(value) { None } else { Some(value.parse()?) };
            }
            "transform" => {
                self.transform = if is_none(value) { None } else { Some(parse_affine(value)?) };
            }
            "nodata" => {
                self.nodata = if is_none(value) { None } else { Some(parse_option(key, value)?) };
            }
            _ => self.set_creation_option(key.trim(), value),
        }

        Ok(())
    }

    /// Checks the profile against the pixels that will be written
    pub fn validate(&self, pixels: &AnyArray) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.count == 0 {
            return Err(Error::InvalidArgument(format!(
                "Invalid raster size: {} bands of {}x{}",
                self.count, self.width, self.height
            )));
        }

        let expected = match pixels.ndim() {
            2 => vec![self.height, self.width],
            _ => vec![self.count, self.height, self.width],
        };

        if pixels.shape() != expected.as_slice() || (pixels.ndim() == 2 && self.count != 1) {
            return Err(Error::InvalidArgument(format!(
                "Array shape {:?} does not match the raster profile ({} bands of {}x{})",
                pixels.shape(),
                self.count,
                self.width,
                self.height
            )));
        }

        if let Some(nodata) = self.nodata
            && !self.dtype.fits(nodata)
        {
            return Err(Error::InvalidArgument(format!(
                "Nodata value {nodata} does not fit in data type {}",
                self.dtype
            )));
        }

        Ok(())
    }
}

/// Tile dimensions for a raster, never larger than the raster itself
pub fn tile_size(blocksize: usize, width: usize, height: usize) -> (usize, usize) {
    (blocksize.min(width), blocksize.min(height))
}

fn is_none(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("none")
}

fn parse_option<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("Invalid value for option '{key}': '{value}'")))
}

fn parse_affine(value: &str) -> Result<GeoTransform> {
    let coefficients = value
        .split(',')
        .map(|v| parse_option::<f64>("transform", v.trim()))
        .collect::<Result<Vec<f64>>>()?;

    match coefficients.as_slice() {
        &[a, b, c, d, e, f] => Ok(GeoTransform::from_affine(a, b, c, d, e, f)),
        _ => Err(Error::InvalidArgument(format!(
            "A transform needs 6 coefficients, got {}",
            coefficients.len()
        ))),
    }
}
