//! Normalized coordinate reference system description.

use std::str::FromStr;

use crate::Error;

/// Backend neutral description of a coordinate reference system as reported by a raster driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsDefinition {
    /// Registered EPSG code, if the system could be identified as one
    pub epsg: Option<u32>,
    pub wkt: String,
}

/// A coordinate reference system, either a registered EPSG code or a WKT definition.
///
/// Displays as `epsg:<code>` or as the WKT text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Crs {
    Epsg(u32),
    Wkt(String),
}

impl Crs {
    /// Prefer the EPSG code when the definition carries one
    pub fn from_definition(def: &CrsDefinition) -> Self {
        match def.epsg {
            Some(code) => Crs::Epsg(code),
            None => Crs::Wkt(def.wkt.clone()),
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Epsg(code) => write!(f, "epsg:{code}"),
            Crs::Wkt(wkt) => write!(f, "{wkt}"),
        }
    }
}

impl FromStr for Crs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidArgument("Empty CRS definition".to_string()));
        }

        if let Some(prefix) = s.get(..5)
            && prefix.eq_ignore_ascii_case("epsg:")
        {
            let code = s[5..]
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::InvalidArgument(format!("Invalid EPSG code: '{s}'")))?;
            return Ok(Crs::Epsg(code));
        }

        Ok(Crs::Wkt(s.to_string()))
    }
}

impl From<u32> for Crs {
    fn from(code: u32) -> Self {
        Crs::Epsg(code)
    }
}
