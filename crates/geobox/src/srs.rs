//! Spatial reference handling on top of the GDAL/OGR bindings.

use gdal::spatial_ref::{AxisMappingStrategy, SpatialRef};

use crate::{
    Crs, Error, Result,
    crs::CrsDefinition,
};

pub struct SpatialReference {
    srs: SpatialRef,
}

impl SpatialReference {
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        Ok(Self::from_srs(SpatialRef::from_epsg(epsg)?))
    }

    /// Accepts any definition understood by OGR: WKT, PROJ strings or `AUTHORITY:CODE`
    pub fn from_definition(def: &str) -> Result<Self> {
        if def.trim().is_empty() {
            return Err(Error::InvalidArgument("Empty spatial reference definition".to_string()));
        }

        Ok(Self::from_srs(SpatialRef::from_definition(def)?))
    }

    pub fn from_crs(crs: &Crs) -> Result<Self> {
        match crs {
            Crs::Epsg(code) => Self::from_epsg(*code),
            Crs::Wkt(def) => Self::from_definition(def),
        }
    }

    fn from_srs(mut srs: SpatialRef) -> Self {
        srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        SpatialReference { srs }
    }

    pub fn to_wkt(&self) -> Result<String> {
        Ok(self.srs.to_wkt()?)
    }

    /// The EPSG code of the coordinate system, if it is a registered one.
    /// Falls back to OGR identification when the definition carries no authority.
    pub fn epsg_cs(&self) -> Option<u32> {
        if let Some(auth) = self.srs.auth_name()
            && auth.eq_ignore_ascii_case("EPSG")
        {
            return self.srs.auth_code().ok().and_then(|code| u32::try_from(code).ok());
        }

        let mut srs = self.srs.clone();
        if srs.auto_identify_epsg().is_ok() {
            return srs.auth_code().ok().and_then(|code| u32::try_from(code).ok());
        }

        None
    }

    pub fn crs_definition(&self) -> Result<CrsDefinition> {
        Ok(CrsDefinition {
            epsg: self.epsg_cs(),
            wkt: self.to_wkt()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_is_identified() {
        let srs = SpatialReference::from_epsg(3857).unwrap();
        assert_eq!(srs.epsg_cs(), Some(3857));

        let from_wkt = SpatialReference::from_definition(&srs.to_wkt().unwrap()).unwrap();
        assert_eq!(from_wkt.epsg_cs(), Some(3857));
    }

    #[test]
    fn custom_projection_has_no_epsg() {
        let srs =
            SpatialReference::from_definition("+proj=tmerc +lat_0=0 +lon_0=4.3 +k=0.9996 +x_0=500000 +y_0=0 +ellps=GRS80 +units=m +no_defs")
                .unwrap();
        let def = srs.crs_definition().unwrap();
        assert_eq!(def.epsg, None);
        assert!(def.wkt.contains("Transverse_Mercator"));
    }

    #[test]
    fn empty_definition() {
        assert!(matches!(SpatialReference::from_definition(" "), Err(Error::InvalidArgument(_))));
    }
}
