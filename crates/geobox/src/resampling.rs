use std::str::FromStr;

use crate::Error;

/// Resampling kernel used when warping a raster onto another grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resampling {
    #[default]
    Nearest,
    Bilinear,
    Cubic,
    CubicSpline,
    Lanczos,
    Average,
    Mode,
    Max,
    Min,
    Med,
    Q1,
    Q3,
    Sum,
}

impl Resampling {
    pub fn to_str(&self) -> &'static str {
        match self {
            Resampling::Nearest => "nearest",
            Resampling::Bilinear => "bilinear",
            Resampling::Cubic => "cubic",
            Resampling::CubicSpline => "cubic_spline",
            Resampling::Lanczos => "lanczos",
            Resampling::Average => "average",
            Resampling::Mode => "mode",
            Resampling::Max => "max",
            Resampling::Min => "min",
            Resampling::Med => "med",
            Resampling::Q1 => "q1",
            Resampling::Q3 => "q3",
            Resampling::Sum => "sum",
        }
    }

    pub fn to_gdal(self) -> gdal_sys::GDALResampleAlg::Type {
        use gdal_sys::GDALResampleAlg::*;

        match self {
            Resampling::Nearest => GRA_NearestNeighbour,
            Resampling::Bilinear => GRA_Bilinear,
            Resampling::Cubic => GRA_Cubic,
            Resampling::CubicSpline => GRA_CubicSpline,
            Resampling::Lanczos => GRA_Lanczos,
            Resampling::Average => GRA_Average,
            Resampling::Mode => GRA_Mode,
            Resampling::Max => GRA_Max,
            Resampling::Min => GRA_Min,
            Resampling::Med => GRA_Med,
            Resampling::Q1 => GRA_Q1,
            Resampling::Q3 => GRA_Q3,
            Resampling::Sum => GRA_Sum,
        }
    }
}

impl std::fmt::Display for Resampling {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Resampling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Resampling::Nearest,
            "bilinear" => Resampling::Bilinear,
            "cubic" => Resampling::Cubic,
            "cubic_spline" | "cubicspline" => Resampling::CubicSpline,
            "lanczos" => Resampling::Lanczos,
            "average" => Resampling::Average,
            "mode" => Resampling::Mode,
            "max" => Resampling::Max,
            "min" => Resampling::Min,
            "med" => Resampling::Med,
            "q1" => Resampling::Q1,
            "q3" => Resampling::Q3,
            "sum" => Resampling::Sum,
            _ => return Err(Error::InvalidArgument(format!("Unknown resampling method: '{s}'"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resampling() {
        assert_eq!("nearest".parse::<Resampling>().unwrap(), Resampling::Nearest);
        assert_eq!("Bilinear".parse::<Resampling>().unwrap(), Resampling::Bilinear);
        assert_eq!("cubic_spline".parse::<Resampling>().unwrap(), Resampling::CubicSpline);
        assert!("rms2".parse::<Resampling>().is_err());
        assert_eq!(Resampling::default(), Resampling::Nearest);
        assert_eq!(Resampling::Q3.to_string(), "q3");
    }

    #[test]
    fn gdal_mapping() {
        assert_eq!(Resampling::Nearest.to_gdal(), gdal_sys::GDALResampleAlg::GRA_NearestNeighbour);
        assert_eq!(Resampling::Average.to_gdal(), gdal_sys::GDALResampleAlg::GRA_Average);
    }
}
