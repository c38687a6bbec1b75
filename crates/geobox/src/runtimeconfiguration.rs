use std::path::Path;

use bon::bon;
use inf::gdalinterop;

use crate::Result;

/// Process wide GDAL configuration, apply it once before doing any raster I/O
pub struct RuntimeConfiguration {
    gdal_config: gdalinterop::Config,
}

#[bon]
impl RuntimeConfiguration {
    #[builder]
    pub fn new(proj_db: Option<&Path>, gdal_debug_log: Option<bool>, #[builder(default)] gdal_config_options: Vec<(String, String)>) -> Self {
        Self {
            gdal_config: gdalinterop::Config {
                debug_logging: gdal_debug_log.unwrap_or(false),
                proj_db_search_location: proj_db.map(Path::to_path_buf),
                config_options: gdal_config_options,
            },
        }
    }

    pub fn apply(&self) -> Result<()> {
        self.gdal_config.apply()
    }
}
