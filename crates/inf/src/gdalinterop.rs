use std::path::PathBuf;

use crate::Result;
use gdal::{cpl::CslStringList, errors::GdalError};

pub const FALSE: std::ffi::c_int = 0;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub debug_logging: bool,
    pub proj_db_search_location: Option<PathBuf>,
    pub config_options: Vec<(String, String)>,
}

impl Config {
    pub fn apply(&self) -> Result<()> {
        setup_logging(self.debug_logging);
        if let Some(proj_db_path) = &self.proj_db_search_location {
            let proj_db_path = proj_db_path.to_string_lossy().to_string();
            gdal::config::set_config_option("PROJ_DATA", proj_db_path.as_str())?;

            // Also set the environment variable unless it is already set by the user
            // libraries linking proj directly do not look at the gdal settings
            if std::env::var_os("PROJ_DATA").is_none() {
                // Safety: configuration is applied once at startup before any worker threads exist
                unsafe { std::env::set_var("PROJ_DATA", proj_db_path.as_str()) };
            }
        }

        for (key, value) in &self.config_options {
            gdal::config::set_config_option(key, value)?;
        }

        Ok(())
    }
}

pub fn setup_logging(debug: bool) {
    if debug && gdal::config::set_config_option("CPL_DEBUG", "ON").is_err() {
        log::debug!("Failed to set GDAL debug level");
    }

    gdal::config::set_error_handler(|sev, _ec, msg| {
        use gdal::errors::CplErrType;
        match sev {
            CplErrType::Debug => log::debug!("GDAL: {msg}"),
            CplErrType::Warning => log::warn!("GDAL: {msg}"),
            CplErrType::Failure | CplErrType::Fatal => log::error!("GDAL: {msg}"),
            CplErrType::None => {}
        }
    });
}

/// Converts key value pairs into a `KEY=VALUE` GDAL string list
pub fn create_string_list(options: &[(String, String)]) -> Result<CslStringList> {
    let mut result = CslStringList::new();
    for (key, value) in options {
        result.set_name_value(key, value)?;
    }

    Ok(result)
}

pub fn check_rc(rc: gdal_sys::CPLErr::Type) -> std::result::Result<(), GdalError> {
    if rc != gdal_sys::CPLErr::CE_None {
        let msg = last_error_message();
        let last_err_no = unsafe { gdal_sys::CPLGetLastErrorNo() };
        Err(GdalError::CplError {
            class: rc,
            number: last_err_no,
            msg,
        })
    } else {
        Ok(())
    }
}

pub fn check_pointer<T>(ptr: *mut T, method_name: &'static str) -> std::result::Result<*mut T, GdalError> {
    if ptr.is_null() {
        let msg = last_error_message();
        unsafe { gdal_sys::CPLErrorReset() };
        Err(GdalError::NullPointer { method_name, msg })
    } else {
        Ok(ptr)
    }
}

fn last_error_message() -> String {
    let raw_ptr = unsafe { gdal_sys::CPLGetLastErrorMsg() };
    if raw_ptr.is_null() {
        return String::new();
    }

    let c_str = unsafe { std::ffi::CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}
