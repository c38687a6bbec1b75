use std::path::Path;

use crate::{Error, Result};

/// Makes sure a new file can be created at the given path.
/// An existing file is removed when `overwrite` is set, otherwise [`Error::FileExists`] is returned
/// and the file is left untouched.
pub fn clear_output_path(p: &Path, overwrite: bool) -> Result {
    if p.exists() {
        if !overwrite {
            return Err(Error::FileExists(p.to_path_buf()));
        }

        log::debug!("Removing existing file: {}", p.display());
        std::fs::remove_file(p)?;
    }

    Ok(())
}
