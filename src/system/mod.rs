/// System module: filesystem helpers shared by the submission pipeline

pub mod glob;

use std::fs;
use std::io;
use std::path::Path;

/// Ensure a directory (and any missing parents) exists.
///
/// Idempotent: an existing directory is left untouched.
///
/// # Returns
/// `true` if the directory had to be created, `false` if it already existed
pub fn ensure_dir_exists(dir: &Path) -> io::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    log::info!("[System] Created directory: {}", dir.display());
    Ok(true)
}
