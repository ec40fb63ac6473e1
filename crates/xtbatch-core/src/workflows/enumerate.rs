use crate::engine::error::EngineError;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_GEOMETRY_EXTENSION: &str = "xyz";

/// Lists every file with the given extension in the given directories.
///
/// The listing is not recursive. Directories that do not exist are skipped with a
/// warning. The result is sorted by path so that batch indices stay stable across runs.
///
/// # Errors
///
/// Returns an error if an existing directory cannot be read.
pub fn collect_geometry_files<P: AsRef<Path>>(
    directories: &[P],
    extension: &str,
) -> Result<Vec<PathBuf>, EngineError> {
    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();

    for directory in directories {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            warn!("Directory not found: {}", directory.display());
            continue;
        }

        let entries = fs::read_dir(directory).map_err(|e| EngineError::io(directory, e))?;
        let before = files.len();
        for entry in entries {
            let path = entry.map_err(|e| EngineError::io(directory, e))?.path();
            if path.extension() == Some(OsStr::new(extension)) && path.is_file() {
                files.push(path);
            }
        }
        debug!(
            "Found {} .{} file(s) in {}",
            files.len() - before,
            extension,
            directory.display()
        );
    }

    files.sort();
    Ok(files)
}
