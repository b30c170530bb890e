//! Log directory provisioning
//!
//! **Destructive:** when a non-directory (for example a regular file) sits at
//! the configured directory path and replacement is allowed, that path is
//! removed and its contents are lost.

use super::error::{LoggerError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// What [`provision_dir`] had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// A directory was already there
    Existing,
    /// The directory (and any missing parents) was created
    Created,
    /// A non-directory was deleted and a directory created in its place
    Replaced,
}

/// Make sure `dir` exists as a directory.
///
/// # Errors
///
/// Returns error if the directory cannot be created, or if a non-directory
/// occupies `dir` and `replace_colliding` is `false`
pub fn provision_dir(dir: &Path, replace_colliding: bool) -> Result<Provisioned> {
    match fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => Ok(Provisioned::Existing),
        Ok(_) => {
            if !replace_colliding {
                return Err(LoggerError::provision(
                    dir.display().to_string(),
                    "path exists and is not a directory",
                ));
            }

            eprintln!(
                "[LOGGER WARNING] Removing non-directory at log directory path '{}'",
                dir.display()
            );
            fs::remove_file(dir).map_err(|e| {
                LoggerError::provision(
                    dir.display().to_string(),
                    format!("cannot remove colliding file: {}", e),
                )
            })?;
            create(dir)?;
            Ok(Provisioned::Replaced)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            create(dir)?;
            Ok(Provisioned::Created)
        }
        Err(e) => Err(LoggerError::provision(
            dir.display().to_string(),
            format!("cannot inspect path: {}", e),
        )),
    }
}

fn create(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| LoggerError::provision(dir.display().to_string(), e.to_string()))
}
