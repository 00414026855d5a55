//! Startup checks on the output location.
//!
//! These run once, before any file is opened, so that a bad path is reported
//! as a configuration error instead of failing halfway through the stream.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cli::CliError;

/// Directory that will hold the active and rotated files.
pub fn output_dir(base: &Path) -> PathBuf {
    match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether the current user may create files in `dir`.
#[cfg(unix)]
pub fn dir_writable(dir: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};

    access(dir, AccessFlags::W_OK).is_ok()
}

/// Whether the current user may create files in `dir`.
#[cfg(not(unix))]
pub fn dir_writable(dir: &Path) -> bool {
    fs::metadata(dir)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

fn is_dir(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Check that `base` and `active` can be used as output files.
///
/// Neither may be an existing directory, and their directory must exist and
/// be writable.
pub fn check_output_location(base: &Path, active: &Path) -> Result<(), CliError> {
    for path in [base, active] {
        if is_dir(path) {
            return Err(CliError::BaseIsDirectory(path.to_path_buf()));
        }
    }

    let dir = output_dir(base);
    let meta = match fs::metadata(&dir) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CliError::DirectoryMissing(dir));
        }
        Err(e) => {
            return Err(CliError::Inspect {
                path: dir,
                message: e.to_string(),
            });
        }
    };

    if !meta.is_dir() {
        return Err(CliError::NotADirectory(dir));
    }
    if !dir_writable(&dir) {
        return Err(CliError::DirectoryNotWritable(dir));
    }
    Ok(())
}
