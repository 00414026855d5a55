//! Filesystem abstraction for the rotation engine.
//!
//! The engine only ever needs three operations: open a file for appending,
//! rename a file, and ask whether a path is taken. Keeping them behind a trait
//! lets every rotation path be tested against an in-memory mock.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Trait for filesystem operations.
/// Abstracted for testing with mock implementations.
pub trait Filesystem: Send + Sync {
    /// Handle returned by [`Filesystem::open_append`].
    type File: Write + Send;

    /// Open `path` write-only in append mode, creating it if absent.
    fn open_append(&self, path: &Path) -> Result<Self::File, FsError>;

    /// Rename `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Check whether anything (file, directory or symlink) occupies `path`.
    fn exists(&self, path: &Path) -> Result<bool, FsError>;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    type File = fs::File;

    fn open_append(&self, path: &Path) -> Result<fs::File, FsError> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        Ok(options.open(path)?)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        // symlink_metadata so a dangling symlink still counts as taken
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
struct MockFailures {
    open: bool,
    rename: bool,
    write: bool,
}

/// Mock filesystem for testing.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
    failures: Arc<RwLock<MockFailures>>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all file paths, sorted lexicographically.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.read().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Get content of a specific file.
    pub fn get_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Add a file directly (for test setup).
    pub fn add_file(&self, path: PathBuf, data: Vec<u8>) {
        self.files.write().unwrap().insert(path, data);
    }

    /// Make every subsequent open fail.
    pub fn fail_opens(&self, fail: bool) {
        self.failures.write().unwrap().open = fail;
    }

    /// Make every subsequent rename fail.
    pub fn fail_renames(&self, fail: bool) {
        self.failures.write().unwrap().rename = fail;
    }

    /// Make every subsequent write through an open handle fail.
    pub fn fail_writes(&self, fail: bool) {
        self.failures.write().unwrap().write = fail;
    }
}

/// Handle to a file in a [`MockFilesystem`].
#[derive(Debug)]
pub struct MockFile {
    path: PathBuf,
    fs: MockFilesystem,
}

impl Write for MockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fs.failures.read().unwrap().write {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }
        let mut files = self.fs.files.write().unwrap();
        files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Filesystem for MockFilesystem {
    type File = MockFile;

    fn open_append(&self, path: &Path) -> Result<MockFile, FsError> {
        if self.failures.read().unwrap().open {
            return Err(FsError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected open failure: {}", path.display()),
            )));
        }
        self.files
            .write()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default();
        Ok(MockFile {
            path: path.to_path_buf(),
            fs: self.clone(),
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        if self.failures.read().unwrap().rename {
            return Err(FsError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected rename failure: {}", from.display()),
            )));
        }
        let mut files = self.files.write().unwrap();
        let data = files.remove(from).ok_or_else(|| {
            FsError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", from.display()),
            ))
        })?;
        files.insert(to.to_path_buf(), data);
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        Ok(self.files.read().unwrap().contains_key(path))
    }
}
