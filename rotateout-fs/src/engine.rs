//! Rotation engine.
//!
//! Owns the open active file and the rotation policy. The byte pump calls
//! [`RotationEngine::maybe_rotate`] at every chunk boundary and
//! [`RotationEngine::write`] for every chunk; all creates, renames and opens
//! of output files happen here.

use std::io::{self, Write};
use std::path::PathBuf;

use rotateout_clock::Clock;
use thiserror::Error;

use crate::filesystem::{Filesystem, FsError};
use crate::naming::{next_rotated_path, NamingError, OutputTarget};
use crate::policy::{RotationPolicy, RotationThresholds, RotationTrigger};

/// Errors from the rotation engine. All of them are fatal to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("failed to rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to close {}: {source}", .path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not open", .0.display())]
    NotOpen(PathBuf),

    #[error(transparent)]
    Naming(#[from] NamingError),
}

/// A completed rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub trigger: RotationTrigger,
    /// Where the previous active file now lives.
    pub rotated_to: PathBuf,
    /// Bytes written to it during its epoch.
    pub bytes: u64,
}

/// Writes into `<base><suffix>` and rotates it out of the way when the
/// policy says so.
pub struct RotationEngine<F: Filesystem, C: Clock> {
    fs: F,
    clock: C,
    target: OutputTarget,
    policy: RotationPolicy,
    file: Option<F::File>,
    rotations: u64,
}

impl<F: Filesystem, C: Clock> RotationEngine<F, C> {
    /// Create an engine. Nothing is opened until [`RotationEngine::start`].
    pub fn new(fs: F, clock: C, target: OutputTarget, thresholds: RotationThresholds) -> Self {
        Self {
            fs,
            clock,
            target,
            policy: RotationPolicy::new(thresholds),
            file: None,
            rotations: 0,
        }
    }

    /// Where output goes.
    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    /// Current rotation state.
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Whether the active file is currently open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Number of rotations performed so far.
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Open the active file (appending to any existing content) and start
    /// the first epoch.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.open()?;
        self.policy.reset(&self.clock);
        Ok(())
    }

    fn open(&mut self) -> Result<(), EngineError> {
        let path = self.target.active_path();
        let file = self
            .fs
            .open_append(&path)
            .map_err(|source| EngineError::Open { path, source })?;
        self.file = Some(file);
        Ok(())
    }

    /// Rotate if the policy says a threshold is exceeded.
    pub fn maybe_rotate(&mut self) -> Result<Option<Rotation>, EngineError> {
        match self.policy.check(&self.clock) {
            Some(trigger) => self.rotate(trigger).map(Some),
            None => Ok(None),
        }
    }

    /// Close, rename away, reopen fresh, start a new epoch.
    fn rotate(&mut self, trigger: RotationTrigger) -> Result<Rotation, EngineError> {
        let bytes = self.policy.epoch().map_or(0, |e| e.bytes_written());
        let active = self.target.active_path();

        self.close()?;

        let rotated_to = next_rotated_path(&self.fs, &self.clock, &self.target)?;
        self.fs
            .rename(&active, &rotated_to)
            .map_err(|source| EngineError::Rename {
                from: active,
                to: rotated_to.clone(),
                source,
            })?;

        self.open()?;
        self.policy.reset(&self.clock);
        self.rotations += 1;

        Ok(Rotation {
            trigger,
            rotated_to,
            bytes,
        })
    }

    /// Write the whole chunk to the active file and count it against the epoch.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| EngineError::NotOpen(self.target.active_path()))?;
        file.write_all(bytes).map_err(|source| EngineError::Write {
            path: self.target.active_path(),
            source,
        })?;
        self.policy.record_write(bytes.len() as u64);
        Ok(())
    }

    /// Flush and release the active file. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<(), EngineError> {
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|source| EngineError::Close {
                path: self.target.active_path(),
                source,
            })?;
        }
        Ok(())
    }
}
