//! File rotation for rotateout.
//!
//! This crate provides:
//! - Filesystem trait for the few file operations rotation needs
//! - Rotated-file naming that keeps lexicographic order chronological
//! - Rotation policy over size and age thresholds
//! - RotationEngine tying the three together around the active file

pub mod engine;
pub mod filesystem;
pub mod naming;
pub mod policy;

pub use engine::{EngineError, Rotation, RotationEngine};
pub use filesystem::{Filesystem, FsError, MockFile, MockFilesystem, RealFilesystem};
pub use naming::{next_rotated_path, NamingError, OutputTarget, TimePattern, MAX_DISAMBIGUATOR};
pub use policy::{RotationEpoch, RotationPolicy, RotationThresholds, RotationTrigger};
