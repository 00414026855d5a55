//! CLI argument parsing for rotateout.
//!
//! Flags arrive as raw strings and are turned into a [`RotateConfig`] by
//! [`Cli::validate`], which is where every configuration error surfaces.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use rotateout_fs::{OutputTarget, RotationThresholds, TimePattern};
use rotateout_units::{parse_duration, parse_size, ParseError};
use thiserror::Error;

use crate::paths::check_output_location;

/// Default suffix of the active and rotated files.
pub const DEFAULT_EXT: &str = ".log";

/// Default maximum age of the active file.
pub const DEFAULT_MAX_AGE: &str = "1w";

/// Default maximum size of the active file.
pub const DEFAULT_MAX_SIZE: &str = "1g";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("invalid time format {0:?}")]
    InvalidTimeFormat(String),

    #[error("invalid --{flag} value: {source}")]
    InvalidQuantity {
        flag: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("{} cannot be a directory", .0.display())]
    BaseIsDirectory(PathBuf),

    #[error("directory {} does not exist", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("directory {} is not writable", .0.display())]
    DirectoryNotWritable(PathBuf),

    #[error("cannot inspect {}: {message}", .path.display())]
    Inspect { path: PathBuf, message: String },
}

/// Copy stdin into <LOG_BASE_NAME><EXT>, rotating the file by size and age.
///
/// Rotated files are named <LOG_BASE_NAME>[.<time>][_NNNN]<EXT> and sort by
/// name in the order they were written. The active file <LOG_BASE_NAME><EXT>
/// always holds the newest data; read it after the rotated files.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "rotateout")]
#[command(version, long_version = LONG_VERSION, about)]
pub struct Cli {
    /// Base path of the log file, without extension.
    #[arg(value_name = "LOG_BASE_NAME")]
    pub base_name: PathBuf,

    /// strftime format of the time part of rotated file names.
    /// Example: %Y-%m-%d-%H_%M_%S
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Use UTC instead of local time for rotated file names.
    #[arg(long)]
    pub utc: bool,

    /// Log file extension.
    #[arg(short = 'e', long = "ext", default_value = DEFAULT_EXT, allow_hyphen_values = true)]
    pub ext: String,

    /// Maximum age of the active file, as decimal numbers with optional
    /// fraction followed by a unit: w, d, h, m, s (default s). 0 disables.
    /// Example: 3d12.5h
    #[arg(short = 't', long = "time", default_value = DEFAULT_MAX_AGE)]
    pub max_age: String,

    /// Maximum size of the active file, as decimal numbers with optional
    /// fraction followed by a unit: g, m, k, b (default b). 0 disables.
    /// Example: 2m512.15k100b
    #[arg(short = 's', long = "size", default_value = DEFAULT_MAX_SIZE)]
    pub max_size: String,

    /// Increase logging on stderr (-v rotations, -vv every chunk).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Validated settings the rotation engine runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotateConfig {
    pub target: OutputTarget,
    pub thresholds: RotationThresholds,
}

impl Cli {
    /// Validate the arguments and build the engine configuration.
    pub fn validate(&self) -> Result<RotateConfig, CliError> {
        let mut target = OutputTarget::new(&self.base_name, self.ext.clone()).with_utc(self.utc);
        if let Some(format) = &self.format {
            let pattern = TimePattern::new(format.clone())
                .map_err(|_| CliError::InvalidTimeFormat(format.clone()))?;
            target = target.with_time_pattern(pattern);
        }

        let max_age = parse_duration(&self.max_age)
            .map_err(|source| CliError::InvalidQuantity { flag: "time", source })?;
        let max_bytes = parse_size(&self.max_size)
            .map_err(|source| CliError::InvalidQuantity { flag: "size", source })?;

        check_output_location(&target.base_name, &target.active_path())?;

        Ok(RotateConfig {
            target,
            thresholds: RotationThresholds::new(max_bytes, max_age),
        })
    }
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
