//! rotateout: copy stdin into a log file, rotating it by size and age.
//!
//! The binary in `main.rs` is a thin shell over this library: it parses
//! arguments with [`Cli`], validates them into a [`RotateConfig`] and runs
//! [`execute_rotate`] against the real filesystem and clock.

pub mod cli;
pub mod commands;
pub mod exit;
pub mod logger;
pub mod paths;
pub mod pump;

pub use cli::{
    parse_from, Cli, CliError, RotateConfig, DEFAULT_EXT, DEFAULT_MAX_AGE, DEFAULT_MAX_SIZE,
};
pub use commands::{execute_rotate, CommandError, CommandResult};
pub use logger::{Logger, MockLogger, StderrLogger, Verbosity};
pub use pump::{pump, PumpError, PumpSummary, CHUNK_SIZE};
