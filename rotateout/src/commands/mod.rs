//! Command orchestration.
//!
//! The binary does one thing, exposed as [`execute_rotate`]. Everything it
//! touches (filesystem, clock, input, logger) is passed in.

pub mod rotate;

pub use rotate::execute_rotate;

use crate::cli::CliError;
use crate::pump::PumpError;
use rotateout_fs::EngineError;
use thiserror::Error;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("output error: {0}")]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Pump(#[from] PumpError),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;
