//! Exit codes for rotateout.

use rotateout_fs::{EngineError, NamingError};

use crate::commands::CommandError;
use crate::pump::PumpError;

/// Exit code constants.
pub mod codes {
    /// Input fully copied.
    pub const SUCCESS: i32 = 0;
    /// Reading, writing, renaming or opening failed.
    pub const IO_ERROR: i32 = 1;
    /// Invalid arguments.
    pub const INVALID_ARGS: i32 = 2;
    /// Every disambiguated rotated name was already taken.
    pub const NAMES_EXHAUSTED: i32 = 3;
}

fn engine_exit_code(error: &EngineError) -> i32 {
    match error {
        EngineError::Naming(NamingError::Exhausted { .. }) => codes::NAMES_EXHAUSTED,
        _ => codes::IO_ERROR,
    }
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Engine(e) | CommandError::Pump(PumpError::Engine(e)) => engine_exit_code(e),
        CommandError::Pump(PumpError::Read(_)) => codes::IO_ERROR,
    }
}
