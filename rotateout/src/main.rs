//! rotateout binary.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use rotateout::exit::{codes, exit_code};
use rotateout::{execute_rotate, Cli, CommandError, StderrLogger, Verbosity};
use rotateout_clock::SystemClock;
use rotateout_fs::RealFilesystem;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = StderrLogger::new(Verbosity::from_count(cli.verbose));

    match run(&cli, &logger) {
        Ok(()) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

fn run(cli: &Cli, logger: &StderrLogger) -> Result<(), CommandError> {
    let config = cli.validate()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    execute_rotate(&config, RealFilesystem, SystemClock, &mut input, logger)?;
    Ok(())
}
