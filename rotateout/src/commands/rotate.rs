//! The rotate command: open the active file and pump the input into it.

use std::io::Read;

use rotateout_clock::Clock;
use rotateout_fs::{Filesystem, RotationEngine};

use super::CommandResult;
use crate::cli::RotateConfig;
use crate::logger::Logger;
use crate::pump::{pump, PumpSummary};

/// Run rotation until `input` is exhausted.
pub fn execute_rotate<F, C, R, L>(
    config: &RotateConfig,
    fs: F,
    clock: C,
    input: &mut R,
    logger: &L,
) -> CommandResult<PumpSummary>
where
    F: Filesystem,
    C: Clock,
    R: Read,
    L: Logger,
{
    let target = &config.target;
    let thresholds = config.thresholds;

    logger.verbose(&format!("writing to {}", target.active_path().display()));
    logger.verbose(&format!(
        "max size: {}, max age: {}",
        describe_limit(thresholds.max_bytes, |b| format!("{} bytes", b)),
        describe_limit(thresholds.max_age.as_secs_f64(), |s| format!("{}s", s)),
    ));
    if let Some(pattern) = &target.time_pattern {
        logger.verbose(&format!(
            "time format: {} ({})",
            pattern.as_str(),
            if target.use_utc { "UTC" } else { "local time" }
        ));
    }

    let mut engine = RotationEngine::new(fs, clock, target.clone(), thresholds);
    engine.start()?;

    let summary = pump(input, &mut engine, logger)?;

    logger.verbose(&format!(
        "end of input: {} bytes in {} chunks, {} rotations",
        summary.bytes, summary.chunks, summary.rotations
    ));
    Ok(summary)
}

fn describe_limit<T: PartialEq + Default>(value: T, show: impl Fn(T) -> String) -> String {
    if value == T::default() {
        "disabled".to_string()
    } else {
        show(value)
    }
}
