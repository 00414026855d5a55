//! Byte pump from the input stream into the rotation engine.

use std::io::{self, Read};

use rotateout_clock::Clock;
use rotateout_fs::{EngineError, Filesystem, RotationEngine};
use thiserror::Error;

use crate::logger::Logger;

/// Size of each read from the input.
pub const CHUNK_SIZE: usize = 4096;

/// Errors from the pump loop.
#[derive(Debug, Error)]
pub enum PumpError {
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Totals for one run of the pump.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpSummary {
    pub bytes: u64,
    pub chunks: u64,
    pub rotations: u64,
}

/// Copy `input` into the engine until end of stream.
///
/// The engine is closed on every exit path; if both the copy and the close
/// fail, the copy error is reported.
pub fn pump<R, F, C, L>(
    input: &mut R,
    engine: &mut RotationEngine<F, C>,
    logger: &L,
) -> Result<PumpSummary, PumpError>
where
    R: Read,
    F: Filesystem,
    C: Clock,
    L: Logger,
{
    let copied = copy_chunks(input, engine, logger);
    let closed = engine.close();
    let summary = copied?;
    closed?;
    Ok(summary)
}

fn copy_chunks<R, F, C, L>(
    input: &mut R,
    engine: &mut RotationEngine<F, C>,
    logger: &L,
) -> Result<PumpSummary, PumpError>
where
    R: Read,
    F: Filesystem,
    C: Clock,
    L: Logger,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut summary = PumpSummary::default();

    loop {
        // Checked before every read, so a file that crossed a threshold with
        // the last chunk is still rotated when the stream ends.
        if let Some(rotation) = engine.maybe_rotate()? {
            summary.rotations += 1;
            logger.verbose(&format!(
                "rotated {} to {} ({}, {} bytes)",
                engine.target().active_path().display(),
                rotation.rotated_to.display(),
                rotation.trigger,
                rotation.bytes
            ));
        }

        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PumpError::Read(e)),
        };

        engine.write(&buf[..n])?;
        summary.bytes += n as u64;
        summary.chunks += 1;
        logger.debug(&format!("wrote {} bytes", n));
    }

    Ok(summary)
}
