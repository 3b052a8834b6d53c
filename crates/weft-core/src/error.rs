// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error type shared by every public brain operation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the engine.
///
/// Ingestion, generation, and feedback are transactional in memory: when a
/// call returns an error, no visible state change has occurred.
#[derive(Debug, Error)]
pub enum BrainError {
    /// Persistence or backing-store failure.
    #[error("brain file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// `create` was asked to write a path that already holds a file.
    #[error("brain file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// Magic/checksum mismatch, truncated section, or an inconsistent
    /// record table.
    #[error("brain file corrupt: {0}")]
    Corrupt(String),
    /// The brain file was written by an incompatible format version.
    #[error("brain file version {found} is not supported (expected {expected})")]
    VersionMismatch {
        /// Version field found in the file header.
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },
    /// Node/edge id space or the payload arena is exhausted.
    #[error("resource exhausted: {0}")]
    Resource(&'static str),
    /// `generate` was called with an empty wave: nothing has been ingested
    /// since the last completed sequence, so there is no starting node.
    #[error("generation requires a primed wave")]
    Empty,
}
