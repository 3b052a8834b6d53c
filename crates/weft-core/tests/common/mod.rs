// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use weft_core::{Brain, NodeId};

/// Fixed seed so every test run walks the same RNG sequence.
pub const SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Creates a seeded brain backed by a file inside `dir`.
pub fn scratch_brain(dir: &TempDir, name: &str) -> Brain {
    Brain::create_seeded(dir.path().join(name), SEED).expect("create brain")
}

/// Path helper for tests that manage brain files by hand.
pub fn brain_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// Ingests `line` as a completed sequence, `reps` times.
pub fn train(brain: &mut Brain, line: &str, reps: usize) {
    for _ in 0..reps {
        brain.ingest(line.as_bytes(), true).expect("train ingest");
    }
}

/// Clears the wave and ingests `prefix` as an open sequence.
pub fn prime(brain: &mut Brain, prefix: &str) {
    brain.reset_wave();
    brain.ingest(prefix.as_bytes(), false).expect("prime ingest");
}

/// Node id for a single-byte payload, panicking if it was never interned.
pub fn byte_node(brain: &Brain, byte: u8) -> NodeId {
    brain
        .interns()
        .lookup(brain.graph(), &[byte])
        .unwrap_or_else(|| panic!("byte {byte:#04x} was never interned"))
}

/// Node id for an arbitrary payload, if present.
pub fn payload_node(brain: &Brain, payload: &[u8]) -> Option<NodeId> {
    brain.interns().lookup(brain.graph(), payload)
}
