// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

// Telemetry helpers for JSONL logging when the `telemetry` feature is
// enabled. Manually formats JSON to avoid a non-deterministic serde_json
// dependency in the core.

use std::io::Write as _;

fn ts_micros() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros()
}

fn emit(line: &str) {
    // Best-effort: I/O errors are ignored and timestamps fall back to 0 on
    // clock errors.
    let mut out = std::io::stdout().lock();
    let _ = out.write_all(line.as_bytes());
    let _ = out.write_all(b"\n");
}

/// Emits a telemetry event after a committed ingest.
pub(crate) fn sequence_ingested(bytes: usize, complete: bool, nodes: usize, edges: usize) {
    emit(&format!(
        r#"{{"timestamp_micros":{},"event":"ingest","bytes":{bytes},"complete":{complete},"nodes":{nodes},"edges":{edges}}}"#,
        ts_micros(),
    ));
}

/// Emits a telemetry event after a generation walk.
pub(crate) fn continuation_emitted(bytes: usize, steps: usize) {
    emit(&format!(
        r#"{{"timestamp_micros":{},"event":"generate","bytes":{bytes},"steps":{steps}}}"#,
        ts_micros(),
    ));
}

/// Emits a telemetry event after a successful save.
pub(crate) fn brain_saved(checksum: &[u8]) {
    let short = hex::encode(&checksum[..checksum.len().min(8)]);
    emit(&format!(
        r#"{{"timestamp_micros":{},"event":"save","checksum_short":"{short}"}}"#,
        ts_micros(),
    ));
}
