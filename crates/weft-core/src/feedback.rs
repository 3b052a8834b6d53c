// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Supervised feedback over the last generation walk.
//!
//! Replays the recorded steps against the continuation the caller says was
//! correct. At each step the edge that *should* have been taken is the
//! outgoing edge whose target payload is the longest prefix of the
//! remaining expected bytes; a missing correct edge is created on the spot
//! (to the single-byte node for the next expected byte). Matches are
//! rewarded multiplicatively, mismatches punished, and processing stops at
//! the first divergence — past that point the recorded walk stands on
//! nodes the correct path never visits.

use crate::constants::FEEDBACK_RATE;
use crate::error::BrainError;
use crate::generate::WalkStep;
use crate::graph::GraphStore;
use crate::ident::EdgeId;
use crate::intern::InternTable;
use crate::scratch::Scratch;

/// Applies feedback for `expected` along the recorded walk.
pub(crate) fn run(
    store: &GraphStore,
    table: &InternTable,
    scratch: &mut Scratch,
    walk: &[WalkStep],
    expected: &[u8],
) -> Result<(), BrainError> {
    let reward = 1.0 + FEEDBACK_RATE;
    let penalty = 1.0 - FEEDBACK_RATE;
    let mut cursor = 0usize;

    for step in walk {
        if cursor >= expected.len() {
            break;
        }
        let remaining = &expected[cursor..];

        let correct = match existing_correct(store, scratch, step, remaining) {
            Some(found) => found,
            None => create_correct(store, table, scratch, step, remaining[0])?,
        };

        if step.chosen == correct.edge {
            scale_weight(store, scratch, step.chosen, reward);
            cursor += correct.emitted;
            continue;
        }

        scale_weight(store, scratch, step.chosen, penalty);
        scale_weight(store, scratch, correct.edge, reward);
        cursor += correct.emitted;
        // The walk diverged here; later steps are off the correct path.
        break;
    }

    Ok(())
}

struct Correct {
    edge: EdgeId,
    /// Bytes the correct edge would have emitted.
    emitted: usize,
}

/// Longest-prefix match among the source's existing regular edges; ties on
/// length keep the lowest edge id.
fn existing_correct(
    store: &GraphStore,
    scratch: &Scratch,
    step: &WalkStep,
    remaining: &[u8],
) -> Option<Correct> {
    let outgoing = scratch.node(store, step.source)?.outgoing.clone();
    let mut best: Option<Correct> = None;
    for eid in outgoing {
        let Some(edge) = scratch.edge(store, eid) else {
            continue;
        };
        if edge.is_stop {
            continue;
        }
        let Some(target) = scratch.node(store, edge.to) else {
            continue;
        };
        if !remaining.starts_with(target.payload.as_ref()) {
            continue;
        }
        let len = target.payload.len();
        if best.as_ref().is_none_or(|b| len > b.emitted) {
            best = Some(Correct { edge: eid, emitted: len });
        }
    }
    best
}

/// Mints the missing correct edge with the first-bind weight.
fn create_correct(
    store: &GraphStore,
    table: &InternTable,
    scratch: &mut Scratch,
    step: &WalkStep,
    next_byte: u8,
) -> Result<Correct, BrainError> {
    let (target, _) = scratch.intern(store, table, &[next_byte], 0, Vec::new())?;
    let (edge, fresh) = scratch.add_edge(store, step.source, target, false)?;
    if fresh {
        if let Some(row) = scratch.edge_mut(store, edge) {
            row.weight = 1.0;
        }
    }
    Ok(Correct { edge, emitted: 1 })
}

fn scale_weight(store: &GraphStore, scratch: &mut Scratch, edge: EdgeId, factor: f32) {
    if let Some(row) = scratch.edge_mut(store, edge) {
        row.weight = (row.weight * factor).max(0.0);
    } else {
        debug_assert!(false, "feedback touched a missing edge: {edge:?}");
    }
}
