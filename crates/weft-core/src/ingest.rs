// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ingestion: folds a byte stream into the graph.
//!
//! One pass, strictly in arrival order. Each byte is interned as a level-0
//! node, bound to its predecessor with a forward edge, Hebbian-strengthened
//! and context-tagged, then pushed onto the wave. A completed sequence
//! additionally trains a stop edge at its final node and resets the wave.
//!
//! Everything runs against the caller's scratchpad; the caller commits on
//! success or drops the scratchpad on error, so a failed call leaves no
//! trace.

use crate::constants::TAG_DECAY;
use crate::error::BrainError;
use crate::graph::GraphStore;
use crate::hierarchy;
use crate::ident::{EdgeId, NodeId};
use crate::intern::InternTable;
use crate::scratch::Scratch;
use crate::wave::Wave;

/// Runs the ingestion walk over `bytes`.
pub(crate) fn run(
    store: &GraphStore,
    table: &InternTable,
    scratch: &mut Scratch,
    wave: &mut Wave,
    bytes: &[u8],
    complete: bool,
) -> Result<(), BrainError> {
    for &byte in bytes {
        let (target, _) = scratch.intern(store, table, &[byte], 0, Vec::new())?;

        let mut traversed: Option<EdgeId> = None;
        if let Some(source) = wave.last() {
            let (edge_id, _) = scratch.add_edge(store, source, target, false)?;
            strengthen(scratch, store, edge_id, wave);
            traversed = Some(edge_id);
        }

        if let Some(node) = scratch.node_mut(store, target) {
            node.activations += 1;
        } else {
            debug_assert!(false, "interned node missing from overlay: {target:?}");
        }
        wave.push(target);

        if let Some(edge_id) = traversed {
            hierarchy::consider(scratch, store, table, edge_id)?;
        }
    }

    if complete {
        if let Some(last) = wave.last() {
            let (edge_id, _) = scratch.add_edge(store, last, NodeId::STOP, true)?;
            strengthen(scratch, store, edge_id, wave);
        }
        wave.clear();
    }

    Ok(())
}

/// Hebbian strengthen: first bind adds 1.0, later binds decay as
/// `1 / (1 + activations)`. Existing tags fade by γ, then every context
/// entry of the wave (all but the source occurrence at the tail) deposits
/// one unit of strength.
fn strengthen(scratch: &mut Scratch, store: &GraphStore, edge_id: EdgeId, wave: &Wave) {
    let Some(edge) = scratch.edge_mut(store, edge_id) else {
        debug_assert!(false, "strengthened edge missing from overlay: {edge_id:?}");
        return;
    };
    let alpha = if edge.activations == 0 {
        1.0
    } else {
        1.0 / (1.0 + edge.activations as f32)
    };
    edge.weight += alpha;
    edge.activations += 1;
    edge.tags.decay(TAG_DECAY);
    for node in wave.context() {
        edge.tags.add(node, 1.0);
    }
}
