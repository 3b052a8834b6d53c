// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hierarchy formation: promoting hot transitions into span nodes.
//!
//! When an edge between two same-level nodes has been traversed often
//! enough, the pair is worth remembering as a single unit: a new node is
//! interned whose payload is the concatenation of both spans, one level
//! up. Edges around the pair whose context already associates the two are
//! cloned onto the new node with a small seed weight, so the generator can
//! reach it and emit the whole span in one step. The original edge is left
//! untouched — promotion is strictly additive.

use crate::constants::{HIERARCHY_CLONE_WEIGHT, PAYLOAD_MAX, PROMOTION_FLOOR};
use crate::error::BrainError;
use crate::graph::GraphStore;
use crate::ident::EdgeId;
use crate::intern::InternTable;
use crate::scratch::Scratch;

/// Adaptive promotion threshold: `max(3, ⌈log2(node_count + 1)⌉)`.
///
/// Grows with the graph so a large brain demands more evidence before it
/// mints yet another span node.
pub(crate) fn promotion_threshold(node_count: usize) -> u64 {
    let n = node_count + 1;
    let mut ceil_log2 = u64::from(n.ilog2());
    if !n.is_power_of_two() {
        ceil_log2 += 1;
    }
    PROMOTION_FLOOR.max(ceil_log2)
}

/// Considers promoting the just-strengthened edge into a hierarchy node.
///
/// No-op unless the edge joins two same-level nodes, has crossed the
/// adaptive threshold, the concatenated payload fits the payload bound,
/// and that payload is not already interned.
pub(crate) fn consider(
    scratch: &mut Scratch,
    store: &GraphStore,
    table: &InternTable,
    edge_id: EdgeId,
) -> Result<(), BrainError> {
    let Some(edge) = scratch.edge(store, edge_id) else {
        debug_assert!(false, "promotion candidate missing: {edge_id:?}");
        return Ok(());
    };
    if edge.is_stop {
        return Ok(());
    }
    let (a, b, activations) = (edge.from, edge.to, edge.activations);

    let (Some(node_a), Some(node_b)) = (scratch.node(store, a), scratch.node(store, b)) else {
        debug_assert!(false, "promotion endpoints missing: {a:?} -> {b:?}");
        return Ok(());
    };
    if node_a.level != node_b.level {
        return Ok(());
    }
    if activations < promotion_threshold(scratch.node_count(store)) {
        return Ok(());
    }
    if node_a.payload.len() + node_b.payload.len() > PAYLOAD_MAX {
        return Ok(());
    }

    let mut payload = Vec::with_capacity(node_a.payload.len() + node_b.payload.len());
    payload.extend_from_slice(&node_a.payload);
    payload.extend_from_slice(&node_b.payload);
    let level = node_a.level + 1;
    if scratch.lookup_payload(store, table, &payload).is_some() {
        // Already promoted (or the span collides with an existing node);
        // promotion is idempotent.
        return Ok(());
    }

    let (span, created) = scratch.intern(store, table, &payload, level, vec![a, b])?;
    debug_assert!(created, "intern raced its own lookup");

    // Snapshot both adjacency lists before cloning anything, so the
    // clones themselves cannot feed the second loop.
    let inbound: Vec<EdgeId> = scratch
        .node(store, a)
        .map(|n| n.incoming.clone())
        .unwrap_or_default();
    let outbound: Vec<EdgeId> = scratch
        .node(store, b)
        .map(|n| n.outgoing.clone())
        .unwrap_or_default();

    // Inbound clones: anyone who reached `a` while `b` was already in
    // context can now reach the fused span directly.
    for eid in inbound {
        let Some(source_edge) = scratch.edge(store, eid) else {
            continue;
        };
        if !source_edge.tags.contains(b) {
            continue;
        }
        let (x, tags) = (source_edge.from, source_edge.tags.clone());
        let (clone_id, fresh) = scratch.add_edge(store, x, span, false)?;
        if fresh {
            if let Some(clone) = scratch.edge_mut(store, clone_id) {
                clone.weight = HIERARCHY_CLONE_WEIGHT;
                clone.tags = tags;
            }
        }
    }

    // Outbound clones, symmetrically: wherever `b` led while `a` was in
    // context, the span leads too. Stop edges clone as stop edges.
    for eid in outbound {
        let Some(source_edge) = scratch.edge(store, eid) else {
            continue;
        };
        if !source_edge.tags.contains(a) {
            continue;
        }
        let (y, is_stop, tags) = (
            source_edge.to,
            source_edge.is_stop,
            source_edge.tags.clone(),
        );
        let (clone_id, fresh) = scratch.add_edge(store, span, y, is_stop)?;
        if fresh {
            if let Some(clone) = scratch.edge_mut(store, clone_id) {
                clone.weight = HIERARCHY_CLONE_WEIGHT;
                clone.tags = tags;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_floors_at_three() {
        assert_eq!(promotion_threshold(0), 3);
        assert_eq!(promotion_threshold(2), 3);
        assert_eq!(promotion_threshold(7), 3);
    }

    #[test]
    fn threshold_tracks_log2_for_big_graphs() {
        assert_eq!(promotion_threshold(15), 4);
        assert_eq!(promotion_threshold(1023), 10);
        assert_eq!(promotion_threshold(1024), 11);
    }
}
