// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph record types: nodes and edges.

use bytes::Bytes;

use crate::ident::{EdgeId, NodeId};
use crate::tags::ContextTags;

/// Materialised record for a single node stored in the graph.
///
/// Invariants
/// - `payload` is 1..=256 bytes and immutable for the node's lifetime.
/// - No two live nodes share a payload (interning enforces uniqueness).
/// - `level` is 0 for single-byte nodes; a hierarchy node's level is one
///   above its children's common level.
/// - `outgoing`/`incoming` are insertion-ordered and never reordered;
///   because edge ids are assigned monotonically, both lists are also
///   ascending by id.
#[derive(Clone, Debug)]
pub struct NodeRecord {
    /// Immutable byte span this node stands for.
    pub payload: Bytes,
    /// Abstraction level; 0 for raw bytes, ≥ 1 for hierarchy nodes.
    pub level: u32,
    /// Monotonic count of ingestion selections and generation emissions.
    pub activations: u64,
    /// Outgoing edge ids in creation order (stop edges included).
    pub outgoing: Vec<EdgeId>,
    /// Incoming edge ids in creation order.
    pub incoming: Vec<EdgeId>,
    /// Child nodes recorded when a hierarchy node is formed; empty for
    /// level-0 nodes. In-memory lineage only — the brain file does not
    /// carry it, so loaded hierarchy nodes report no children.
    pub children: Vec<NodeId>,
}

impl NodeRecord {
    /// Creates a fresh record with zeroed counters and no adjacency.
    #[must_use]
    pub fn new(payload: Bytes, level: u32, children: Vec<NodeId>) -> Self {
        Self {
            payload,
            level,
            activations: 0,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            children,
        }
    }
}

/// Materialised record for a single directed edge.
///
/// Invariants
/// - `from` is a live node; `to` is a live node unless `is_stop`, in which
///   case it is [`NodeId::STOP`].
/// - At most one edge exists per `(from, to, is_stop)` triple.
/// - `weight` is finite and nonnegative; scoring clamps anything else.
/// - Edges always point forward in input order; the ingestion walk is the
///   only creator of regular edges and binds them previous-to-current.
#[derive(Clone, Debug)]
pub struct EdgeRecord {
    /// Stable identifier for the edge.
    pub id: EdgeId,
    /// Source node identifier.
    pub from: NodeId,
    /// Destination node identifier, or [`NodeId::STOP`] for stop edges.
    pub to: NodeId,
    /// Selecting this edge during generation ends the walk.
    pub is_stop: bool,
    /// Hebbian transition weight.
    pub weight: f32,
    /// Count of successful traversals.
    pub activations: u64,
    /// Bounded context-tag multiset for this transition.
    pub tags: ContextTags,
}

impl EdgeRecord {
    /// Creates a fresh, untraversed edge with the given initial weight.
    #[must_use]
    pub fn new(id: EdgeId, from: NodeId, to: NodeId, is_stop: bool, weight: f32) -> Self {
        Self {
            id,
            from,
            to,
            is_stop,
            weight,
            activations: 0,
            tags: ContextTags::new(),
        }
    }
}
