// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory graph store: dense node/edge arenas plus a transition index.
//!
//! Nodes and edges live in `Vec` arenas addressed by their dense ids;
//! adjacency lists hold ids, never references, so there are no aliased
//! pointers to keep honest. Insertion order is preserved everywhere
//! because ids are assigned monotonically.

use rustc_hash::FxHashMap;

use crate::ident::{EdgeId, NodeId};
use crate::record::{EdgeRecord, NodeRecord};

/// Key for the `(from, to, is_stop)` uniqueness index.
pub(crate) type TransitionKey = (NodeId, NodeId, bool);

/// Node and edge arenas with an idempotency index over transitions.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
    pub(crate) nodes: Vec<NodeRecord>,
    pub(crate) edges: Vec<EdgeRecord>,
    /// `(from, to, is_stop)` → edge id; enforces at most one edge per
    /// transition triple.
    pub(crate) transitions: FxHashMap<TransitionKey, EdgeId>,
    /// Total payload bytes across all nodes; bounds the on-disk arena.
    pub(crate) payload_bytes: u64,
}

impl GraphStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live edges (stop edges included).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns a shared reference to a node when it exists.
    ///
    /// The stop sentinel is not a node and always returns `None`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        if id.is_stop() {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Returns a shared reference to an edge when it exists.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRecord> {
        self.edges.get(id.index())
    }

    /// Returns the edge id registered for a transition triple, if any.
    #[must_use]
    pub fn transition(&self, from: NodeId, to: NodeId, is_stop: bool) -> Option<EdgeId> {
        self.transitions.get(&(from, to, is_stop)).copied()
    }

    /// Outgoing edge ids of `id` in creation order (empty for unknown ids).
    #[must_use]
    pub fn outgoing(&self, id: NodeId) -> &[EdgeId] {
        self.node(id).map_or(&[], |n| n.outgoing.as_slice())
    }

    /// Incoming edge ids of `id` in creation order (empty for unknown ids).
    #[must_use]
    pub fn incoming(&self, id: NodeId) -> &[EdgeId] {
        self.node(id).map_or(&[], |n| n.incoming.as_slice())
    }

    /// Iterates `(id, record)` over all nodes in id order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &NodeRecord)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Iterates all edges in id order.
    pub fn iter_edges(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.edges.iter()
    }

    /// Sum of node activation counters, the `activations_total` statistic.
    #[must_use]
    pub fn activations_total(&self) -> u64 {
        self.nodes.iter().map(|n| n.activations).sum()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
        if id.is_stop() {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> Option<&mut EdgeRecord> {
        self.edges.get_mut(id.index())
    }

    /// Appends a committed node row; the scratchpad guarantees the id
    /// matches the next arena slot.
    pub(crate) fn push_node(&mut self, record: NodeRecord) {
        self.payload_bytes += record.payload.len() as u64;
        self.nodes.push(record);
    }

    /// Appends a committed edge row and registers its transition triple.
    pub(crate) fn push_edge(&mut self, record: EdgeRecord) {
        self.transitions
            .insert((record.from, record.to, record.is_stop), record.id);
        self.edges.push(record);
    }
}
