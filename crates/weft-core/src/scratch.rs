// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Copy-on-write scratchpad for transactional mutation.
//!
//! Ingestion and feedback never touch the arenas directly. They stage
//! every mutation here — fresh rows for new nodes/edges, cloned rows for
//! touched existing ones — while reading through the overlay so the walk
//! sees its own effects. `commit` applies the staged rows to the store in
//! one pass; dropping the scratchpad instead discards the whole call, which
//! is what makes `Resource` failures invisible to later operations.

use bytes::Bytes;
use rustc_hash::FxHashMap;

use crate::error::BrainError;
use crate::graph::{GraphStore, TransitionKey};
use crate::ident::{payload_key, EdgeId, NodeId, PayloadKey};
use crate::intern::InternTable;
use crate::record::{EdgeRecord, NodeRecord};

/// Staged mutations for one ingest or feedback call.
#[derive(Debug)]
pub(crate) struct Scratch {
    /// Staged node rows: freshly created and copy-on-write clones.
    nodes: FxHashMap<NodeId, NodeRecord>,
    /// Staged edge rows, same discipline.
    edges: FxHashMap<EdgeId, EdgeRecord>,
    /// Payload keys claimed by staged nodes.
    interned: FxHashMap<PayloadKey, NodeId>,
    /// Transition triples claimed by staged edges.
    transitions: FxHashMap<TransitionKey, EdgeId>,
    /// Creation order; commit replays it so arena slots match ids.
    created_nodes: Vec<NodeId>,
    created_edges: Vec<EdgeId>,
    next_node: u32,
    next_edge: u32,
    /// Committed plus staged payload bytes; offsets must stay in u32.
    payload_bytes: u64,
}

impl Scratch {
    /// Opens a scratchpad over the store's current high-water marks.
    pub(crate) fn new(store: &GraphStore) -> Self {
        Self {
            nodes: FxHashMap::default(),
            edges: FxHashMap::default(),
            interned: FxHashMap::default(),
            transitions: FxHashMap::default(),
            created_nodes: Vec::new(),
            created_edges: Vec::new(),
            next_node: store.node_count() as u32,
            next_edge: store.edge_count() as u32,
            payload_bytes: store.payload_bytes,
        }
    }

    /// Node count as the walk sees it (committed + staged creations).
    pub(crate) fn node_count(&self, store: &GraphStore) -> usize {
        store.node_count() + self.created_nodes.len()
    }

    /// Reads a node through the overlay.
    pub(crate) fn node<'a>(&'a self, store: &'a GraphStore, id: NodeId) -> Option<&'a NodeRecord> {
        self.nodes.get(&id).or_else(|| store.node(id))
    }

    /// Reads an edge through the overlay.
    pub(crate) fn edge<'a>(&'a self, store: &'a GraphStore, id: EdgeId) -> Option<&'a EdgeRecord> {
        self.edges.get(&id).or_else(|| store.edge(id))
    }

    /// Mutable access to a node row, cloning it into the overlay on first
    /// touch.
    pub(crate) fn node_mut(
        &mut self,
        store: &GraphStore,
        id: NodeId,
    ) -> Option<&mut NodeRecord> {
        if !self.nodes.contains_key(&id) {
            let row = store.node(id)?.clone();
            self.nodes.insert(id, row);
        }
        self.nodes.get_mut(&id)
    }

    /// Mutable access to an edge row, cloning it into the overlay on first
    /// touch.
    pub(crate) fn edge_mut(
        &mut self,
        store: &GraphStore,
        id: EdgeId,
    ) -> Option<&mut EdgeRecord> {
        if !self.edges.contains_key(&id) {
            let row = store.edge(id)?.clone();
            self.edges.insert(id, row);
        }
        self.edges.get_mut(&id)
    }

    /// Looks a payload up through the overlay, verifying bytes on key hit.
    pub(crate) fn lookup_payload(
        &self,
        store: &GraphStore,
        table: &InternTable,
        payload: &[u8],
    ) -> Option<NodeId> {
        if let Some(&id) = self.interned.get(&payload_key(payload)) {
            let node = self.node(store, id)?;
            if node.payload.as_ref() == payload {
                return Some(id);
            }
        }
        table.lookup(store, payload)
    }

    /// Returns the node for `payload`, creating it if absent.
    ///
    /// The boolean is `true` when the node was created by this call.
    /// `level` and `children` only apply to a creation; an existing node
    /// keeps whatever it was born with.
    pub(crate) fn intern(
        &mut self,
        store: &GraphStore,
        table: &InternTable,
        payload: &[u8],
        level: u32,
        children: Vec<NodeId>,
    ) -> Result<(NodeId, bool), BrainError> {
        if let Some(id) = self.lookup_payload(store, table, payload) {
            return Ok((id, false));
        }
        if self.next_node >= NodeId::STOP.0 {
            return Err(BrainError::Resource("node id space exhausted"));
        }
        if self.payload_bytes + payload.len() as u64 > u64::from(u32::MAX) {
            return Err(BrainError::Resource("payload arena full"));
        }
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.payload_bytes += payload.len() as u64;
        let row = NodeRecord::new(Bytes::copy_from_slice(payload), level, children);
        self.nodes.insert(id, row);
        self.interned.insert(payload_key(payload), id);
        self.created_nodes.push(id);
        Ok((id, true))
    }

    /// Returns the edge for `(from, to, is_stop)`, creating it (weight 0,
    /// no tags) if absent. The boolean is `true` on creation.
    ///
    /// This is the only seam that mints edges, and its callers bind
    /// strictly previous-to-current, which is what keeps every edge
    /// pointing forward in input order.
    pub(crate) fn add_edge(
        &mut self,
        store: &GraphStore,
        from: NodeId,
        to: NodeId,
        is_stop: bool,
    ) -> Result<(EdgeId, bool), BrainError> {
        let key = (from, to, is_stop);
        if let Some(&id) = self.transitions.get(&key) {
            return Ok((id, false));
        }
        if let Some(id) = store.transition(from, to, is_stop) {
            return Ok((id, false));
        }
        if self.next_edge == u32::MAX {
            return Err(BrainError::Resource("edge id space exhausted"));
        }
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        let row = EdgeRecord::new(id, from, to, is_stop, 0.0);
        self.edges.insert(id, row);
        self.transitions.insert(key, id);
        self.created_edges.push(id);
        if let Some(source) = self.node_mut(store, from) {
            source.outgoing.push(id);
        } else {
            debug_assert!(false, "edge source missing from overlay: {from:?}");
        }
        if !is_stop {
            if let Some(target) = self.node_mut(store, to) {
                target.incoming.push(id);
            } else {
                debug_assert!(false, "edge target missing from overlay: {to:?}");
            }
        }
        Ok((id, true))
    }

    /// Applies every staged row to the store and intern table.
    pub(crate) fn commit(mut self, store: &mut GraphStore, table: &mut InternTable) {
        for id in &self.created_nodes {
            if let Some(row) = self.nodes.remove(id) {
                debug_assert_eq!(store.node_count(), id.index(), "node id / slot drift");
                table.insert(&row.payload, *id);
                store.push_node(row);
            } else {
                debug_assert!(false, "created node row missing: {id:?}");
            }
        }
        for (id, row) in self.nodes.drain() {
            if let Some(slot) = store.node_mut(id) {
                *slot = row;
            } else {
                debug_assert!(false, "overlay row for unknown node: {id:?}");
            }
        }
        for id in &self.created_edges {
            if let Some(row) = self.edges.remove(id) {
                debug_assert_eq!(store.edge_count(), id.index(), "edge id / slot drift");
                store.push_edge(row);
            } else {
                debug_assert!(false, "created edge row missing: {id:?}");
            }
        }
        for (id, row) in self.edges.drain() {
            if let Some(slot) = store.edge_mut(id) {
                *slot = row;
            } else {
                debug_assert!(false, "overlay row for unknown edge: {id:?}");
            }
        }
    }
}
