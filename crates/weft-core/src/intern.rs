// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Payload interning: content-addresses byte spans to node ids.
//!
//! The table maps `blake3(payload)` to a node id. A key hit is never
//! trusted blind: the stored node's payload is compared byte-for-byte
//! before the id is returned, so a hash collision degrades to a miss
//! instead of aliasing two spans onto one node.

use rustc_hash::FxHashMap;

use crate::graph::GraphStore;
use crate::ident::{payload_key, NodeId, PayloadKey};

/// Payload key → node id map.
///
/// Owns no payload bytes itself; the graph store's node arena is the
/// source of truth, and this is a content index over it.
#[derive(Clone, Debug, Default)]
pub struct InternTable {
    map: FxHashMap<PayloadKey, NodeId>,
}

impl InternTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node whose payload equals `payload`, if present.
    #[must_use]
    pub fn lookup(&self, store: &GraphStore, payload: &[u8]) -> Option<NodeId> {
        let id = *self.map.get(&payload_key(payload))?;
        let node = store.node(id)?;
        (node.payload.as_ref() == payload).then_some(id)
    }

    /// Records `id` as the owner of `payload`'s key.
    ///
    /// The caller guarantees the payload is not already interned; the
    /// ingestion scratchpad checks before allocating an id.
    pub(crate) fn insert(&mut self, payload: &[u8], id: NodeId) {
        self.map.insert(payload_key(payload), id);
    }

    /// Number of interned payloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` when nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
