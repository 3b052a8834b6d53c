// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier and payload-hashing utilities.
use blake3::Hasher;

/// 256-bit content key for a payload byte span.
pub type PayloadKey = [u8; 32];

/// Strongly typed identifier for a node in the graph.
///
/// Ids are dense `u32` arena indices assigned monotonically at creation and
/// never reused while the node exists. [`NodeId::STOP`] is a reserved
/// sentinel that marks the target of stop edges; it never addresses a real
/// arena slot.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Distinguished stop sentinel. Stop edges point here instead of at a
    /// live node; the walk terminates when one is selected.
    pub const STOP: Self = Self(u32::MAX);

    /// Returns the arena index for this id.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this id is the stop sentinel.
    #[must_use]
    pub fn is_stop(self) -> bool {
        self == Self::STOP
    }
}

/// Strongly typed identifier for a directed edge.
///
/// Same dense-arena discipline as [`NodeId`]; edge ids are monotonic, so
/// adjacency lists built in creation order are also sorted by id.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Returns the arena index for this id.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Computes the BLAKE3 content key of a payload byte span.
///
/// Content-only, no domain prefix: two equal byte spans are the same
/// payload regardless of how they were produced. Deduplication across
/// input sequences is the point — it is what lets hierarchy formation
/// compound knowledge from different patterns.
pub fn payload_key(payload: &[u8]) -> PayloadKey {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_payloads_share_a_key() {
        assert_eq!(payload_key(b"abc"), payload_key(b"abc"));
        assert_ne!(payload_key(b"abc"), payload_key(b"abd"));
    }

    #[test]
    fn stop_sentinel_is_not_an_index() {
        assert!(NodeId::STOP.is_stop());
        assert!(!NodeId(0).is_stop());
    }
}
