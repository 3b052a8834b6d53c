// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Brain file codec: the on-disk form of a complete engine state.
//!
//! Layout (all integers little-endian, floats IEEE-754 binary32):
//!
//! ```text
//! magic          u32    "MELV"
//! version        u32
//! node_count     u32
//! node entries   id u32, payload_offset u32, payload_len u32,
//!                level u32, activations u64
//! edge_count     u32
//! edge entries   id u32, from u32, to u32, is_stop u8, weight f32,
//!                activations u64, tag_count u8,
//!                tags (node u32, strength f32) × tag_count
//! payload_len    u64
//! payload bytes  concatenated payload arena
//! rng_state      u64
//! wave_len       u32
//! wave entries   node u32 × wave_len
//! checksum       BLAKE3 of everything above, 32 bytes
//! ```
//!
//! Encoding is deterministic: entries are written in id order and
//! adjacency is rebuilt from edge order on load, so a round-trip
//! reproduces every traversal the original would make. The ephemeral
//! parts that matter for determinism — RNG state and wave — ride in the
//! trailer; hierarchy lineage (`children`) does not and is forgotten
//! across a round-trip.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::constants::{BRAIN_MAGIC, BRAIN_VERSION, WAVE_CAP};
use crate::error::BrainError;
use crate::graph::GraphStore;
use crate::ident::{EdgeId, NodeId};
use crate::intern::InternTable;
use crate::record::{EdgeRecord, NodeRecord};
use crate::tags::{ContextTags, Tag};
use crate::wave::Wave;

/// Checksum width at the end of the file.
const CHECKSUM_LEN: usize = 32;

/// Everything a brain file reconstructs.
pub(crate) struct DecodedBrain {
    pub(crate) store: GraphStore,
    pub(crate) table: InternTable,
    pub(crate) wave: Wave,
    pub(crate) rng_state: u64,
}

/// Serialises the complete engine state to brain-file bytes.
pub(crate) fn encode(store: &GraphStore, wave: &Wave, rng_state: u64) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::new();
    put_u32(&mut buf, BRAIN_MAGIC);
    put_u32(&mut buf, BRAIN_VERSION);

    put_u32(&mut buf, store.node_count() as u32);
    let mut payload_offset = 0u32;
    for (id, node) in store.iter_nodes() {
        put_u32(&mut buf, id.0);
        put_u32(&mut buf, payload_offset);
        put_u32(&mut buf, node.payload.len() as u32);
        put_u32(&mut buf, node.level);
        put_u64(&mut buf, node.activations);
        payload_offset += node.payload.len() as u32;
    }

    put_u32(&mut buf, store.edge_count() as u32);
    for edge in store.iter_edges() {
        put_u32(&mut buf, edge.id.0);
        put_u32(&mut buf, edge.from.0);
        put_u32(&mut buf, edge.to.0);
        buf.push(u8::from(edge.is_stop));
        put_f32(&mut buf, edge.weight);
        put_u64(&mut buf, edge.activations);
        buf.push(edge.tags.len() as u8);
        for tag in edge.tags.iter() {
            put_u32(&mut buf, tag.node.0);
            put_f32(&mut buf, tag.strength);
        }
    }

    put_u64(&mut buf, u64::from(payload_offset));
    for (_, node) in store.iter_nodes() {
        buf.extend_from_slice(&node.payload);
    }

    put_u64(&mut buf, rng_state);
    put_u32(&mut buf, wave.len() as u32);
    for node in wave.iter() {
        put_u32(&mut buf, node.0);
    }

    let checksum = blake3::hash(&buf);
    buf.extend_from_slice(checksum.as_bytes());
    buf
}

/// Parses and validates brain-file bytes.
pub(crate) fn decode(bytes: &[u8]) -> Result<DecodedBrain, BrainError> {
    if bytes.len() < CHECKSUM_LEN {
        return Err(BrainError::Corrupt("file shorter than its checksum".into()));
    }
    let (body, stored) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let computed = blake3::hash(body);
    if computed.as_bytes() != stored {
        return Err(BrainError::Corrupt(format!(
            "checksum mismatch: stored {}, computed {}",
            hex::encode(stored),
            hex::encode(computed.as_bytes()),
        )));
    }

    let mut r = Reader { buf: body, pos: 0 };
    let magic = r.u32()?;
    if magic != BRAIN_MAGIC {
        return Err(BrainError::Corrupt(format!("bad magic 0x{magic:08X}")));
    }
    let version = r.u32()?;
    if version != BRAIN_VERSION {
        return Err(BrainError::VersionMismatch {
            found: version,
            expected: BRAIN_VERSION,
        });
    }

    let node_count = r.u32()? as usize;
    let mut node_metas = Vec::with_capacity(node_count);
    for index in 0..node_count {
        let id = r.u32()?;
        if id as usize != index {
            return Err(BrainError::Corrupt(format!(
                "node table out of order: id {id} at slot {index}"
            )));
        }
        let offset = r.u32()?;
        let len = r.u32()?;
        let level = r.u32()?;
        let activations = r.u64()?;
        node_metas.push((offset, len, level, activations));
    }

    let edge_count = r.u32()? as usize;
    let mut edge_metas = Vec::with_capacity(edge_count);
    for index in 0..edge_count {
        let id = r.u32()?;
        if id as usize != index {
            return Err(BrainError::Corrupt(format!(
                "edge table out of order: id {id} at slot {index}"
            )));
        }
        let from = NodeId(r.u32()?);
        let to = NodeId(r.u32()?);
        let is_stop = match r.u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(BrainError::Corrupt(format!(
                    "edge {index}: bad stop flag {other}"
                )))
            }
        };
        let weight = r.f32()?;
        let activations = r.u64()?;
        let tag_count = r.u8()? as usize;
        let mut tags = Vec::with_capacity(tag_count);
        for _ in 0..tag_count {
            let node = NodeId(r.u32()?);
            let strength = r.f32()?;
            tags.push(Tag { node, strength });
        }
        edge_metas.push((from, to, is_stop, weight, activations, tags));
    }

    let payload_len = r.u64()? as usize;
    let arena = r.take(payload_len)?;
    let rng_state = r.u64()?;
    let wave_len = r.u32()? as usize;
    if wave_len > WAVE_CAP {
        return Err(BrainError::Corrupt(format!(
            "wave length {wave_len} exceeds capacity {WAVE_CAP}"
        )));
    }
    let mut wave_ids = Vec::with_capacity(wave_len);
    for _ in 0..wave_len {
        wave_ids.push(NodeId(r.u32()?));
    }
    if r.pos != r.buf.len() {
        return Err(BrainError::Corrupt("trailing bytes after wave".into()));
    }

    // Rebuild the arenas.
    let mut store = GraphStore::new();
    let mut table = InternTable::new();
    for (index, &(offset, len, level, activations)) in node_metas.iter().enumerate() {
        let (start, end) = (offset as usize, offset as usize + len as usize);
        if len == 0 || end > arena.len() {
            return Err(BrainError::Corrupt(format!(
                "node {index}: payload span {start}..{end} outside arena"
            )));
        }
        let payload = Bytes::copy_from_slice(&arena[start..end]);
        let id = NodeId(index as u32);
        if table.lookup(&store, &payload).is_some() {
            return Err(BrainError::Corrupt(format!(
                "node {index}: duplicate payload"
            )));
        }
        let mut record = NodeRecord::new(payload.clone(), level, Vec::new());
        record.activations = activations;
        table.insert(&payload, id);
        store.push_node(record);
    }

    for (index, (from, to, is_stop, weight, activations, tags)) in
        edge_metas.into_iter().enumerate()
    {
        let id = EdgeId(index as u32);
        if store.node(from).is_none() {
            return Err(BrainError::Corrupt(format!(
                "edge {index}: source {} not a live node",
                from.0
            )));
        }
        if is_stop {
            if !to.is_stop() {
                return Err(BrainError::Corrupt(format!(
                    "edge {index}: stop edge targets node {}",
                    to.0
                )));
            }
        } else if store.node(to).is_none() {
            return Err(BrainError::Corrupt(format!(
                "edge {index}: target {} not a live node",
                to.0
            )));
        }
        if store.transition(from, to, is_stop).is_some() {
            return Err(BrainError::Corrupt(format!(
                "edge {index}: duplicate transition"
            )));
        }
        let mut record = EdgeRecord::new(id, from, to, is_stop, weight);
        record.activations = activations;
        record.tags = ContextTags::from_entries(tags);
        store.push_edge(record);
        if let Some(source) = store.node_mut(from) {
            source.outgoing.push(id);
        }
        if !is_stop {
            if let Some(target) = store.node_mut(to) {
                target.incoming.push(id);
            }
        }
    }

    let mut wave = Wave::new();
    for id in wave_ids {
        if store.node(id).is_none() {
            return Err(BrainError::Corrupt(format!(
                "wave references missing node {}",
                id.0
            )));
        }
        wave.push(id);
    }

    Ok(DecodedBrain {
        store,
        table,
        wave,
        rng_state,
    })
}

/// Writes brain-file bytes atomically: sibling temp file, then rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BrainError> {
    let tmp = temp_sibling(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], BrainError> {
        let end = self.pos.checked_add(n);
        match end {
            Some(end) if end <= self.buf.len() => {
                let slice = &self.buf[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            _ => Err(BrainError::Corrupt(format!(
                "truncated at byte {} (wanted {n} more)",
                self.pos
            ))),
        }
    }

    fn u8(&mut self) -> Result<u8, BrainError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, BrainError> {
        let mut arr = [0u8; 4];
        arr.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(arr))
    }

    fn u64(&mut self) -> Result<u64, BrainError> {
        let mut arr = [0u8; 8];
        arr.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(arr))
    }

    fn f32(&mut self) -> Result<f32, BrainError> {
        let mut arr = [0u8; 4];
        arr.copy_from_slice(self.take(4)?);
        Ok(f32::from_le_bytes(arr))
    }
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}
