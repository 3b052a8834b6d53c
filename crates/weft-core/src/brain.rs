// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The brain handle: the public face of the engine.
//!
//! A [`Brain`] owns everything — arenas, intern table, wave, RNG, byte
//! buffers, and the recorded walk — as explicit fields, never process
//! globals, so tests are reproducible and save/load round-trips the whole
//! machine. All operations take `&mut self`: the engine is single-threaded
//! and non-reentrant by construction.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::constants::DEFAULT_SEED;
use crate::error::BrainError;
use crate::feedback;
use crate::generate::{self, WalkStep};
use crate::graph::GraphStore;
use crate::ingest;
use crate::intern::InternTable;
use crate::rng::BrainRng;
use crate::scratch::Scratch;
use crate::wave::Wave;

/// Aggregate counters reported by [`Brain::stats`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrainStats {
    /// Live nodes in the graph.
    pub node_count: usize,
    /// Live edges, stop edges included.
    pub edge_count: usize,
    /// Sum of all node activation counters.
    pub activations_total: u64,
}

/// Handle to one brain file and its in-memory graph.
#[derive(Debug)]
pub struct Brain {
    path: PathBuf,
    store: GraphStore,
    table: InternTable,
    wave: Wave,
    rng: BrainRng,
    /// Universal input buffer: port adapters may queue bytes here before
    /// running the pipeline.
    input: VecDeque<u8>,
    /// Universal output buffer: the bytes of the last generation walk.
    output: Vec<u8>,
    last_walk: Vec<WalkStep>,
}

impl Brain {
    /// Creates an empty brain file at `path` with the default RNG seed.
    ///
    /// # Errors
    ///
    /// [`BrainError::AlreadyExists`] if `path` holds a file,
    /// [`BrainError::Io`] if the initial write fails.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, BrainError> {
        Self::create_seeded(path, DEFAULT_SEED)
    }

    /// Creates an empty brain file with a caller-pinned RNG seed, for
    /// reproducible runs.
    ///
    /// # Errors
    ///
    /// Same as [`Brain::create`].
    pub fn create_seeded(path: impl Into<PathBuf>, seed: u64) -> Result<Self, BrainError> {
        let path = path.into();
        if path.exists() {
            return Err(BrainError::AlreadyExists(path));
        }
        let brain = Self {
            path,
            store: GraphStore::new(),
            table: InternTable::new(),
            wave: Wave::new(),
            rng: BrainRng::new(seed),
            input: VecDeque::new(),
            output: Vec::new(),
            last_walk: Vec::new(),
        };
        brain.save()?;
        Ok(brain)
    }

    /// Opens an existing brain file.
    ///
    /// # Errors
    ///
    /// [`BrainError::Io`] on read failure, [`BrainError::Corrupt`] on
    /// magic/checksum/table damage, [`BrainError::VersionMismatch`] for a
    /// file written by an incompatible format version.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, BrainError> {
        let path = path.into();
        let bytes = fs::read(&path)?;
        let decoded = codec::decode(&bytes)?;
        Ok(Self {
            path,
            store: decoded.store,
            table: decoded.table,
            wave: decoded.wave,
            rng: BrainRng::from_state(decoded.rng_state),
            input: VecDeque::new(),
            output: Vec::new(),
            last_walk: Vec::new(),
        })
    }

    /// Queues bytes into the universal input buffer without ingesting.
    ///
    /// Port adapters that merely shuttle bytes use this; a later
    /// [`Brain::ingest_buffered`] runs the pipeline over everything queued.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// Appends `bytes` to the input buffer and runs the ingestion pipeline
    /// over the whole queue.
    ///
    /// With `complete = true` a stop edge is trained at the final node and
    /// the wave resets; with `complete = false` the wave survives so a
    /// following [`Brain::generate`] continues from this prefix.
    ///
    /// # Errors
    ///
    /// [`BrainError::Resource`] on id-space or payload-arena exhaustion;
    /// the call is transactional and leaves no visible state change.
    pub fn ingest(&mut self, bytes: &[u8], complete: bool) -> Result<(), BrainError> {
        self.push_input(bytes);
        self.ingest_buffered(complete)
    }

    /// Runs the ingestion pipeline over the queued input buffer.
    ///
    /// # Errors
    ///
    /// Same as [`Brain::ingest`].
    pub fn ingest_buffered(&mut self, complete: bool) -> Result<(), BrainError> {
        let pending: Vec<u8> = self.input.iter().copied().collect();
        let mut wave = self.wave.clone();
        let mut scratch = Scratch::new(&self.store);
        ingest::run(
            &self.store,
            &self.table,
            &mut scratch,
            &mut wave,
            &pending,
            complete,
        )?;
        scratch.commit(&mut self.store, &mut self.table);
        self.wave = wave;
        self.input.clear();
        #[cfg(feature = "telemetry")]
        crate::telemetry::sequence_ingested(
            pending.len(),
            complete,
            self.store.node_count(),
            self.store.edge_count(),
        );
        Ok(())
    }

    /// Generates a continuation of at most `max_bytes` bytes from the
    /// current wave.
    ///
    /// The walk's steps are recorded for a subsequent [`Brain::feedback`];
    /// the emitted bytes also land in the universal output buffer
    /// ([`Brain::last_output`]).
    ///
    /// # Errors
    ///
    /// [`BrainError::Empty`] when the wave is empty — nothing has been
    /// ingested since the last completed sequence.
    pub fn generate(&mut self, max_bytes: usize) -> Result<Vec<u8>, BrainError> {
        if self.wave.is_empty() {
            return Err(BrainError::Empty);
        }
        let (out, walk) = generate::run(&mut self.store, &mut self.wave, &mut self.rng, max_bytes);
        #[cfg(feature = "telemetry")]
        crate::telemetry::continuation_emitted(out.len(), walk.len());
        self.last_walk = walk;
        self.output = out.clone();
        Ok(out)
    }

    /// Reinforces the last generation walk toward `expected`, rewarding
    /// steps that matched the expected continuation and punishing the
    /// first divergence.
    ///
    /// # Errors
    ///
    /// [`BrainError::Resource`] if creating a missing correct edge
    /// exhausts the arenas; transactional like ingest.
    pub fn feedback(&mut self, expected: &[u8]) -> Result<(), BrainError> {
        let mut scratch = Scratch::new(&self.store);
        feedback::run(
            &self.store,
            &self.table,
            &mut scratch,
            &self.last_walk,
            expected,
        )?;
        scratch.commit(&mut self.store, &mut self.table);
        Ok(())
    }

    /// Writes the complete engine state to the brain file, atomically.
    ///
    /// # Errors
    ///
    /// [`BrainError::Io`] on write or rename failure.
    pub fn save(&self) -> Result<(), BrainError> {
        let bytes = codec::encode(&self.store, &self.wave, self.rng.state());
        codec::write_atomic(&self.path, &bytes)?;
        #[cfg(feature = "telemetry")]
        crate::telemetry::brain_saved(&bytes[bytes.len() - 32..]);
        Ok(())
    }

    /// Consumes the handle without saving.
    ///
    /// Unsaved in-memory state is discarded; call [`Brain::save`] first if
    /// it should survive.
    pub fn close(self) {
        drop(self);
    }

    /// Discards the wave so the next ingest starts an independent
    /// sequence, without training a stop edge anywhere.
    pub fn reset_wave(&mut self) {
        self.wave.clear();
    }

    /// Aggregate graph counters.
    #[must_use]
    pub fn stats(&self) -> BrainStats {
        BrainStats {
            node_count: self.store.node_count(),
            edge_count: self.store.edge_count(),
            activations_total: self.store.activations_total(),
        }
    }

    /// Read-only view of the graph, for inspection and tests.
    #[must_use]
    pub fn graph(&self) -> &GraphStore {
        &self.store
    }

    /// Read-only view of the intern table.
    #[must_use]
    pub fn interns(&self) -> &InternTable {
        &self.table
    }

    /// Bytes of the last generation walk (the universal output buffer).
    #[must_use]
    pub fn last_output(&self) -> &[u8] {
        &self.output
    }

    /// Number of nodes currently in the wave.
    #[must_use]
    pub fn wave_len(&self) -> usize {
        self.wave.len()
    }

    /// Path of the backing brain file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
