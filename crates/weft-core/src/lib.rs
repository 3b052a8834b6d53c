// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! weft-core: byte-level associative graph engine.
//!
//! The engine learns sequential patterns from raw byte streams and
//! generates continuations autoregressively. One persistent artifact — the
//! brain file — carries a directed graph whose nodes are interned byte
//! payloads and whose edges are context-tagged transition weights, plus
//! the RNG state and wave needed to make every run reproducible.
//!
//! The four core operations live on [`Brain`]: `create`/`load` a brain
//! file, `ingest` byte sequences (unsupervised, Hebbian), and `generate`
//! continuations (guarded stochastic walk). `feedback` closes the loop
//! with supervised reinforcement of the last walk.
//!
//! # Determinism
//!
//! There is no process-global state: the PRNG and every counter are fields
//! of the brain handle and round-trip through the brain file. With a fixed
//! seed, identical call sequences produce identical bytes — before or
//! after a save/load.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

mod brain;
mod codec;
/// Engine tuning constants and brain-file framing values.
pub mod constants;
mod error;
mod feedback;
mod generate;
mod graph;
mod hierarchy;
mod ident;
mod ingest;
mod intern;
mod record;
mod rng;
mod score;
mod scratch;
mod tags;
#[cfg(feature = "telemetry")]
mod telemetry;
mod wave;

// Re-exports for the stable public API.
/// Brain handle and its aggregate statistics.
pub use brain::{Brain, BrainStats};
/// Error type shared by every public operation.
pub use error::BrainError;
/// In-memory graph store (read-only access via [`Brain::graph`]).
pub use graph::GraphStore;
/// Core identifier types and the payload content hash.
pub use ident::{payload_key, EdgeId, NodeId, PayloadKey};
/// Payload interning table (read-only access via [`Brain::interns`]).
pub use intern::InternTable;
/// Graph node and edge record types.
pub use record::{EdgeRecord, NodeRecord};
/// Bounded context-tag multiset carried by edges.
pub use tags::{ContextTags, Tag};
