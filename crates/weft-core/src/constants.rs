// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine tuning constants and brain-file framing values.
//!
//! Every scalar that shapes learning or generation lives here so the whole
//! parameter surface is visible in one place. None of these are runtime
//! configurable; the brain file does not record them and changing one is a
//! behavioural (not format) change.

/// Brain file magic, little-endian `"MELV"`.
pub const BRAIN_MAGIC: u32 = 0x4D45_4C56;

/// Brain file format version written and accepted by this build.
pub const BRAIN_VERSION: u32 = 1;

/// Maximum payload length for any node, hierarchy nodes included.
///
/// A promotion whose concatenated payload would exceed this bound is
/// silently skipped; the constituent edge keeps strengthening as usual.
pub const PAYLOAD_MAX: usize = 256;

/// Wave capacity: how many recently activated nodes are kept as context.
pub const WAVE_CAP: usize = 16;

/// Context-tag capacity per edge. On overflow the weakest tag is replaced.
pub const TAG_CAP: usize = 24;

/// Multiplicative decay applied to an edge's existing tags on each
/// strengthen, before the current wave is appended.
pub const TAG_DECAY: f32 = 0.9;

/// Context weight in scoring (`β`).
pub const CONTEXT_WEIGHT: f32 = 1.0;

/// Geometric discount applied per step of wave recency when computing
/// context overlap. The entry nearest the current node weighs 1.0, the one
/// before it `WAVE_RECENCY`, and so on.
pub const WAVE_RECENCY: f32 = 0.5;

/// Guard against a zero denominator in the context factor.
pub const CONTEXT_EPSILON: f32 = 1e-6;

/// Hierarchy bonus per abstraction level (`η`).
pub const HIERARCHY_WEIGHT: f32 = 0.25;

/// Seed weight for edges cloned around a freshly formed hierarchy node.
pub const HIERARCHY_CLONE_WEIGHT: f32 = 0.25;

/// Floor for the adaptive promotion threshold.
pub const PROMOTION_FLOOR: u64 = 3;

/// Feedback learning rate (`λ`): reward factor `1 + λ`, penalty `1 − λ`.
pub const FEEDBACK_RATE: f32 = 0.1;

/// Base exploration probability during generation (`ε_s`).
pub const EXPLORATION_BASE: f32 = 0.1;

/// Source-node activation count at which exploration shuts off entirely
/// and generation becomes pure argmax.
pub const EXPLORATION_CUTOFF: u64 = 8;

/// Default output budget for a generation walk when the caller has no
/// opinion.
pub const GENERATE_DEFAULT_MAX: usize = 256;

/// Longest half-period checked by the output repetition guard. The walk
/// stops when the last `2r` emitted bytes equal the `2r` before them for
/// any `r` in `1..=PERIOD_MAX`.
pub const PERIOD_MAX: usize = 3;

/// Default RNG seed for brains created without an explicit seed.
///
/// Golden-ratio constant; any nonzero value works, this one just mixes
/// well from the first draw.
pub const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
