// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Generation: the guarded autoregressive walk.
//!
//! From the wave's most recent node, every step scores the outgoing edges,
//! lets the stop class compete against the regular class, and otherwise
//! emits the selected target's payload. Selection is argmax with a small,
//! adaptive exploration probability that shuts off entirely once the
//! source node is well trained — trained walks are fully deterministic.
//!
//! Three guards bound the walk: the caller's byte budget, a pinned wave
//! (the walk is stuck in a self-loop), and short-period repetition in the
//! output tail.

use crate::constants::{EXPLORATION_BASE, EXPLORATION_CUTOFF, PERIOD_MAX};
use crate::graph::GraphStore;
use crate::ident::{EdgeId, NodeId};
use crate::rng::BrainRng;
use crate::score::{score_step, Candidate};
use crate::wave::Wave;

/// One recorded emission step of the last walk, kept for feedback.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WalkStep {
    /// Node the walk stood on.
    pub(crate) source: NodeId,
    /// Regular edge it took.
    pub(crate) chosen: EdgeId,
}

/// Runs the walk; the caller has already verified the wave is non-empty.
///
/// Returns the emitted bytes (clamped to `max_bytes`) and the recorded
/// steps. Mutates only activation counters, the wave, and the RNG.
pub(crate) fn run(
    store: &mut GraphStore,
    wave: &mut Wave,
    rng: &mut BrainRng,
    max_bytes: usize,
) -> (Vec<u8>, Vec<WalkStep>) {
    let mut out: Vec<u8> = Vec::new();
    let mut walk: Vec<WalkStep> = Vec::new();
    if max_bytes == 0 {
        return (out, walk);
    }

    while let Some(current) = wave.last() {
        let scores = score_step(store, wave, current);
        let best_regular = scores.best_regular().copied();
        let best_stop = scores.best_stop().copied();

        // Stop competition: the stop class wins outright when there is
        // nothing regular left, and on a strictly higher score otherwise.
        let stop_wins = match (&best_regular, &best_stop) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(reg), Some(stop)) => stop.score > reg.score,
        };
        if stop_wins {
            if let Some(stop) = best_stop {
                if let Some(edge) = store.edge_mut(stop.edge) {
                    edge.activations += 1;
                }
            }
            break;
        }

        let epsilon = store
            .node(current)
            .map_or(0.0, |n| exploration_rate(n.activations));
        let chosen = select(&scores.regular, rng, epsilon);

        let target = chosen.to;
        let chosen_edge = chosen.edge;
        let Some(payload) = store.node(target).map(|n| n.payload.clone()) else {
            debug_assert!(false, "walk target missing: {target:?}");
            break;
        };
        out.extend_from_slice(&payload);

        if let Some(edge) = store.edge_mut(chosen_edge) {
            edge.activations += 1;
        }
        if let Some(node) = store.node_mut(target) {
            node.activations += 1;
        }
        walk.push(WalkStep {
            source: current,
            chosen: chosen_edge,
        });
        wave.push(target);

        if out.len() >= max_bytes {
            out.truncate(max_bytes);
            break;
        }
        if wave.is_pinned() {
            break;
        }
        if tail_repeats(&out) {
            break;
        }
    }

    (out, walk)
}

/// Exploration probability for a source node: `0.1 / (1 + activations)`
/// while barely trained, zero once the node has seen enough traffic.
fn exploration_rate(activations: u64) -> f32 {
    if activations >= EXPLORATION_CUTOFF {
        0.0
    } else {
        EXPLORATION_BASE / (1.0 + activations as f32)
    }
}

/// Argmax with probability `1 − ε`, score-weighted random otherwise.
fn select<'a>(candidates: &'a [Candidate], rng: &mut BrainRng, epsilon: f32) -> &'a Candidate {
    debug_assert!(!candidates.is_empty(), "select on an empty candidate set");
    if epsilon > 0.0 && rng.next_f32() < epsilon {
        weighted(candidates, rng)
    } else {
        argmax(candidates)
    }
}

/// First strictly-greater scan; equal scores keep the earliest candidate,
/// which is the lowest edge id.
fn argmax(candidates: &[Candidate]) -> &Candidate {
    let mut winner = &candidates[0];
    for c in &candidates[1..] {
        if c.score > winner.score {
            winner = c;
        }
    }
    winner
}

fn weighted<'a>(candidates: &'a [Candidate], rng: &mut BrainRng) -> &'a Candidate {
    let total: f32 = candidates.iter().map(|c| c.score).sum();
    if total <= 0.0 || !total.is_finite() {
        let index = (rng.next_u64() as usize) % candidates.len();
        return &candidates[index];
    }
    let mut remaining = rng.next_f32() * total;
    for c in candidates {
        remaining -= c.score;
        if remaining <= 0.0 {
            return c;
        }
    }
    // Float residue can leave a sliver; the last candidate absorbs it.
    &candidates[candidates.len() - 1]
}

/// True when the output tail repeats with half-period `r ∈ 1..=PERIOD_MAX`
/// (the last `2r` bytes equal the `2r` bytes before them).
fn tail_repeats(out: &[u8]) -> bool {
    for r in 1..=PERIOD_MAX {
        let n = 2 * r;
        if out.len() >= 2 * n && out[out.len() - n..] == out[out.len() - 2 * n..out.len() - n] {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_repeats_catches_short_periods() {
        assert!(tail_repeats(b"xxxx"));
        assert!(tail_repeats(b"zzabab"));
        assert!(tail_repeats(b"abcdabcd"));
        assert!(tail_repeats(b"noise abcabcabcabc"));
        assert!(!tail_repeats(b"abcdefg"));
        assert!(!tail_repeats(b" world"));
        assert!(!tail_repeats(b"abcabc"));
    }

    #[test]
    fn exploration_shuts_off_when_trained() {
        assert!(exploration_rate(0) > 0.0);
        assert!(exploration_rate(EXPLORATION_CUTOFF - 1) > 0.0);
        assert!((exploration_rate(EXPLORATION_CUTOFF) - 0.0).abs() < f32::EPSILON);
    }
}
